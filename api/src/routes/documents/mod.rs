pub mod upload_route;
