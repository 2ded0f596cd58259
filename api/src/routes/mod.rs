pub mod documents;
pub mod health_route;
pub mod sessions;
