pub mod message_route;
pub mod session_dto;
pub mod session_routes;
