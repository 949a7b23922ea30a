pub mod http;
pub mod websocket;

pub use http::{debug_connections, get_feedback, health_check, release_feedback, request_feedback};
pub use websocket::websocket_handler;
