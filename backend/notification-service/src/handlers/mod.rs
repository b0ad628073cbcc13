/// HTTP handlers for notification service API
pub mod notifications;
pub mod websocket;

pub use notifications::register_routes as register_notifications;
pub use websocket::register_routes as register_websocket;
