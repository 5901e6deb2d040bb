//! HTTP request handlers.

pub mod activity_handler;
pub mod auth_handler;
pub mod user_handler;

pub use activity_handler::activity_routes;
pub use auth_handler::auth_routes;
pub use user_handler::user_routes;
