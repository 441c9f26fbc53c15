//! HTTP API module for the check and health endpoints.

pub mod handlers;
pub mod https;
pub mod response;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
