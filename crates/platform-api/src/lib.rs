//! # Platform API
//! 
//! HTTP handlers, the response envelope, error mapping, and the principal
//! middleware in front of the tenant platform services.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
