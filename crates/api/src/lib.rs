//! HTTP API layer for stayhub.
//!
//! - **Endpoints**: JSON routes for guests, hosts and the back office
//! - **Extractors**: Authenticated and optional-user extractors
//! - **Middleware**: Bearer-token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
