//! API endpoints.

mod admin;
mod auth;
mod bookings;
mod notifications;
mod properties;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/properties", properties::router())
        .nest("/bookings", bookings::router())
        .nest("/notifications", notifications::router())
        .nest("/admin", admin::router())
}
