//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use stayhub_common::AppError;
use stayhub_core::{
    AdminUserService, ApprovalService, BookingService, CascadeService, NotificationService,
    PendingDeletionService, PropertyService, ReviewService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub admin_user_service: AdminUserService,
    pub notification_service: NotificationService,
    pub approval_service: ApprovalService,
    pub cascade_service: CascadeService,
    pub pending_deletion_service: PendingDeletionService,
    pub property_service: PropertyService,
    pub booking_service: BookingService,
    pub review_service: ReviewService,
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` to a user and stores it in the
/// request extensions. Unknown tokens leave the request anonymous; a store
/// failure during the lookup ends the request with the error response.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned);

    if let Some(token) = token {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(AppError::Unauthorized) => tracing::debug!("Bearer token rejected"),
            Err(e) => {
                tracing::warn!(error = %e, "Bearer token lookup failed");
                return e.into_response();
            }
        }
    }

    next.run(req).await
}
