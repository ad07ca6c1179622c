//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use stayhub_common::AppResult;
use stayhub_core::RegisterInput;
use validator::Validate;

use super::users::UserResponse;
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{Ack, ApiResponse},
};

/// Signin request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SigninRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Session response for signup and signin.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Create a new account.
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<RegisterInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let user = state.user_service.register(req).await?;
    let token = user.token.clone().unwrap_or_default();

    Ok(ApiResponse::ok(SessionResponse {
        user: user.into(),
        token,
    }))
}

/// Sign in to an existing account.
async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> AppResult<ApiResponse<SessionResponse>> {
    req.validate()?;

    let user = state
        .user_service
        .authenticate(&req.email, &req.password)
        .await?;
    let token = user.token.clone().unwrap_or_default();

    Ok(ApiResponse::ok(SessionResponse {
        user: user.into(),
        token,
    }))
}

/// Sign out (invalidate current token by rotating it).
async fn signout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Ack>> {
    state.user_service.sign_out(&user.id).await?;
    Ok(Ack::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
}
