//! User endpoints.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use stayhub_common::AppResult;
use stayhub_core::UpdateSelfInput;
use stayhub_db::entities::user::{self, Permissions, Role};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// User response. Credentials never leave the server.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    pub is_approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            phone: u.phone,
            role: u.role,
            is_approved: u.is_approved,
            permissions: u.permissions,
            created_at: u.created_at.to_rfc3339(),
            updated_at: u.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Get the current user.
async fn me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<UserResponse>> {
    Ok(ApiResponse::ok(user.into()))
}

/// Update the current user's profile.
async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateSelfInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let updated = state.user_service.update_self(&user, req).await?;
    Ok(ApiResponse::ok(updated.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(me).patch(update_me))
}
