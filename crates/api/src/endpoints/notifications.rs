//! Notification endpoints. Every route acts on the caller's own inbox.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use stayhub_common::AppResult;
use stayhub_db::entities::notification::{self, NotificationType, RelatedType};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{Ack, ApiResponse, require_id},
};

/// List notifications query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsQuery {
    /// Maximum results (default: 20, max: 100)
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
    /// Only unread notifications
    #[serde(default)]
    pub unread_only: bool,
}

const fn default_limit() -> u64 {
    20
}

/// Notification response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_type: Option<RelatedType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub created_at: String,
}

impl From<notification::Model> for NotificationResponse {
    fn from(n: notification::Model) -> Self {
        Self {
            id: n.id,
            title: n.title,
            message: n.message,
            notification_type: n.notification_type,
            is_read: n.is_read,
            related_id: n.related_id,
            related_type: n.related_type,
            data: n.data,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

/// Unread count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// Affected rows response for bulk operations.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResponse {
    pub updated: u64,
}

/// List the caller's notifications, newest first.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<ApiResponse<Vec<NotificationResponse>>> {
    let notifications = state
        .notification_service
        .get_notifications(&user.id, query.limit, query.offset, query.unread_only)
        .await?;

    Ok(ApiResponse::ok(
        notifications.into_iter().map(Into::into).collect(),
    ))
}

/// Count unread notifications.
async fn unread_count(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UnreadCountResponse>> {
    let count = state.notification_service.count_unread(&user.id).await?;
    Ok(ApiResponse::ok(UnreadCountResponse { count }))
}

/// Mark all notifications as read.
async fn mark_all_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<BulkResponse>> {
    let updated = state
        .notification_service
        .mark_all_as_read(&user.id)
        .await?;
    Ok(ApiResponse::ok(BulkResponse { updated }))
}

/// Mark one notification as read.
async fn mark_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Ack>> {
    require_id("notification id", &id)?;
    state
        .notification_service
        .mark_as_read(&user.id, &id)
        .await?;
    Ok(Ack::ok())
}

/// Delete all notifications.
async fn delete_all(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<BulkResponse>> {
    let updated = state.notification_service.delete_all(&user.id).await?;
    Ok(ApiResponse::ok(BulkResponse { updated }))
}

/// Delete one notification.
async fn delete_one(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Ack>> {
    require_id("notification id", &id)?;
    state.notification_service.delete(&user.id, &id).await?;
    Ok(Ack::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).patch(mark_all_read).delete(delete_all))
        .route("/unread-count", get(unread_count))
        .route("/{id}", patch(mark_read).delete(delete_one))
}
