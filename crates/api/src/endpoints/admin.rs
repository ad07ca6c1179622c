//! Back-office endpoints.
//!
//! Capability checks live in the services; handlers only validate ids and
//! shape responses.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use stayhub_common::AppResult;
use stayhub_core::Resolution;
use stayhub_db::{
    entities::{
        pending_user_deletion::{self, DeletionRequestStatus},
        user::{Permissions, Role},
    },
    repositories::{ApprovalFilter, PropertyPurge, UserPurge},
};

use super::{bookings::BookingResponse, properties::PropertyResponse, users::UserResponse};
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{Ack, ApiResponse, Page, require_id},
};

// === Users ===

/// Approval state filter for the user list.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStateFilter {
    #[default]
    All,
    Pending,
    Approved,
}

impl From<UserStateFilter> for ApprovalFilter {
    fn from(f: UserStateFilter) -> Self {
        match f {
            UserStateFilter::All => Self::All,
            UserStateFilter::Pending => Self::Pending,
            UserStateFilter::Approved => Self::Approved,
        }
    }
}

/// List users query.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub filter: UserStateFilter,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

/// Approve (or revoke) user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveUserRequest {
    pub user_id: String,
    #[serde(default)]
    pub revoke: bool,
}

/// Request naming a single user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdRequest {
    pub user_id: String,
}

/// Set role request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRoleRequest {
    pub user_id: String,
    pub role: Role,
}

/// Set permissions request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPermissionsRequest {
    pub user_id: String,
    pub permissions: Permissions,
}

/// Rows removed by a user delete.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPurgeResponse {
    pub properties_deleted: u64,
    pub bookings_deleted: u64,
    pub reviews_deleted: u64,
    pub notifications_deleted: u64,
}

impl From<UserPurge> for UserPurgeResponse {
    fn from(p: UserPurge) -> Self {
        Self {
            properties_deleted: p.properties_deleted,
            bookings_deleted: p.bookings_deleted,
            reviews_deleted: p.reviews_deleted,
            notifications_deleted: p.notifications_deleted,
        }
    }
}

async fn list_users(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state
        .admin_user_service
        .list_users(&user, query.filter.into(), query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

async fn approve_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ApproveUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_id("userId", &req.user_id)?;
    let updated = state
        .approval_service
        .approve_user(&user, &req.user_id, req.revoke)
        .await?;
    Ok(ApiResponse::ok(updated.into()))
}

async fn delete_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UserIdRequest>,
) -> AppResult<ApiResponse<UserPurgeResponse>> {
    require_id("userId", &req.user_id)?;
    let purge = state
        .cascade_service
        .delete_user_as(&user, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(purge.into()))
}

async fn set_role(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetRoleRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_id("userId", &req.user_id)?;
    let updated = state
        .admin_user_service
        .set_role(&user, &req.user_id, req.role)
        .await?;
    Ok(ApiResponse::ok(updated.into()))
}

async fn set_permissions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetPermissionsRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_id("userId", &req.user_id)?;
    let updated = state
        .admin_user_service
        .set_permissions(&user, &req.user_id, req.permissions)
        .await?;
    Ok(ApiResponse::ok(updated.into()))
}

// === Pending deletions ===

/// Deletion gate action.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum DeletionActionRequest {
    Request {
        user_id: String,
        reason: Option<String>,
    },
    Approve {
        request_id: String,
    },
    Reject {
        request_id: String,
    },
}

/// Deletion request response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionRequestResponse {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub user_name: String,
    pub requested_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: DeletionRequestStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_by: Option<String>,
}

impl From<pending_user_deletion::Model> for DeletionRequestResponse {
    fn from(r: pending_user_deletion::Model) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            user_email: r.user_email,
            user_name: r.user_name,
            requested_by: r.requested_by,
            reason: r.reason,
            status: r.status,
            created_at: r.created_at.to_rfc3339(),
            processed_at: r.processed_at.map(|t| t.to_rfc3339()),
            processed_by: r.processed_by,
        }
    }
}

async fn list_pending_deletions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<DeletionRequestResponse>>> {
    let requests = state.pending_deletion_service.list_pending(&user).await?;
    Ok(ApiResponse::ok(
        requests.into_iter().map(Into::into).collect(),
    ))
}

async fn pending_deletion_action(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeletionActionRequest>,
) -> AppResult<ApiResponse<DeletionRequestResponse>> {
    let service = &state.pending_deletion_service;

    let request = match req {
        DeletionActionRequest::Request { user_id, reason } => {
            require_id("userId", &user_id)?;
            service.request_deletion(&user, &user_id, reason).await?
        }
        DeletionActionRequest::Approve { request_id } => {
            require_id("requestId", &request_id)?;
            service
                .resolve_deletion(&user, &request_id, Resolution::Approve)
                .await?
        }
        DeletionActionRequest::Reject { request_id } => {
            require_id("requestId", &request_id)?;
            service
                .resolve_deletion(&user, &request_id, Resolution::Reject)
                .await?
        }
    };

    Ok(ApiResponse::ok(request.into()))
}

// === Properties ===

/// Admin property list query.
#[derive(Debug, Deserialize)]
pub struct ListPropertiesQuery {
    /// Only listings waiting for approval
    #[serde(default)]
    pub pending: bool,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Request naming a single listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyIdRequest {
    pub property_id: String,
}

/// Rows removed by a listing delete.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPurgeResponse {
    pub bookings_deleted: u64,
    pub reviews_deleted: u64,
}

impl From<PropertyPurge> for PropertyPurgeResponse {
    fn from(p: PropertyPurge) -> Self {
        Self {
            bookings_deleted: p.bookings_deleted,
            reviews_deleted: p.reviews_deleted,
        }
    }
}

async fn list_properties(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListPropertiesQuery>,
) -> AppResult<ApiResponse<Vec<PropertyResponse>>> {
    let properties = state
        .property_service
        .admin_list(&user, query.pending, query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(
        properties.into_iter().map(Into::into).collect(),
    ))
}

async fn approve_property(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PropertyIdRequest>,
) -> AppResult<ApiResponse<PropertyResponse>> {
    require_id("propertyId", &req.property_id)?;
    let property = state
        .approval_service
        .approve_property(&user, &req.property_id)
        .await?;
    Ok(ApiResponse::ok(property.into()))
}

async fn delete_property(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PropertyIdRequest>,
) -> AppResult<ApiResponse<PropertyPurgeResponse>> {
    require_id("propertyId", &req.property_id)?;
    let purge = state
        .cascade_service
        .delete_property_as(&user, &req.property_id)
        .await?;
    Ok(ApiResponse::ok(purge.into()))
}

// === Bookings ===

/// Request naming a single booking.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingIdRequest {
    pub booking_id: String,
}

async fn list_bookings(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> AppResult<ApiResponse<Vec<BookingResponse>>> {
    let bookings = state
        .booking_service
        .admin_list(&user, page.limit, page.offset)
        .await?;
    Ok(ApiResponse::ok(bookings.into_iter().map(Into::into).collect()))
}

async fn delete_booking(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BookingIdRequest>,
) -> AppResult<ApiResponse<Ack>> {
    require_id("bookingId", &req.booking_id)?;
    state.booking_service.delete(&user, &req.booking_id).await?;
    Ok(Ack::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        // Users
        .route("/users", get(list_users))
        .route("/users/approve", post(approve_user))
        .route("/users/delete", post(delete_user))
        .route("/users/role", post(set_role))
        .route("/users/permissions", post(set_permissions))
        // Deletion gate
        .route(
            "/pending-deletions",
            get(list_pending_deletions).post(pending_deletion_action),
        )
        // Listings
        .route("/properties", get(list_properties))
        .route("/properties/approve", post(approve_property))
        .route("/properties/delete", post(delete_property))
        // Bookings
        .route("/bookings", get(list_bookings))
        .route("/bookings/delete", post(delete_booking))
}
