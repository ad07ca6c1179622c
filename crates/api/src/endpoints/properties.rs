//! Listing endpoints, including a listing's reviews.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use stayhub_common::AppResult;
use stayhub_core::{CreatePropertyInput, CreateReviewInput, UpdatePropertyInput};
use stayhub_db::{
    entities::{property, review},
    repositories::BrowseFilter,
};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, Page, require_id},
};

/// Browse query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseQuery {
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub min_guests: Option<i32>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

/// Property response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub property_type: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub max_guests: i32,
    pub price_per_night: i64,
    pub images: serde_json::Value,
    pub amenities: serde_json::Value,
    pub location: serde_json::Value,
    pub host_id: String,
    pub is_active: bool,
    pub is_approved_by_admin: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<property::Model> for PropertyResponse {
    fn from(p: property::Model) -> Self {
        Self {
            id: p.id,
            title: p.title,
            slug: p.slug,
            description: p.description,
            property_type: p.property_type,
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            max_guests: p.max_guests,
            price_per_night: p.price_per_night,
            images: p.images,
            amenities: p.amenities,
            location: p.location,
            host_id: p.host_id,
            is_active: p.is_active,
            is_approved_by_admin: p.is_approved_by_admin,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Review response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub property_id: String,
    pub guest_id: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: String,
}

impl From<review::Model> for ReviewResponse {
    fn from(r: review::Model) -> Self {
        Self {
            id: r.id,
            property_id: r.property_id,
            guest_id: r.guest_id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Browse published listings.
async fn browse(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> AppResult<ApiResponse<Vec<PropertyResponse>>> {
    let filter = BrowseFilter {
        city: query.city,
        property_type: query.property_type,
        min_guests: query.min_guests,
    };
    let properties = state
        .property_service
        .browse(&filter, query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(
        properties.into_iter().map(Into::into).collect(),
    ))
}

/// Show a listing by slug or id.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<PropertyResponse>> {
    let property = state.property_service.get(&key, viewer.as_ref()).await?;
    Ok(ApiResponse::ok(property.into()))
}

/// Create a listing.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePropertyInput>,
) -> AppResult<ApiResponse<PropertyResponse>> {
    if let Some(host_id) = req.host_id.as_deref() {
        require_id("hostId", host_id)?;
    }
    let property = state.property_service.create(&user, req).await?;
    Ok(ApiResponse::ok(property.into()))
}

/// Edit a listing.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePropertyInput>,
) -> AppResult<ApiResponse<PropertyResponse>> {
    require_id("property id", &id)?;
    let property = state.property_service.update(&user, &id, req).await?;
    Ok(ApiResponse::ok(property.into()))
}

/// The caller's own listings.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<PropertyResponse>>> {
    let properties = state.property_service.list_mine(&user).await?;
    Ok(ApiResponse::ok(
        properties.into_iter().map(Into::into).collect(),
    ))
}

/// Reviews of a listing.
async fn reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(page): Query<Page>,
) -> AppResult<ApiResponse<Vec<ReviewResponse>>> {
    require_id("property id", &id)?;
    let reviews = state
        .review_service
        .list(&id, page.limit, page.offset)
        .await?;
    Ok(ApiResponse::ok(reviews.into_iter().map(Into::into).collect()))
}

/// Review a listing.
async fn create_review(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CreateReviewInput>,
) -> AppResult<ApiResponse<ReviewResponse>> {
    require_id("property id", &id)?;
    let review = state.review_service.create(&user, &id, req).await?;
    Ok(ApiResponse::ok(review.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(browse).post(create))
        .route("/mine", get(mine))
        .route("/{id}", get(show).patch(update))
        .route("/{id}/reviews", get(reviews).post(create_review))
}
