//! Booking endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use stayhub_common::AppResult;
use stayhub_core::CreateBookingInput;
use stayhub_db::entities::booking::{self, BookingStatus, PaymentStatus};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, require_id},
};

/// Booking response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: String,
    pub property_id: String,
    pub guest_id: String,
    pub check_in: chrono::NaiveDate,
    pub check_out: chrono::NaiveDate,
    pub guests: i32,
    pub total_price: i64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub created_at: String,
}

impl From<booking::Model> for BookingResponse {
    fn from(b: booking::Model) -> Self {
        Self {
            id: b.id,
            property_id: b.property_id,
            guest_id: b.guest_id,
            check_in: b.check_in,
            check_out: b.check_out,
            guests: b.guests,
            total_price: b.total_price,
            status: b.status,
            payment_status: b.payment_status,
            created_at: b.created_at.to_rfc3339(),
        }
    }
}

/// Status change request.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

/// Request a stay.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateBookingInput>,
) -> AppResult<ApiResponse<BookingResponse>> {
    require_id("propertyId", &req.property_id)?;
    let booking = state.booking_service.create(&user, req).await?;
    Ok(ApiResponse::ok(booking.into()))
}

/// The caller's bookings.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<BookingResponse>>> {
    let bookings = state.booking_service.list_mine(&user).await?;
    Ok(ApiResponse::ok(bookings.into_iter().map(Into::into).collect()))
}

/// Bookings on the caller's listings.
async fn for_host(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<BookingResponse>>> {
    let bookings = state.booking_service.list_for_host(&user).await?;
    Ok(ApiResponse::ok(bookings.into_iter().map(Into::into).collect()))
}

/// Confirm, cancel or complete a booking.
async fn update_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<ApiResponse<BookingResponse>> {
    require_id("booking id", &id)?;
    let booking = state
        .booking_service
        .update_status(&user, &id, req.status)
        .await?;
    Ok(ApiResponse::ok(booking.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(mine).post(create))
        .route("/host", get(for_host))
        .route("/{id}/status", patch(update_status))
}
