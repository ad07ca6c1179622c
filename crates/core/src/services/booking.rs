//! Booking requests.

use chrono::NaiveDate;
use sea_orm::Set;
use serde::Deserialize;
use stayhub_common::{AppError, AppResult, IdGenerator};
use stayhub_db::{
    entities::{
        booking::{self, BookingStatus, PaymentStatus},
        user::{self, Role},
    },
    repositories::{BookingRepository, PropertyRepository},
};
use validator::Validate;

use crate::services::access::{Capability, require_admin, require_capability, require_host};
use crate::services::admin_user::MAX_PAGE_SIZE;
use crate::services::notification::{NotificationService, dispatch_best_effort};

/// Input for requesting a stay.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingInput {
    #[validate(length(equal = 24))]
    pub property_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[validate(range(min = 1))]
    pub guests: i32,
}

/// Booking service.
#[derive(Clone)]
pub struct BookingService {
    booking_repo: BookingRepository,
    property_repo: PropertyRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl BookingService {
    /// Create a new booking service.
    #[must_use]
    pub const fn new(
        booking_repo: BookingRepository,
        property_repo: PropertyRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            booking_repo,
            property_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Request a stay. Price is nights times the nightly rate.
    pub async fn create(
        &self,
        actor: &user::Model,
        input: CreateBookingInput,
    ) -> AppResult<booking::Model> {
        input.validate()?;

        if !actor.is_approved {
            return Err(AppError::Forbidden(
                "Your account is waiting for approval".to_string(),
            ));
        }

        let nights = (input.check_out - input.check_in).num_days();
        if nights <= 0 {
            return Err(AppError::Validation(
                "Check-out must be after check-in".to_string(),
            ));
        }

        let property = self.property_repo.get_by_id(&input.property_id).await?;
        if !property.is_published() {
            return Err(AppError::NotFound(format!("Property {}", input.property_id)));
        }
        if input.guests > property.max_guests {
            return Err(AppError::Validation(format!(
                "This property hosts at most {} guests",
                property.max_guests
            )));
        }

        let total_price = property
            .price_per_night
            .checked_mul(nights)
            .ok_or_else(|| AppError::Validation("Stay is too long".to_string()))?;

        let model = booking::ActiveModel {
            id: Set(self.id_gen.generate()),
            property_id: Set(property.id.clone()),
            guest_id: Set(actor.id.clone()),
            check_in: Set(input.check_in),
            check_out: Set(input.check_out),
            guests: Set(input.guests),
            total_price: Set(total_price),
            status: Set(BookingStatus::Pending),
            payment_status: Set(PaymentStatus::Pending),
            created_at: Set(chrono::Utc::now().into()),
        };
        let booking = self.booking_repo.create(model).await?;

        tracing::info!(
            booking_id = %booking.id,
            property_id = %property.id,
            guest_id = %actor.id,
            nights,
            "Booking requested"
        );

        dispatch_best_effort(
            "new_booking",
            self.notifications
                .notify_new_booking(&property.host_id, &booking.id, &property.title),
        )
        .await;

        Ok(booking)
    }

    /// The caller's bookings.
    pub async fn list_mine(&self, actor: &user::Model) -> AppResult<Vec<booking::Model>> {
        self.booking_repo.find_by_guest(&actor.id).await
    }

    /// Bookings on the caller's listings.
    pub async fn list_for_host(&self, actor: &user::Model) -> AppResult<Vec<booking::Model>> {
        require_host(actor)?;

        let ids: Vec<String> = self
            .property_repo
            .find_by_host(&actor.id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        self.booking_repo.find_by_properties(&ids).await
    }

    /// Back-office listing.
    pub async fn admin_list(
        &self,
        actor: &user::Model,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<booking::Model>> {
        require_capability(actor, Capability::ViewBookings)?;
        self.booking_repo.list(limit.min(MAX_PAGE_SIZE), offset).await
    }

    /// Move a booking to a new status. Cancelled and completed bookings are final.
    pub async fn update_status(
        &self,
        actor: &user::Model,
        booking_id: &str,
        status: BookingStatus,
    ) -> AppResult<booking::Model> {
        let booking = self.booking_repo.get_by_id(booking_id).await?;

        if actor.role != Role::Admin {
            let property = self.property_repo.get_by_id(&booking.property_id).await?;
            if property.host_id != actor.id {
                return Err(AppError::Forbidden(
                    "Only the host can update this booking".to_string(),
                ));
            }
        }

        if booking.status.is_final() {
            return Err(AppError::Validation(format!(
                "Booking is already {:?}",
                booking.status
            )));
        }

        let guest_id = booking.guest_id.clone();
        let mut active: booking::ActiveModel = booking.into();
        active.status = Set(status);
        let updated = self.booking_repo.update(active).await?;

        tracing::info!(booking_id = %updated.id, status = ?status, "Booking status changed");

        dispatch_best_effort(
            "booking_status",
            self.notifications
                .notify_booking_status(&guest_id, &updated.id, status),
        )
        .await;

        Ok(updated)
    }

    /// Remove a booking, admin only.
    pub async fn delete(&self, actor: &user::Model, booking_id: &str) -> AppResult<()> {
        require_admin(actor)?;

        if !self.booking_repo.delete(booking_id).await? {
            return Err(AppError::NotFound(format!("Booking {booking_id}")));
        }

        tracing::info!(booking_id = %booking_id, actor_id = %actor.id, "Booking deleted");
        Ok(())
    }
}
