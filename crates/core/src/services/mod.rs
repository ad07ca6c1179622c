//! Business logic services.

#![allow(missing_docs)]

pub mod access;
pub mod admin_user;
pub mod approval;
pub mod booking;
pub mod cascade;
pub mod notification;
pub mod pending_deletion;
pub mod property;
pub mod review;
pub mod user;

#[cfg(test)]
pub(crate) mod fixtures;

pub use access::{Capability, has_capability};
pub use admin_user::{AdminUserService, MAX_PAGE_SIZE};
pub use approval::ApprovalService;
pub use booking::{BookingService, CreateBookingInput};
pub use cascade::CascadeService;
pub use notification::{NewNotification, NotificationService, dispatch_best_effort};
pub use pending_deletion::{PendingDeletionService, Resolution};
pub use property::{CreatePropertyInput, Location, PropertyService, UpdatePropertyInput};
pub use review::{CreateReviewInput, ReviewService};
pub use user::{RegisterInput, UpdateSelfInput, UserService};
