//! Repository layer for database access.

mod booking;
mod cascade;
mod notification;
mod pending_deletion;
mod property;
mod review;
mod user;

pub use booking::BookingRepository;
pub use cascade::{CascadeRepository, PropertyPurge, UserPurge};
pub use notification::NotificationRepository;
pub use pending_deletion::PendingDeletionRepository;
pub use property::{BrowseFilter, PropertyRepository};
pub use review::ReviewRepository;
pub use user::{ApprovalFilter, UserRepository};
