//! Database entities.

pub mod booking;
pub mod notification;
pub mod pending_user_deletion;
pub mod property;
pub mod review;
pub mod user;

pub use booking::Entity as Booking;
pub use notification::Entity as Notification;
pub use pending_user_deletion::Entity as PendingUserDeletion;
pub use property::Entity as Property;
pub use review::Entity as Review;
pub use user::Entity as User;
