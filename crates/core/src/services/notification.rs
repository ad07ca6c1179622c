//! Notification service.
//!
//! Notifications are a side channel: workflows send them through
//! [`dispatch_best_effort`], so a failed insert never fails the action that
//! triggered it.

use std::future::Future;

use sea_orm::Set;
use serde_json::json;
use stayhub_common::{AppError, AppResult, IdGenerator};
use stayhub_db::{
    entities::{
        booking::BookingStatus,
        notification::{self, NotificationType, RelatedType},
    },
    repositories::{NotificationRepository, UserRepository},
};

use crate::services::admin_user::MAX_PAGE_SIZE;

/// Content of a notification, independent of its recipient.
#[derive(Debug, Clone, Default)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_id: Option<String>,
    pub related_type: Option<RelatedType>,
    pub data: Option<serde_json::Value>,
}

impl NewNotification {
    /// Notification with a title, message and severity.
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        notification_type: NotificationType,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            notification_type,
            ..Default::default()
        }
    }

    /// Point the notification at a related record.
    #[must_use]
    pub fn related(mut self, related_type: RelatedType, related_id: impl Into<String>) -> Self {
        self.related_type = Some(related_type);
        self.related_id = Some(related_id.into());
        self
    }

    /// Attach a client payload.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Await a notification future and log its failure instead of returning it.
pub async fn dispatch_best_effort<T, F>(label: &str, fut: F)
where
    F: Future<Output = AppResult<T>>,
{
    if let Err(e) = fut.await {
        tracing::warn!(error = %e, notification = label, "Failed to dispatch notification");
    }
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository, user_repo: UserRepository) -> Self {
        Self {
            notification_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Insert one notification for `user_id`.
    pub async fn notify(
        &self,
        user_id: &str,
        content: NewNotification,
    ) -> AppResult<notification::Model> {
        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            title: Set(content.title),
            message: Set(content.message),
            notification_type: Set(content.notification_type),
            is_read: Set(false),
            related_id: Set(content.related_id),
            related_type: Set(content.related_type),
            data: Set(content.data),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.notification_repo.create(model).await
    }

    /// Insert the same notification for every admin and sub-admin.
    pub async fn notify_admins(
        &self,
        content: NewNotification,
    ) -> AppResult<Vec<notification::Model>> {
        let staff = self.user_repo.find_staff().await?;

        let mut created = Vec::with_capacity(staff.len());
        for admin in staff {
            created.push(self.notify(&admin.id, content.clone()).await?);
        }

        Ok(created)
    }

    // === Templates ===

    /// Tell a user their account was approved.
    pub async fn notify_user_approved(&self, user_id: &str) -> AppResult<notification::Model> {
        self.notify(
            user_id,
            NewNotification::new(
                "Account approved",
                "Your account has been approved. You can now use all features.",
                NotificationType::Success,
            )
            .related(RelatedType::User, user_id),
        )
        .await
    }

    /// Tell a user their approval was revoked.
    pub async fn notify_user_revoked(&self, user_id: &str) -> AppResult<notification::Model> {
        self.notify(
            user_id,
            NewNotification::new(
                "Account approval revoked",
                "Your account approval has been revoked. Contact support for details.",
                NotificationType::Warning,
            )
            .related(RelatedType::User, user_id),
        )
        .await
    }

    /// Tell a host their listing went live.
    pub async fn notify_property_approved(
        &self,
        host_id: &str,
        property_id: &str,
        title: &str,
    ) -> AppResult<notification::Model> {
        self.notify(
            host_id,
            NewNotification::new(
                "Property approved",
                format!("Your property \"{title}\" has been approved and is now live."),
                NotificationType::Success,
            )
            .related(RelatedType::Property, property_id),
        )
        .await
    }

    /// Tell the back office a listing is waiting for review.
    pub async fn notify_property_submitted(
        &self,
        property_id: &str,
        title: &str,
        host_name: &str,
    ) -> AppResult<Vec<notification::Model>> {
        self.notify_admins(
            NewNotification::new(
                "New property awaiting approval",
                format!("{host_name} submitted \"{title}\" for review."),
                NotificationType::Info,
            )
            .related(RelatedType::Property, property_id),
        )
        .await
    }

    /// Tell the back office a new account is waiting for approval.
    pub async fn notify_user_registered(
        &self,
        user_id: &str,
        email: &str,
    ) -> AppResult<Vec<notification::Model>> {
        self.notify_admins(
            NewNotification::new(
                "New user awaiting approval",
                format!("{email} registered and needs approval."),
                NotificationType::Info,
            )
            .related(RelatedType::User, user_id),
        )
        .await
    }

    /// Tell a host about a new booking request.
    pub async fn notify_new_booking(
        &self,
        host_id: &str,
        booking_id: &str,
        property_title: &str,
    ) -> AppResult<notification::Model> {
        self.notify(
            host_id,
            NewNotification::new(
                "New booking request",
                format!("You have a new booking request for \"{property_title}\"."),
                NotificationType::Info,
            )
            .related(RelatedType::Booking, booking_id),
        )
        .await
    }

    /// Tell a guest their booking changed status.
    pub async fn notify_booking_status(
        &self,
        guest_id: &str,
        booking_id: &str,
        status: BookingStatus,
    ) -> AppResult<notification::Model> {
        let (label, notification_type) = match status {
            BookingStatus::Pending => ("pending", NotificationType::Info),
            BookingStatus::Confirmed => ("confirmed", NotificationType::Success),
            BookingStatus::Cancelled => ("cancelled", NotificationType::Warning),
            BookingStatus::Completed => ("completed", NotificationType::Info),
        };

        self.notify(
            guest_id,
            NewNotification::new(
                "Booking updated",
                format!("Your booking is now {label}."),
                notification_type,
            )
            .related(RelatedType::Booking, booking_id)
            .with_data(json!({ "status": label })),
        )
        .await
    }

    /// Tell a host their listing received a review.
    pub async fn notify_new_review(
        &self,
        host_id: &str,
        review_id: &str,
        property_title: &str,
        rating: i16,
    ) -> AppResult<notification::Model> {
        self.notify(
            host_id,
            NewNotification::new(
                "New review",
                format!("\"{property_title}\" received a {rating}-star review."),
                NotificationType::Info,
            )
            .related(RelatedType::Review, review_id)
            .with_data(json!({ "rating": rating })),
        )
        .await
    }

    /// Tell the super-admin a deletion request needs a decision.
    pub async fn notify_deletion_requested(
        &self,
        super_admin_id: &str,
        request_id: &str,
        user_email: &str,
        requested_by: &str,
    ) -> AppResult<notification::Model> {
        self.notify(
            super_admin_id,
            NewNotification::new(
                "User deletion requested",
                format!("{requested_by} requested deletion of {user_email}."),
                NotificationType::Warning,
            )
            .related(RelatedType::DeletionRequest, request_id),
        )
        .await
    }

    /// Tell the requesting sub-admin how their request was resolved.
    pub async fn notify_deletion_resolved(
        &self,
        sub_admin_id: &str,
        request_id: &str,
        user_email: &str,
        approved: bool,
    ) -> AppResult<notification::Model> {
        let (title, message, notification_type) = if approved {
            (
                "Deletion request approved",
                format!("{user_email} has been deleted."),
                NotificationType::Success,
            )
        } else {
            (
                "Deletion request rejected",
                format!("The request to delete {user_email} was rejected."),
                NotificationType::Info,
            )
        };

        self.notify(
            sub_admin_id,
            NewNotification::new(title, message, notification_type)
                .related(RelatedType::DeletionRequest, request_id),
        )
        .await
    }

    // === Owner operations ===

    /// Get notifications for a user.
    pub async fn get_notifications(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_by_user(user_id, limit.min(MAX_PAGE_SIZE), offset, unread_only)
            .await
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Mark a notification as read.
    pub async fn mark_as_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        if self
            .notification_repo
            .mark_as_read(notification_id, user_id)
            .await?
        {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Notification {notification_id}")))
        }
    }

    /// Mark all notifications as read for a user.
    pub async fn mark_all_as_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }

    /// Delete a notification.
    pub async fn delete(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        if self.notification_repo.delete(notification_id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Notification {notification_id}")))
        }
    }

    /// Delete all notifications for a user.
    pub async fn delete_all(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.delete_all_for_user(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use stayhub_db::entities::user::{self, Role};
    use std::sync::Arc;

    fn service(db: Arc<DatabaseConnection>) -> NotificationService {
        NotificationService::new(
            NotificationRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_notify_admins_without_staff_is_empty() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let created = service(db)
            .notify_admins(NewNotification::new("t", "m", NotificationType::Info))
            .await
            .unwrap();
        assert!(created.is_empty());
    }

    #[tokio::test]
    async fn test_notify_admins_fans_out_identical_content() {
        let admin = fixtures::user_with_role("admin1", Role::Admin);
        let sub = fixtures::user_with_role("sub1", Role::SubAdmin);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![admin, sub]])
                .append_query_results([[fixtures::notification("n1", "admin1")]])
                .append_query_results([[fixtures::notification("n2", "sub1")]])
                .into_connection(),
        );

        let created = service(Arc::clone(&db))
            .notify_property_submitted("prop1", "Harbour Loft", "Ana")
            .await
            .unwrap();
        assert_eq!(created.len(), 2);

        let sql = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert_eq!(sql.matches("INSERT INTO").count(), 2);
        assert!(sql.contains("Harbour Loft"));
    }

    #[tokio::test]
    async fn test_notify_propagates_errors() {
        // No mocked result: the insert fails
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db).notify_user_approved("user1").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_dispatch_best_effort_swallows_errors() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = service(db);

        // Must complete without surfacing the failure
        dispatch_best_effort("user_approved", svc.notify_user_approved("user1")).await;
    }

    #[tokio::test]
    async fn test_mark_as_read_foreign_notification_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let result = service(db).mark_as_read("user2", "n1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_related_sets_both_fields() {
        let content = NewNotification::new("t", "m", NotificationType::Warning)
            .related(RelatedType::DeletionRequest, "req1");
        assert_eq!(content.related_type, Some(RelatedType::DeletionRequest));
        assert_eq!(content.related_id.as_deref(), Some("req1"));
    }
}
