//! Cascading deletion of properties and users.

use stayhub_common::{AppError, AppResult};
use stayhub_db::{
    entities::user,
    repositories::{CascadeRepository, PropertyPurge, UserPurge},
};

use crate::services::access::require_admin;

/// Cascade service.
#[derive(Clone)]
pub struct CascadeService {
    cascade_repo: CascadeRepository,
}

impl CascadeService {
    /// Create a new cascade service.
    #[must_use]
    pub const fn new(cascade_repo: CascadeRepository) -> Self {
        Self { cascade_repo }
    }

    /// Delete a property, its bookings and its reviews.
    pub async fn delete_property(&self, property_id: &str) -> AppResult<PropertyPurge> {
        let purge = self.cascade_repo.purge_property(property_id).await?;

        if !purge.property_removed {
            return Err(AppError::NotFound(format!("Property {property_id}")));
        }

        tracing::info!(
            property_id = %property_id,
            bookings = purge.bookings_deleted,
            reviews = purge.reviews_deleted,
            "Property deleted"
        );
        Ok(purge)
    }

    /// Delete a user and everything that references them.
    pub async fn delete_user(&self, user_id: &str) -> AppResult<UserPurge> {
        let purge = self.cascade_repo.purge_user(user_id).await?;

        if !purge.user_removed {
            return Err(AppError::NotFound(format!("User {user_id}")));
        }

        tracing::info!(
            user_id = %user_id,
            properties = purge.properties_deleted,
            bookings = purge.bookings_deleted,
            reviews = purge.reviews_deleted,
            notifications = purge.notifications_deleted,
            "User deleted"
        );
        Ok(purge)
    }

    /// Back-office property delete, admin only.
    pub async fn delete_property_as(
        &self,
        actor: &user::Model,
        property_id: &str,
    ) -> AppResult<PropertyPurge> {
        require_admin(actor)?;
        self.delete_property(property_id).await
    }

    /// Direct user delete, admin only. Sub-admins go through the pending-deletion gate.
    pub async fn delete_user_as(&self, actor: &user::Model, user_id: &str) -> AppResult<UserPurge> {
        require_admin(actor)?;

        if actor.id == user_id {
            return Err(AppError::Validation(
                "Cannot delete your own account".to_string(),
            ));
        }

        self.delete_user(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
    use stayhub_db::entities::user::{Permissions, Role};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn rows(n: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: n,
        }
    }

    fn service(db: Arc<DatabaseConnection>) -> CascadeService {
        CascadeService::new(CascadeRepository::new(db))
    }

    #[tokio::test]
    async fn test_delete_property_removes_booking_first_and_leaves_host() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([rows(1), rows(0), rows(1)])
                .into_connection(),
        );

        let purge = service(Arc::clone(&db)).delete_property("propX").await.unwrap();
        assert_eq!(purge.bookings_deleted, 1);
        assert!(purge.property_removed);

        let sql = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert!(!sql.contains("DELETE FROM \\\"user\\\""));
    }

    #[tokio::test]
    async fn test_delete_property_missing_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([rows(0), rows(0), rows(0)])
                .into_connection(),
        );

        let result = service(db).delete_property("gone").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_user_removes_hosted_properties() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![BTreeMap::from([(
                    "id",
                    Value::from("p1".to_string()),
                )])]])
                .append_exec_results([rows(2), rows(1), rows(1), rows(0), rows(0), rows(3), rows(1)])
                .into_connection(),
        );

        let purge = service(db).delete_user("hostH").await.unwrap();
        assert_eq!(purge.properties_deleted, 1);
        assert_eq!(purge.bookings_deleted, 2);
        assert_eq!(purge.reviews_deleted, 1);
        assert!(purge.user_removed);
    }

    #[tokio::test]
    async fn test_delete_user_as_rejects_self() {
        let admin = fixtures::user_with_role("admin1", Role::Admin);
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db).delete_user_as(&admin, "admin1").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_user_as_sub_admin_forbidden() {
        let sub = fixtures::sub_admin(
            "sub1",
            Permissions {
                can_delete_users: true,
                ..Default::default()
            },
        );
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db).delete_user_as(&sub, "guest1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_property_as_listing_manager_forbidden() {
        let sub = fixtures::sub_admin(
            "sub1",
            Permissions {
                can_manage_listings: true,
                ..Default::default()
            },
        );
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(Arc::clone(&db)).delete_property_as(&sub, "prop1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_delete_property_as_admin() {
        let admin = fixtures::user_with_role("admin1", Role::Admin);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([rows(0), rows(0), rows(1)])
                .into_connection(),
        );

        let purge = service(db).delete_property_as(&admin, "prop1").await.unwrap();
        assert!(purge.property_removed);
    }
}
