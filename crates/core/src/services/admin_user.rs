//! Back-office user management.

use sea_orm::Set;
use stayhub_common::{AppError, AppResult};
use stayhub_db::{
    entities::user::{self, Permissions, Role},
    repositories::{ApprovalFilter, UserRepository},
};

use crate::services::access::{Capability, require_admin, require_capability};

/// Largest page an admin listing returns.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Admin user service.
#[derive(Clone)]
pub struct AdminUserService {
    user_repo: UserRepository,
}

impl AdminUserService {
    /// Create a new admin user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// List users, newest first.
    pub async fn list_users(
        &self,
        actor: &user::Model,
        filter: ApprovalFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        require_capability(actor, Capability::ApproveUsers)?;
        self.user_repo
            .list(filter, limit.min(MAX_PAGE_SIZE), offset)
            .await
    }

    /// Change a user's role.
    ///
    /// Becoming sub-admin installs an empty permission set; leaving it clears permissions.
    pub async fn set_role(
        &self,
        actor: &user::Model,
        user_id: &str,
        role: Role,
    ) -> AppResult<user::Model> {
        require_admin(actor)?;

        if actor.id == user_id && role != Role::Admin {
            return Err(AppError::Forbidden(
                "Admins cannot demote themselves".to_string(),
            ));
        }

        let target = self.user_repo.get_by_id(user_id).await?;
        let previous = target.role;

        let mut active: user::ActiveModel = target.into();
        active.role = Set(role);
        if role == Role::SubAdmin && previous != Role::SubAdmin {
            active.permissions = Set(Some(Permissions::default()));
        } else if role != Role::SubAdmin {
            active.permissions = Set(None);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.user_repo.update(active).await?;

        tracing::info!(
            user_id = %updated.id,
            actor_id = %actor.id,
            from = previous.as_str(),
            to = role.as_str(),
            "User role changed"
        );

        Ok(updated)
    }

    /// Replace a sub-admin's permissions.
    pub async fn set_permissions(
        &self,
        actor: &user::Model,
        user_id: &str,
        permissions: Permissions,
    ) -> AppResult<user::Model> {
        require_admin(actor)?;

        let target = self.user_repo.get_by_id(user_id).await?;
        if target.role != Role::SubAdmin {
            return Err(AppError::Validation(
                "Permissions apply to sub-admins only".to_string(),
            ));
        }

        let mut active: user::ActiveModel = target.into();
        active.permissions = Set(Some(permissions.pinned_for_sub_admin()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.user_repo.update(active).await?;

        tracing::info!(user_id = %updated.id, actor_id = %actor.id, "Sub-admin permissions updated");

        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_set_permissions_pins_privileged_flags() {
        let admin = fixtures::user_with_role("admin1", Role::Admin);
        let sub = fixtures::sub_admin("sub1", Permissions::default());
        let stored = fixtures::sub_admin(
            "sub1",
            Permissions {
                can_delete_users: true,
                ..Default::default()
            },
        );

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[sub], [stored]])
                .into_connection(),
        );

        let requested = Permissions {
            can_delete_users: true,
            can_access_maintenance: true,
            can_permanent_delete: true,
            ..Default::default()
        };
        let service = AdminUserService::new(UserRepository::new(Arc::clone(&db)));
        service
            .set_permissions(&admin, "sub1", requested)
            .await
            .unwrap();
        drop(service);

        let sql = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert!(sql.contains("canAccessMaintenance"));
        assert!(sql.contains("canPermanentDelete"));
        // Only canDeleteUsers survives as true
        assert_eq!(sql.matches("Bool(true)").count(), 1);
    }

    #[tokio::test]
    async fn test_set_permissions_requires_sub_admin_target() {
        let admin = fixtures::user_with_role("admin1", Role::Admin);
        let host = fixtures::user_with_role("host1", Role::Host);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[host]])
                .into_connection(),
        );

        let result = AdminUserService::new(UserRepository::new(db))
            .set_permissions(&admin, "host1", Permissions::default())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_admin_cannot_demote_self() {
        let admin = fixtures::user_with_role("admin1", Role::Admin);
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = AdminUserService::new(UserRepository::new(db))
            .set_role(&admin, "admin1", Role::SubAdmin)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_set_role_to_sub_admin_installs_permissions() {
        let admin = fixtures::user_with_role("admin1", Role::Admin);
        let host = fixtures::user_with_role("host1", Role::Host);
        let promoted = fixtures::sub_admin("host1", Permissions::default());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[host], [promoted]])
                .into_connection(),
        );

        let service = AdminUserService::new(UserRepository::new(Arc::clone(&db)));
        let updated = service
            .set_role(&admin, "host1", Role::SubAdmin)
            .await
            .unwrap();
        assert_eq!(updated.role, Role::SubAdmin);
        drop(service);

        let sql = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert!(sql.contains("canApproveUsers"));
    }

    #[tokio::test]
    async fn test_list_users_requires_permission() {
        let host = fixtures::user_with_role("host1", Role::Host);
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = AdminUserService::new(UserRepository::new(db))
            .list_users(&host, ApprovalFilter::Pending, 20, 0)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
