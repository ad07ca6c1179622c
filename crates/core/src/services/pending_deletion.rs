//! Deferred user deletion.
//!
//! Sub-admins with `can_delete_users` file a request; only the configured
//! super-admin can approve (which runs the user cascade) or reject it.
//! A request leaves `pending` exactly once.

use sea_orm::Set;
use serde::Deserialize;
use stayhub_common::{AppError, AppResult, IdGenerator, config::AuthConfig};
use stayhub_db::{
    entities::{
        pending_user_deletion::{self, DeletionRequestStatus},
        user::{self, Role},
    },
    repositories::{PendingDeletionRepository, UserRepository},
};

use crate::services::access::{Capability, has_capability};
use crate::services::cascade::CascadeService;
use crate::services::notification::{NotificationService, dispatch_best_effort};

/// Super-admin decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Approve,
    Reject,
}

impl Resolution {
    const fn status(self) -> DeletionRequestStatus {
        match self {
            Self::Approve => DeletionRequestStatus::Approved,
            Self::Reject => DeletionRequestStatus::Rejected,
        }
    }
}

/// Pending deletion service.
#[derive(Clone)]
pub struct PendingDeletionService {
    pending_repo: PendingDeletionRepository,
    user_repo: UserRepository,
    cascade: CascadeService,
    notifications: NotificationService,
    auth: AuthConfig,
    id_gen: IdGenerator,
}

impl PendingDeletionService {
    /// Create a new pending deletion service.
    #[must_use]
    pub const fn new(
        pending_repo: PendingDeletionRepository,
        user_repo: UserRepository,
        cascade: CascadeService,
        notifications: NotificationService,
        auth: AuthConfig,
    ) -> Self {
        Self {
            pending_repo,
            user_repo,
            cascade,
            notifications,
            auth,
            id_gen: IdGenerator::new(),
        }
    }

    fn require_super_admin(&self, actor: &user::Model) -> AppResult<()> {
        if self.auth.is_super_admin(&actor.id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only the super-admin can manage deletion requests".to_string(),
            ))
        }
    }

    /// File a deletion request for `user_id`.
    pub async fn request_deletion(
        &self,
        actor: &user::Model,
        user_id: &str,
        reason: Option<String>,
    ) -> AppResult<pending_user_deletion::Model> {
        if actor.role != Role::SubAdmin || !has_capability(actor, Capability::DeleteUsers) {
            return Err(AppError::Forbidden(
                "Deletion requests require a sub-admin with delete permission".to_string(),
            ));
        }

        let target = self.user_repo.get_by_id(user_id).await?;

        if self
            .pending_repo
            .find_pending_by_user_id(user_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "A deletion request is already pending for this user".to_string(),
            ));
        }

        let model = pending_user_deletion::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(target.id.clone()),
            user_email: Set(target.email.clone()),
            user_name: Set(target.name.clone()),
            requested_by: Set(actor.id.clone()),
            reason: Set(reason),
            status: Set(DeletionRequestStatus::Pending),
            created_at: Set(chrono::Utc::now().into()),
            processed_at: Set(None),
            processed_by: Set(None),
        };
        let request = self.pending_repo.create(model).await?;

        tracing::info!(
            request_id = %request.id,
            user_id = %request.user_id,
            requested_by = %actor.id,
            "User deletion requested"
        );

        if let Some(super_admin_id) = self.auth.super_admin_id.as_deref() {
            dispatch_best_effort(
                "deletion_requested",
                self.notifications.notify_deletion_requested(
                    super_admin_id,
                    &request.id,
                    &request.user_email,
                    &actor.name,
                ),
            )
            .await;
        }

        Ok(request)
    }

    /// Approve or reject a pending request.
    pub async fn resolve_deletion(
        &self,
        actor: &user::Model,
        request_id: &str,
        resolution: Resolution,
    ) -> AppResult<pending_user_deletion::Model> {
        self.require_super_admin(actor)?;

        let request = self
            .pending_repo
            .find_pending_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Deletion request {request_id}")))?;

        if resolution == Resolution::Approve {
            match self.cascade.delete_user(&request.user_id).await {
                Ok(_) => {}
                Err(AppError::NotFound(_)) => {
                    tracing::info!(
                        request_id = %request.id,
                        user_id = %request.user_id,
                        "User already removed, approving request anyway"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        if !self
            .pending_repo
            .resolve(&request.id, resolution.status(), &actor.id)
            .await?
        {
            return Err(AppError::NotFound(format!("Deletion request {request_id}")));
        }

        let resolved = self
            .pending_repo
            .find_by_id(&request.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Deletion request {request_id}")))?;

        tracing::info!(
            request_id = %resolved.id,
            user_id = %resolved.user_id,
            status = ?resolved.status,
            "User deletion request resolved"
        );

        dispatch_best_effort(
            "deletion_resolved",
            self.notifications.notify_deletion_resolved(
                &resolved.requested_by,
                &resolved.id,
                &resolved.user_email,
                resolution == Resolution::Approve,
            ),
        )
        .await;

        Ok(resolved)
    }

    /// Pending requests, newest first.
    pub async fn list_pending(
        &self,
        actor: &user::Model,
    ) -> AppResult<Vec<pending_user_deletion::Model>> {
        self.require_super_admin(actor)?;
        self.pending_repo.find_pending().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
    use stayhub_db::{
        entities::user::Permissions,
        repositories::{CascadeRepository, NotificationRepository},
    };
    use std::collections::BTreeMap;
    use std::sync::Arc;

    const ROOT: &str = "root0000000000000000000a";

    fn rows(n: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: n,
        }
    }

    fn service(db: Arc<DatabaseConnection>) -> PendingDeletionService {
        let user_repo = UserRepository::new(Arc::clone(&db));
        PendingDeletionService::new(
            PendingDeletionRepository::new(Arc::clone(&db)),
            user_repo.clone(),
            CascadeService::new(CascadeRepository::new(Arc::clone(&db))),
            NotificationService::new(NotificationRepository::new(db), user_repo),
            AuthConfig {
                super_admin_id: Some(ROOT.to_string()),
            },
        )
    }

    fn deleter() -> user::Model {
        fixtures::sub_admin(
            "sub1",
            Permissions {
                can_delete_users: true,
                ..Default::default()
            },
        )
    }

    fn root() -> user::Model {
        fixtures::user_with_role(ROOT, Role::Admin)
    }

    #[tokio::test]
    async fn test_request_snapshots_target() {
        let target = fixtures::user_with_role("guest1", Role::Guest);
        let created =
            fixtures::deletion_request("req1", "guest1", "sub1", DeletionRequestStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[target]])
                .append_query_results([Vec::<pending_user_deletion::Model>::new()])
                .append_query_results([[created]])
                .append_query_results([[fixtures::notification("n1", ROOT)]])
                .into_connection(),
        );

        let request = service(Arc::clone(&db))
            .request_deletion(&deleter(), "guest1", Some("spam".to_string()))
            .await
            .unwrap();
        assert_eq!(request.status, DeletionRequestStatus::Pending);

        let sql = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert!(sql.contains("guest1@example.com"));
        assert!(sql.contains(ROOT));
    }

    #[tokio::test]
    async fn test_second_request_conflicts() {
        let target = fixtures::user_with_role("guest1", Role::Guest);
        let existing =
            fixtures::deletion_request("req1", "guest1", "sub1", DeletionRequestStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[target]])
                .append_query_results([[existing]])
                .into_connection(),
        );

        let result = service(db)
            .request_deletion(&deleter(), "guest1", None)
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_request_requires_sub_admin_with_permission() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = service(db);

        let admin = fixtures::user_with_role("admin1", Role::Admin);
        let result = svc.request_deletion(&admin, "guest1", None).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let sub = fixtures::sub_admin("sub2", Permissions::default());
        let result = svc.request_deletion(&sub, "guest1", None).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_reject_deletes_nothing_and_cannot_resolve_twice() {
        let pending =
            fixtures::deletion_request("req1", "guest1", "sub1", DeletionRequestStatus::Pending);
        let mut rejected = pending.clone();
        rejected.status = DeletionRequestStatus::Rejected;
        rejected.processed_by = Some(ROOT.to_string());
        rejected.processed_at = Some(chrono::Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[pending]])
                .append_exec_results([rows(1)])
                .append_query_results([[rejected]])
                .append_query_results([[fixtures::notification("n1", "sub1")]])
                // Second attempt: no pending row left
                .append_query_results([Vec::<pending_user_deletion::Model>::new()])
                .into_connection(),
        );

        let svc = service(Arc::clone(&db));
        let resolved = svc
            .resolve_deletion(&root(), "req1", Resolution::Reject)
            .await
            .unwrap();
        assert_eq!(resolved.status, DeletionRequestStatus::Rejected);
        assert!(resolved.processed_at.is_some());

        let again = svc
            .resolve_deletion(&root(), "req1", Resolution::Approve)
            .await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
        drop(svc);

        let sql = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert!(!sql.contains("DELETE"));
    }

    #[tokio::test]
    async fn test_approve_runs_cascade_and_marks_approved() {
        let pending =
            fixtures::deletion_request("req1", "hostH", "sub1", DeletionRequestStatus::Pending);
        let mut approved = pending.clone();
        approved.status = DeletionRequestStatus::Approved;
        approved.processed_by = Some(ROOT.to_string());
        approved.processed_at = Some(chrono::Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[pending]])
                // Hosted property ids
                .append_query_results([vec![BTreeMap::from([(
                    "id",
                    Value::from("p1".to_string()),
                )])]])
                .append_exec_results([
                    rows(1), // bookings on p1
                    rows(1), // reviews on p1
                    rows(1), // p1
                    rows(0), // own bookings
                    rows(0), // own reviews
                    rows(2), // notifications
                    rows(1), // user
                    rows(1), // status transition
                ])
                .append_query_results([[approved]])
                .append_query_results([[fixtures::notification("n1", "sub1")]])
                .into_connection(),
        );

        let resolved = service(Arc::clone(&db))
            .resolve_deletion(&root(), "req1", Resolution::Approve)
            .await
            .unwrap();
        assert_eq!(resolved.status, DeletionRequestStatus::Approved);
        assert!(resolved.processed_at.is_some());

        let sql = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert!(sql.contains("DELETE FROM \\\"user\\\""));
        assert!(sql.contains("approved"));
    }

    #[tokio::test]
    async fn test_approve_tolerates_vanished_user() {
        let pending =
            fixtures::deletion_request("req1", "ghost", "sub1", DeletionRequestStatus::Pending);
        let mut approved = pending.clone();
        approved.status = DeletionRequestStatus::Approved;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[pending]])
                .append_query_results([Vec::<BTreeMap<&'static str, Value>>::new()])
                .append_exec_results([rows(0), rows(0), rows(0), rows(0), rows(1)])
                .append_query_results([[approved]])
                .into_connection(),
        );

        let resolved = service(db)
            .resolve_deletion(&root(), "req1", Resolution::Approve)
            .await
            .unwrap();
        assert_eq!(resolved.status, DeletionRequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_only_super_admin_resolves_and_lists() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = service(db);

        let other_admin = fixtures::user_with_role("admin2", Role::Admin);
        let result = svc
            .resolve_deletion(&other_admin, "req1", Resolution::Reject)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(matches!(
            svc.list_pending(&other_admin).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_unset_super_admin_locks_everyone_out() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let user_repo = UserRepository::new(Arc::clone(&db));
        let svc = PendingDeletionService::new(
            PendingDeletionRepository::new(Arc::clone(&db)),
            user_repo.clone(),
            CascadeService::new(CascadeRepository::new(Arc::clone(&db))),
            NotificationService::new(NotificationRepository::new(db), user_repo),
            AuthConfig::default(),
        );

        assert!(matches!(
            svc.list_pending(&root()).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
