//! Pending user deletion repository.

use std::sync::Arc;

use crate::entities::{PendingUserDeletion, pending_user_deletion};
use chrono::Utc;
use stayhub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};

use crate::entities::pending_user_deletion::DeletionRequestStatus;

/// Pending deletion repository for database operations.
#[derive(Clone)]
pub struct PendingDeletionRepository {
    db: Arc<DatabaseConnection>,
}

impl PendingDeletionRepository {
    /// Create a new pending deletion repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a request by ID, whatever its status.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<pending_user_deletion::Model>> {
        PendingUserDeletion::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a still-pending request by ID.
    pub async fn find_pending_by_id(
        &self,
        id: &str,
    ) -> AppResult<Option<pending_user_deletion::Model>> {
        PendingUserDeletion::find_by_id(id)
            .filter(pending_user_deletion::Column::Status.eq(DeletionRequestStatus::Pending))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the pending request for a user, if any.
    pub async fn find_pending_by_user_id(
        &self,
        user_id: &str,
    ) -> AppResult<Option<pending_user_deletion::Model>> {
        PendingUserDeletion::find()
            .filter(pending_user_deletion::Column::UserId.eq(user_id))
            .filter(pending_user_deletion::Column::Status.eq(DeletionRequestStatus::Pending))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All pending requests, newest first.
    pub async fn find_pending(&self) -> AppResult<Vec<pending_user_deletion::Model>> {
        PendingUserDeletion::find()
            .filter(pending_user_deletion::Column::Status.eq(DeletionRequestStatus::Pending))
            .order_by_desc(pending_user_deletion::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new request.
    ///
    /// The partial unique index on pending rows turns a concurrent duplicate into `Conflict`.
    pub async fn create(
        &self,
        model: pending_user_deletion::ActiveModel,
    ) -> AppResult<pending_user_deletion::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("A deletion request is already pending for this user".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Move a pending request to a terminal status.
    ///
    /// The update only matches rows still `pending`, so a request is resolved at most
    /// once. Returns whether the transition happened.
    pub async fn resolve(
        &self,
        id: &str,
        status: DeletionRequestStatus,
        processed_by: &str,
    ) -> AppResult<bool> {
        let result = PendingUserDeletion::update_many()
            .col_expr(pending_user_deletion::Column::Status, Expr::value(status))
            .col_expr(
                pending_user_deletion::Column::ProcessedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .col_expr(
                pending_user_deletion::Column::ProcessedBy,
                Expr::value(processed_by.to_string()),
            )
            .filter(pending_user_deletion::Column::Id.eq(id))
            .filter(pending_user_deletion::Column::Status.eq(DeletionRequestStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_resolve_only_touches_pending_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = PendingDeletionRepository::new(Arc::clone(&db));
        assert!(
            repo.resolve("req1", DeletionRequestStatus::Rejected, "root")
                .await
                .unwrap()
        );
        assert!(
            !repo
                .resolve("req1", DeletionRequestStatus::Approved, "root")
                .await
                .unwrap()
        );
        drop(repo);

        let sql = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert!(sql.contains("rejected"));
        assert!(sql.contains("\\\"status\\\" = $"));
    }
}
