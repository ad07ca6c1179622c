//! Guest reviews.

use sea_orm::Set;
use serde::Deserialize;
use stayhub_common::{AppResult, IdGenerator};
use stayhub_db::{
    entities::{review, user},
    repositories::{PropertyRepository, ReviewRepository},
};
use validator::Validate;

use crate::services::admin_user::MAX_PAGE_SIZE;
use crate::services::notification::{NotificationService, dispatch_best_effort};

/// Input for reviewing a stay.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewInput {
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,

    #[validate(length(max = 2000))]
    #[serde(default)]
    pub comment: String,
}

/// Review service.
#[derive(Clone)]
pub struct ReviewService {
    review_repo: ReviewRepository,
    property_repo: PropertyRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl ReviewService {
    /// Create a new review service.
    #[must_use]
    pub const fn new(
        review_repo: ReviewRepository,
        property_repo: PropertyRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            review_repo,
            property_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Review a property.
    pub async fn create(
        &self,
        actor: &user::Model,
        property_id: &str,
        input: CreateReviewInput,
    ) -> AppResult<review::Model> {
        input.validate()?;

        let property = self.property_repo.get_by_id(property_id).await?;

        let model = review::ActiveModel {
            id: Set(self.id_gen.generate()),
            property_id: Set(property.id.clone()),
            guest_id: Set(actor.id.clone()),
            rating: Set(input.rating),
            comment: Set(input.comment.trim().to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let review = self.review_repo.create(model).await?;

        tracing::info!(review_id = %review.id, property_id = %property.id, "Review posted");

        dispatch_best_effort(
            "new_review",
            self.notifications.notify_new_review(
                &property.host_id,
                &review.id,
                &property.title,
                review.rating,
            ),
        )
        .await;

        Ok(review)
    }

    /// Reviews of a property, newest first.
    pub async fn list(
        &self,
        property_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<review::Model>> {
        self.review_repo
            .find_by_property(property_id, limit.min(MAX_PAGE_SIZE), offset)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use stayhub_common::AppError;
    use stayhub_db::{
        entities::{property, user::Role},
        repositories::{NotificationRepository, UserRepository},
    };
    use std::sync::Arc;

    fn service(db: Arc<DatabaseConnection>) -> ReviewService {
        ReviewService::new(
            ReviewRepository::new(Arc::clone(&db)),
            PropertyRepository::new(Arc::clone(&db)),
            NotificationService::new(
                NotificationRepository::new(Arc::clone(&db)),
                UserRepository::new(db),
            ),
        )
    }

    #[tokio::test]
    async fn test_rating_out_of_range() {
        let guest = fixtures::user_with_role("g1", Role::Guest);
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = CreateReviewInput {
            rating: 6,
            comment: String::new(),
        };
        let result = service(db).create(&guest, "p1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_review_unknown_property() {
        let guest = fixtures::user_with_role("g1", Role::Guest);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<property::Model>::new()])
                .into_connection(),
        );

        let input = CreateReviewInput {
            rating: 4,
            comment: "Nice".to_string(),
        };
        let result = service(db).create(&guest, "missing", input).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_review_notifies_host() {
        let guest = fixtures::user_with_role("g1", Role::Guest);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::property("p1", "hostA")]])
                .append_query_results([[fixtures::review("r1", "p1", "g1", 5)]])
                .append_query_results([[fixtures::notification("n1", "hostA")]])
                .into_connection(),
        );

        let input = CreateReviewInput {
            rating: 5,
            comment: "Lovely stay".to_string(),
        };
        let review = service(Arc::clone(&db))
            .create(&guest, "p1", input)
            .await
            .unwrap();
        assert_eq!(review.rating, 5);

        let sql = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert!(sql.contains("5-star review"));
    }
}
