//! Approval workflow for accounts and listings.

use sea_orm::Set;
use stayhub_common::AppResult;
use stayhub_db::{
    entities::{property, user},
    repositories::{PropertyRepository, UserRepository},
};

use crate::services::access::{Capability, require_admin, require_capability};
use crate::services::notification::{NotificationService, dispatch_best_effort};

/// Approval service.
#[derive(Clone)]
pub struct ApprovalService {
    user_repo: UserRepository,
    property_repo: PropertyRepository,
    notifications: NotificationService,
}

impl ApprovalService {
    /// Create a new approval service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        property_repo: PropertyRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            user_repo,
            property_repo,
            notifications,
        }
    }

    /// Approve a user, or revoke their approval when `revoke` is set.
    ///
    /// The user is only notified when the flag actually changes.
    pub async fn approve_user(
        &self,
        actor: &user::Model,
        user_id: &str,
        revoke: bool,
    ) -> AppResult<user::Model> {
        require_capability(actor, Capability::ApproveUsers)?;

        let target = self.user_repo.get_by_id(user_id).await?;
        if target.is_approved == !revoke {
            return Ok(target);
        }

        let mut active: user::ActiveModel = target.into();
        active.is_approved = Set(!revoke);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        let updated = self.user_repo.update(active).await?;

        tracing::info!(
            user_id = %updated.id,
            actor_id = %actor.id,
            approved = !revoke,
            "User approval changed"
        );

        if revoke {
            dispatch_best_effort(
                "user_revoked",
                self.notifications.notify_user_revoked(&updated.id),
            )
            .await;
        } else {
            dispatch_best_effort(
                "user_approved",
                self.notifications.notify_user_approved(&updated.id),
            )
            .await;
        }

        Ok(updated)
    }

    /// Publish a listing and tell its host.
    pub async fn approve_property(
        &self,
        actor: &user::Model,
        property_id: &str,
    ) -> AppResult<property::Model> {
        require_admin(actor)?;

        let property = self.property_repo.get_by_id(property_id).await?;
        let approved = self.property_repo.mark_approved(property).await?;

        tracing::info!(property_id = %approved.id, actor_id = %actor.id, "Property approved");

        dispatch_best_effort(
            "property_approved",
            self.notifications
                .notify_property_approved(&approved.host_id, &approved.id, &approved.title),
        )
        .await;

        Ok(approved)
    }
}
