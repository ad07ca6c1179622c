//! Property repository.

use std::sync::Arc;

use crate::entities::{Property, property};
use stayhub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, sea_query::Expr,
};

/// Public browse filters.
#[derive(Debug, Clone, Default)]
pub struct BrowseFilter {
    /// Case-insensitive substring of `location.city`.
    pub city: Option<String>,
    /// Exact listing type.
    pub property_type: Option<String>,
    /// Minimum guest capacity.
    pub min_guests: Option<i32>,
}

/// Property repository for database operations.
#[derive(Clone)]
pub struct PropertyRepository {
    db: Arc<DatabaseConnection>,
}

impl PropertyRepository {
    /// Create a new property repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a property by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<property::Model>> {
        Property::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a property by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<property::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Property {id}")))
    }

    /// Find a property by slug or by id.
    pub async fn find_by_slug_or_id(&self, key: &str) -> AppResult<Option<property::Model>> {
        Property::find()
            .filter(
                Condition::any()
                    .add(property::Column::Slug.eq(key))
                    .add(property::Column::Id.eq(key)),
            )
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Properties owned by a host, newest first.
    pub async fn find_by_host(&self, host_id: &str) -> AppResult<Vec<property::Model>> {
        Property::find()
            .filter(property::Column::HostId.eq(host_id))
            .order_by_desc(property::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active and approved listings matching `filter`, newest first.
    pub async fn find_published(
        &self,
        filter: &BrowseFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<property::Model>> {
        let mut query = Property::find()
            .filter(property::Column::IsActive.eq(true))
            .filter(property::Column::IsApprovedByAdmin.eq(true))
            .order_by_desc(property::Column::CreatedAt);

        if let Some(city) = &filter.city {
            query = query.filter(Expr::cust_with_values(
                "\"location\" ->> 'city' ILIKE $1",
                [format!("%{city}%")],
            ));
        }
        if let Some(kind) = &filter.property_type {
            query = query.filter(property::Column::PropertyType.eq(kind.as_str()));
        }
        if let Some(min) = filter.min_guests {
            query = query.filter(property::Column::MaxGuests.gte(min));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Back-office listing, optionally only listings waiting for approval.
    pub async fn list(
        &self,
        pending_only: bool,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<property::Model>> {
        let mut query = Property::find().order_by_desc(property::Column::CreatedAt);

        if pending_only {
            query = query.filter(property::Column::IsApprovedByAdmin.eq(false));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new property.
    pub async fn create(&self, model: property::ActiveModel) -> AppResult<property::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Slug already in use".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Update a property.
    pub async fn update(&self, model: property::ActiveModel) -> AppResult<property::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Publish a listing: both flags go true in a single UPDATE.
    pub async fn mark_approved(&self, property: property::Model) -> AppResult<property::Model> {
        let mut active: property::ActiveModel = property.into();
        active.is_active = Set(true);
        active.is_approved_by_admin = Set(true);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.update(active).await
    }
}
