//! Cascading deletes for properties and users.
//!
//! There are no foreign keys between tables, so dependents are removed here
//! explicitly, children before parents, inside one transaction.

use std::sync::Arc;

use crate::entities::{Booking, Notification, Property, Review, User, booking, notification, property, review};
use stayhub_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
    QuerySelect, TransactionTrait,
};

/// Rows removed by a property cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyPurge {
    pub bookings_deleted: u64,
    pub reviews_deleted: u64,
    /// False when the property row was already gone.
    pub property_removed: bool,
}

/// Rows removed by a user cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserPurge {
    pub properties_deleted: u64,
    pub bookings_deleted: u64,
    pub reviews_deleted: u64,
    pub notifications_deleted: u64,
    /// False when the user row was already gone.
    pub user_removed: bool,
}

/// Cascade repository.
#[derive(Clone)]
pub struct CascadeRepository {
    db: Arc<DatabaseConnection>,
}

impl CascadeRepository {
    /// Create a new cascade repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Delete a property with its bookings and reviews.
    ///
    /// The transaction commits even when the property itself is missing.
    pub async fn purge_property(&self, property_id: &str) -> AppResult<PropertyPurge> {
        let txn = self.begin().await?;

        let purge = purge_property_in(&txn, property_id).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(purge)
    }

    /// Delete a user with everything that references them.
    ///
    /// Order: bookings and reviews of hosted properties, the properties, the
    /// user's own bookings and reviews, notifications, then the user row.
    pub async fn purge_user(&self, user_id: &str) -> AppResult<UserPurge> {
        let txn = self.begin().await?;

        let purge = purge_user_in(&txn, user_id).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(purge)
    }

    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db.begin().await.map_err(db_err)
    }
}

fn db_err(e: DbErr) -> AppError {
    AppError::Database(e.to_string())
}

async fn purge_property_in(
    txn: &DatabaseTransaction,
    property_id: &str,
) -> Result<PropertyPurge, DbErr> {
    let bookings = Booking::delete_many()
        .filter(booking::Column::PropertyId.eq(property_id))
        .exec(txn)
        .await?;

    let reviews = Review::delete_many()
        .filter(review::Column::PropertyId.eq(property_id))
        .exec(txn)
        .await?;

    let property = Property::delete_by_id(property_id).exec(txn).await?;

    Ok(PropertyPurge {
        bookings_deleted: bookings.rows_affected,
        reviews_deleted: reviews.rows_affected,
        property_removed: property.rows_affected > 0,
    })
}

async fn purge_user_in(txn: &DatabaseTransaction, user_id: &str) -> Result<UserPurge, DbErr> {
    let mut purge = UserPurge::default();

    let hosted: Vec<String> = Property::find()
        .select_only()
        .column(property::Column::Id)
        .filter(property::Column::HostId.eq(user_id))
        .into_tuple()
        .all(txn)
        .await?;

    if !hosted.is_empty() {
        purge.bookings_deleted += Booking::delete_many()
            .filter(booking::Column::PropertyId.is_in(hosted.iter().cloned()))
            .exec(txn)
            .await?
            .rows_affected;

        purge.reviews_deleted += Review::delete_many()
            .filter(review::Column::PropertyId.is_in(hosted.iter().cloned()))
            .exec(txn)
            .await?
            .rows_affected;

        purge.properties_deleted = Property::delete_many()
            .filter(property::Column::Id.is_in(hosted))
            .exec(txn)
            .await?
            .rows_affected;
    }

    purge.bookings_deleted += Booking::delete_many()
        .filter(booking::Column::GuestId.eq(user_id))
        .exec(txn)
        .await?
        .rows_affected;

    purge.reviews_deleted += Review::delete_many()
        .filter(review::Column::GuestId.eq(user_id))
        .exec(txn)
        .await?
        .rows_affected;

    purge.notifications_deleted = Notification::delete_many()
        .filter(notification::Column::UserId.eq(user_id))
        .exec(txn)
        .await?
        .rows_affected;

    purge.user_removed = User::delete_by_id(user_id).exec(txn).await?.rows_affected > 0;

    Ok(purge)
}
