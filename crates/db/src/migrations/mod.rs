//! Database migrations.
//!
//! Tables carry indexes only, no foreign keys; dependent rows are removed by
//! the cascade repository.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_table;
mod m20250101_000002_create_property_table;
mod m20250101_000003_create_booking_table;
mod m20250101_000004_create_review_table;
mod m20250101_000005_create_notification_table;
mod m20250101_000006_create_pending_user_deletion_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user_table::Migration),
            Box::new(m20250101_000002_create_property_table::Migration),
            Box::new(m20250101_000003_create_booking_table::Migration),
            Box::new(m20250101_000004_create_review_table::Migration),
            Box::new(m20250101_000005_create_notification_table::Migration),
            Box::new(m20250101_000006_create_pending_user_deletion_table::Migration),
        ]
    }
}
