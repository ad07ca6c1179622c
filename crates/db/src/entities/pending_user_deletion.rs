//! Pending user deletion entity: a sub-admin's request awaiting the super-admin.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Resolution state of a deletion request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum DeletionRequestStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pending_user_deletion")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// User to be deleted
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Snapshot of the target's email at request time
    pub user_email: String,

    /// Snapshot of the target's name at request time
    pub user_name: String,

    /// Sub-admin who filed the request
    pub requested_by: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,

    pub status: DeletionRequestStatus,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub processed_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub processed_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
