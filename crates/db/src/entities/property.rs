//! Property (listing) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "property")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    /// URL slug, unique across listings
    #[sea_orm(unique)]
    pub slug: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Free-form listing type (villa, apartment, cabin...)
    pub property_type: String,

    pub bedrooms: i32,

    pub bathrooms: i32,

    pub max_guests: i32,

    /// Nightly price in whole currency units
    pub price_per_night: i64,

    /// Image URLs (JSON array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub images: Json,

    /// Amenity labels (JSON array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub amenities: Json,

    /// Address sub-record
    #[sea_orm(column_type = "JsonBinary")]
    pub location: Json,

    /// Owning user. Not a live foreign key: host removal goes through the cascade.
    #[sea_orm(indexed)]
    pub host_id: String,

    #[sea_orm(default_value = false)]
    pub is_active: bool,

    #[sea_orm(default_value = false)]
    pub is_approved_by_admin: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether the listing is visible to the public.
    #[must_use]
    pub const fn is_published(&self) -> bool {
        self.is_active && self.is_approved_by_admin
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::HostId",
        to = "super::user::Column::Id"
    )]
    Host,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Host.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
