//! Create property table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Property::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Property::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Property::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Property::Slug).string_len(320).not_null())
                    .col(ColumnDef::new(Property::Description).text().not_null())
                    .col(ColumnDef::new(Property::PropertyType).string_len(64).not_null())
                    .col(ColumnDef::new(Property::Bedrooms).integer().not_null().default(0))
                    .col(ColumnDef::new(Property::Bathrooms).integer().not_null().default(0))
                    .col(ColumnDef::new(Property::MaxGuests).integer().not_null().default(1))
                    .col(ColumnDef::new(Property::PricePerNight).big_integer().not_null())
                    .col(
                        ColumnDef::new(Property::Images)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Property::Amenities)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Property::Location)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'{}'::jsonb")),
                    )
                    .col(ColumnDef::new(Property::HostId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Property::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Property::IsApprovedByAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Property::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Property::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_property_slug")
                    .table(Property::Table)
                    .col(Property::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_property_host_id")
                    .table(Property::Table)
                    .col(Property::HostId)
                    .to_owned(),
            )
            .await?;

        // Public browse: (is_active, is_approved_by_admin, created_at)
        manager
            .create_index(
                Index::create()
                    .name("idx_property_published")
                    .table(Property::Table)
                    .col(Property::IsActive)
                    .col(Property::IsApprovedByAdmin)
                    .col(Property::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Property::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Property {
    Table,
    Id,
    Title,
    Slug,
    Description,
    PropertyType,
    Bedrooms,
    Bathrooms,
    MaxGuests,
    PricePerNight,
    Images,
    Amenities,
    Location,
    HostId,
    IsActive,
    IsApprovedByAdmin,
    CreatedAt,
    UpdatedAt,
}
