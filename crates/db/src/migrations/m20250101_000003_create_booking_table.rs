//! Create booking table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Booking::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Booking::PropertyId).string_len(32).not_null())
                    .col(ColumnDef::new(Booking::GuestId).string_len(32).not_null())
                    .col(ColumnDef::new(Booking::CheckIn).date().not_null())
                    .col(ColumnDef::new(Booking::CheckOut).date().not_null())
                    .col(ColumnDef::new(Booking::Guests).integer().not_null().default(1))
                    .col(ColumnDef::new(Booking::TotalPrice).big_integer().not_null())
                    .col(
                        ColumnDef::new(Booking::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Booking::PaymentStatus)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Booking::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_property_id")
                    .table(Booking::Table)
                    .col(Booking::PropertyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_guest_id")
                    .table(Booking::Table)
                    .col(Booking::GuestId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Booking {
    Table,
    Id,
    PropertyId,
    GuestId,
    CheckIn,
    CheckOut,
    Guests,
    TotalPrice,
    Status,
    PaymentStatus,
    CreatedAt,
}
