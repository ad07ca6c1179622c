//! Create pending user deletion table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PendingUserDeletion::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PendingUserDeletion::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PendingUserDeletion::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingUserDeletion::UserEmail)
                            .string_len(320)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingUserDeletion::UserName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingUserDeletion::RequestedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PendingUserDeletion::Reason).text())
                    .col(
                        ColumnDef::new(PendingUserDeletion::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(PendingUserDeletion::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(PendingUserDeletion::ProcessedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(PendingUserDeletion::ProcessedBy).string_len(32))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pending_user_deletion_status_created_at")
                    .table(PendingUserDeletion::Table)
                    .col(PendingUserDeletion::Status)
                    .col(PendingUserDeletion::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // At most one open request per user
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_pending_user_deletion_open_user
                ON pending_user_deletion (user_id)
                WHERE status = 'pending';
                ",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PendingUserDeletion::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PendingUserDeletion {
    Table,
    Id,
    UserId,
    UserEmail,
    UserName,
    RequestedBy,
    Reason,
    Status,
    CreatedAt,
    ProcessedAt,
    ProcessedBy,
}
