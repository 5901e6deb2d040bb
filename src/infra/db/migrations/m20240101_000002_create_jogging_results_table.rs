//! Migration: Create the jogging_results table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JoggingResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JoggingResults::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JoggingResults::UserId).uuid().not_null())
                    .col(ColumnDef::new(JoggingResults::Date).date().not_null())
                    .col(
                        ColumnDef::new(JoggingResults::RunningDistance)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(JoggingResults::Time).integer().not_null())
                    .col(ColumnDef::new(JoggingResults::Latitude).double().not_null())
                    .col(
                        ColumnDef::new(JoggingResults::Longitude)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JoggingResults::Condition)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(JoggingResults::IsoWeek).integer().not_null())
                    .col(ColumnDef::new(JoggingResults::IsoYear).integer().not_null())
                    .col(
                        ColumnDef::new(JoggingResults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JoggingResults::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jogging_results_user")
                            .from(JoggingResults::Table, JoggingResults::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing is always per owner, ordered by date
        manager
            .create_index(
                Index::create()
                    .name("idx_jogging_results_user_date")
                    .table(JoggingResults::Table)
                    .col(JoggingResults::UserId)
                    .col(JoggingResults::Date)
                    .to_owned(),
            )
            .await?;

        // Weekly report grouping key
        manager
            .create_index(
                Index::create()
                    .name("idx_jogging_results_user_week")
                    .table(JoggingResults::Table)
                    .col(JoggingResults::UserId)
                    .col(JoggingResults::IsoYear)
                    .col(JoggingResults::IsoWeek)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JoggingResults::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum JoggingResults {
    Table,
    Id,
    UserId,
    Date,
    RunningDistance,
    Time,
    Latitude,
    Longitude,
    Condition,
    IsoWeek,
    IsoYear,
    CreatedAt,
    UpdatedAt,
}
