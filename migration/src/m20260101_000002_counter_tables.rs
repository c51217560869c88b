//! 计数表迁移
//!
//! - unique_contact_counts: (org_id, day) 唯一，回填任务的 upsert 目标
//! - broadcast_statistics: 每个群发一行，由状态触发器累加

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. unique_contact_counts
        manager
            .create_table(
                Table::create()
                    .table(UniqueContactCounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UniqueContactCounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UniqueContactCounts::OrgId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UniqueContactCounts::Day).date().not_null())
                    .col(
                        ColumnDef::new(UniqueContactCounts::Count)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UniqueContactCounts::CreatedOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UniqueContactCounts::ModifiedOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一索引：org_id + day
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_unique_contact_counts_org_day")
                    .table(UniqueContactCounts::Table)
                    .col(UniqueContactCounts::OrgId)
                    .col(UniqueContactCounts::Day)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 2. broadcast_statistics
        manager
            .create_table(
                Table::create()
                    .table(BroadcastStatistics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BroadcastStatistics::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BroadcastStatistics::BroadcastId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BroadcastStatistics::Sent)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BroadcastStatistics::Delivered)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BroadcastStatistics::Failed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BroadcastStatistics::Read)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BroadcastStatistics::Processed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BroadcastStatistics::Cost)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(BroadcastStatistics::CreatedOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BroadcastStatistics::ModifiedOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_broadcast_statistics_broadcast")
                    .table(BroadcastStatistics::Table)
                    .col(BroadcastStatistics::BroadcastId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_broadcast_statistics_broadcast")
                    .table(BroadcastStatistics::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(BroadcastStatistics::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_unique_contact_counts_org_day")
                    .table(UniqueContactCounts::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(UniqueContactCounts::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum UniqueContactCounts {
    Table,
    Id,
    OrgId,
    Day,
    Count,
    CreatedOn,
    ModifiedOn,
}

#[derive(DeriveIden)]
enum BroadcastStatistics {
    Table,
    Id,
    BroadcastId,
    Sent,
    Delivered,
    Failed,
    Read,
    Processed,
    Cost,
    CreatedOn,
    ModifiedOn,
}
