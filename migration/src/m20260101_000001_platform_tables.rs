//! 平台表迁移
//!
//! `orgs`、`broadcasts`、`msgs` 由消息平台拥有，这里只在表不存在时创建，
//! 使工具和测试可以在空数据库上运行。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orgs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orgs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orgs::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Orgs::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Orgs::CreatedOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Broadcasts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Broadcasts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Broadcasts::OrgId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Broadcasts::IsBulkSend)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Broadcasts::CreatedOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Msgs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Msgs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Msgs::OrgId).big_integer().not_null())
                    .col(ColumnDef::new(Msgs::ContactId).big_integer().not_null())
                    .col(ColumnDef::new(Msgs::BroadcastId).big_integer().null())
                    .col(ColumnDef::new(Msgs::Direction).string_len(1).not_null())
                    .col(
                        ColumnDef::new(Msgs::Status)
                            .string_len(1)
                            .not_null()
                            .default("P"),
                    )
                    .col(ColumnDef::new(Msgs::TemplatePrice).double().null())
                    .col(
                        ColumnDef::new(Msgs::CreatedOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Msgs::ModifiedOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 按天扫描使用的复合索引：(org_id, created_on, id)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_msgs_org_created_id")
                    .table(Msgs::Table)
                    .col(Msgs::OrgId)
                    .col(Msgs::CreatedOn)
                    .col(Msgs::Id)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_msgs_broadcast")
                    .table(Msgs::Table)
                    .col(Msgs::BroadcastId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_msgs_broadcast")
                    .table(Msgs::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_msgs_org_created_id")
                    .table(Msgs::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Msgs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Broadcasts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orgs::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Orgs {
    Table,
    Id,
    Name,
    IsActive,
    CreatedOn,
}

#[derive(DeriveIden)]
enum Broadcasts {
    Table,
    Id,
    OrgId,
    IsBulkSend,
    CreatedOn,
}

#[derive(DeriveIden)]
enum Msgs {
    Table,
    Id,
    OrgId,
    ContactId,
    BroadcastId,
    Direction,
    Status,
    TemplatePrice,
    CreatedOn,
    ModifiedOn,
}
