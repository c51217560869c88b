//! 群发统计实体
//!
//! 计数字段只由状态触发器累加，从不减少。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "broadcast_statistics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub broadcast_id: i64,
    pub sent: i64,
    pub delivered: i64,
    pub failed: i64,
    pub read: i64,
    pub processed: i64,
    pub cost: f64,
    pub created_on: DateTimeUtc,
    pub modified_on: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
