//! Message entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "msgs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub org_id: i64,
    pub contact_id: i64,
    pub broadcast_id: Option<i64>,
    /// `I` inbound, `O` outbound
    #[sea_orm(column_type = "String(StringLen::N(1))")]
    pub direction: String,
    /// Single character status code (Q, W, S, D, F, V, ...)
    #[sea_orm(column_type = "String(StringLen::N(1))")]
    pub status: String,
    pub template_price: Option<f64>,
    pub created_on: DateTimeUtc,
    pub modified_on: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
