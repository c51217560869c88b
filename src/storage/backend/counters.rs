//! 唯一联系人数 upsert
//!
//! 同一 (org_id, day) 只有一行，后写覆盖。各后端的原子写法：
//! - PostgreSQL: `INSERT .. ON CONFLICT DO UPDATE RETURNING (xmax = 0)`
//! - MySQL: `INSERT IGNORE` + `UPDATE`（同一事务）
//! - SQLite: `INSERT .. ON CONFLICT DO NOTHING` + `UPDATE`（同一事务）

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseBackend, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Statement, TransactionTrait,
};
use tracing::debug;

use super::{SeaOrmStorage, StorageOp};
use crate::errors::{MsgstatsError, Result};
use crate::stats::{CounterStore, UpsertOutcome};
use migration::entities::unique_contact_count;

const PG_UPSERT: &str = r#"INSERT INTO unique_contact_counts (org_id, day, count, created_on, modified_on)
VALUES ($1, $2, $3, $4, $4)
ON CONFLICT (org_id, day) DO UPDATE SET count = EXCLUDED.count, modified_on = EXCLUDED.modified_on
RETURNING (xmax = 0) AS created"#;

const MYSQL_INSERT_IGNORE: &str = r#"INSERT IGNORE INTO unique_contact_counts (org_id, day, count, created_on, modified_on)
VALUES (?, ?, ?, ?, ?)"#;

impl SeaOrmStorage {
    async fn upsert_postgres(
        &self,
        org_id: i64,
        day: NaiveDate,
        count: i64,
        now: DateTime<Utc>,
    ) -> std::result::Result<UpsertOutcome, DbErr> {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            PG_UPSERT,
            [org_id.into(), day.into(), count.into(), now.into()],
        );
        let row = self
            .db
            .query_one_raw(stmt)
            .await?
            .ok_or(DbErr::RecordNotInserted)?;
        let created: bool = row.try_get("", "created")?;

        Ok(if created {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        })
    }

    /// 先尝试插入，未插入则更新
    async fn upsert_insert_then_update(
        &self,
        org_id: i64,
        day: NaiveDate,
        count: i64,
        now: DateTime<Utc>,
    ) -> std::result::Result<UpsertOutcome, DbErr> {
        let txn = self.db.begin().await?;

        let inserted = match self.backend() {
            DatabaseBackend::MySql => {
                let stmt = Statement::from_sql_and_values(
                    DatabaseBackend::MySql,
                    MYSQL_INSERT_IGNORE,
                    [org_id.into(), day.into(), count.into(), now.into(), now.into()],
                );
                txn.execute_raw(stmt).await?.rows_affected()
            }
            _ => {
                let row = unique_contact_count::ActiveModel {
                    org_id: Set(org_id),
                    day: Set(day),
                    count: Set(count),
                    created_on: Set(now),
                    modified_on: Set(now),
                    ..Default::default()
                };
                unique_contact_count::Entity::insert(row)
                    .on_conflict(
                        OnConflict::columns([
                            unique_contact_count::Column::OrgId,
                            unique_contact_count::Column::Day,
                        ])
                        .do_nothing()
                        .to_owned(),
                    )
                    .exec_without_returning(&txn)
                    .await?
            }
        };

        let outcome = if inserted > 0 {
            UpsertOutcome::Created
        } else {
            unique_contact_count::Entity::update_many()
                .col_expr(unique_contact_count::Column::Count, Expr::value(count))
                .col_expr(unique_contact_count::Column::ModifiedOn, Expr::value(now))
                .filter(unique_contact_count::Column::OrgId.eq(org_id))
                .filter(unique_contact_count::Column::Day.eq(day))
                .exec(&txn)
                .await?;
            UpsertOutcome::Updated
        };

        txn.commit().await?;
        Ok(outcome)
    }

    /// 某组织在日期区间（含两端）内的计数行，按日期排序
    pub async fn list_unique_contact_counts(
        &self,
        org_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<unique_contact_count::Model>> {
        let mut query = unique_contact_count::Entity::find()
            .filter(unique_contact_count::Column::OrgId.eq(org_id));
        if let Some(start) = start {
            query = query.filter(unique_contact_count::Column::Day.gte(start));
        }
        if let Some(end) = end {
            query = query.filter(unique_contact_count::Column::Day.lte(end));
        }
        let query = query.order_by_asc(unique_contact_count::Column::Day);

        let db = &self.db;
        self.retry(StorageOp::ListUniqueContactCounts, || {
            let query = query.clone();
            async move { query.all(db).await }
        })
        .await
    }
}

#[async_trait]
impl CounterStore for SeaOrmStorage {
    async fn upsert_unique_contact_count(
        &self,
        org_id: i64,
        day: NaiveDate,
        count: u64,
    ) -> Result<UpsertOutcome> {
        let count = i64::try_from(count)
            .map_err(|_| MsgstatsError::validation(format!("count {} out of range", count)))?;
        let now = Utc::now();

        let outcome = match self.backend() {
            DatabaseBackend::Postgres => {
                self.retry(StorageOp::UpsertUniqueContactCount, || {
                    self.upsert_postgres(org_id, day, count, now)
                })
                .await?
            }
            _ => {
                self.retry(StorageOp::UpsertUniqueContactCount, || {
                    self.upsert_insert_then_update(org_id, day, count, now)
                })
                .await?
            }
        };

        debug!(org_id, %day, count, outcome = outcome.as_str(), "Unique contact count stored");
        Ok(outcome)
    }
}
