use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseBackend, EntityTrait, QueryFilter,
    Statement,
};

use super::{SeaOrmStorage, StorageOp};
use crate::errors::Result;
use migration::entities::broadcast_statistics;

const MYSQL_INSERT_IGNORE: &str = r#"INSERT IGNORE INTO broadcast_statistics
(broadcast_id, sent, delivered, failed, `read`, processed, cost, created_on, modified_on)
VALUES (?, 0, 0, 0, 0, 0, 0, ?, ?)"#;

impl SeaOrmStorage {
    pub async fn get_broadcast_statistics(
        &self,
        broadcast_id: i64,
    ) -> Result<Option<broadcast_statistics::Model>> {
        let db = &self.db;
        self.retry(StorageOp::GetBroadcastStatistics, || async move {
            broadcast_statistics::Entity::find()
                .filter(broadcast_statistics::Column::BroadcastId.eq(broadcast_id))
                .one(db)
                .await
        })
        .await
    }

    /// 为群发创建全零统计行；已存在时不做任何修改
    ///
    /// 返回是否新建。
    pub async fn create_broadcast_statistics(&self, broadcast_id: i64) -> Result<bool> {
        let db = &self.db;
        let backend = self.backend();
        let inserted = self
            .retry(StorageOp::CreateBroadcastStatistics, || async move {
                let now = Utc::now();
                if backend == DatabaseBackend::MySql {
                    let stmt = Statement::from_sql_and_values(
                        DatabaseBackend::MySql,
                        MYSQL_INSERT_IGNORE,
                        [broadcast_id.into(), now.into(), now.into()],
                    );
                    return Ok(db.execute_raw(stmt).await?.rows_affected());
                }

                let row = broadcast_statistics::ActiveModel {
                    broadcast_id: Set(broadcast_id),
                    sent: Set(0),
                    delivered: Set(0),
                    failed: Set(0),
                    read: Set(0),
                    processed: Set(0),
                    cost: Set(0.0),
                    created_on: Set(now),
                    modified_on: Set(now),
                    ..Default::default()
                };
                broadcast_statistics::Entity::insert(row)
                    .on_conflict(
                        OnConflict::column(broadcast_statistics::Column::BroadcastId)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await
            })
            .await?;

        Ok(inserted > 0)
    }
}
