//! 消息查询与状态写入

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseBackend, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
    TransactionTrait,
};
use tracing::debug;

use super::retry::{into_storage_error, with_retry};
use super::{SeaOrmStorage, StorageOp};
use crate::errors::{MsgstatsError, Result};
use crate::stats::{
    CounterDelta, DayWindow, Direction, MessageCounter, MessageStore, MsgStatus, StatusUpdate,
};
use migration::entities::{broadcast, msg};

#[async_trait]
impl MessageCounter for SeaOrmStorage {
    async fn count_unique_inbound_contacts(&self, org_id: i64, window: &DayWindow) -> Result<u64> {
        let query = msg::Entity::find()
            .select_only()
            .column(msg::Column::ContactId)
            .filter(msg::Column::OrgId.eq(org_id))
            .filter(msg::Column::Direction.eq(Direction::Inbound.code()))
            .filter(msg::Column::CreatedOn.gte(window.start))
            .filter(msg::Column::CreatedOn.lt(window.end))
            .distinct();

        let db = &self.db;
        self.retry(StorageOp::CountInboundContacts, || {
            let query = query.clone();
            async move { query.count(db).await }
        })
        .await
    }
}

/// 状态写入前读取到的消息快照
struct StatusWrite {
    previous: MsgStatus,
    template_price: Option<f64>,
    tracked: bool,
}

impl SeaOrmStorage {
    /// 在一个事务中读取旧状态并写入新状态，触发器在同一事务内更新群发统计
    ///
    /// 旧状态无法识别时回滚，不写入；状态未变时不执行 UPDATE。
    async fn write_status(&self, msg_id: i64, status: MsgStatus) -> std::result::Result<StatusWrite, DbErr> {
        let txn = self.db.begin().await?;

        let mut find = msg::Entity::find_by_id(msg_id);
        if self.backend() != DatabaseBackend::Sqlite {
            find = find.lock_exclusive();
        }
        let message = find
            .one(&txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("msg id={}", msg_id)))?;

        let previous = match MsgStatus::from_code(&message.status) {
            Ok(previous) => previous,
            Err(_) => {
                txn.rollback().await?;
                return Err(DbErr::Custom(format!(
                    "Message with id={} has unknown stored status '{}'",
                    msg_id, message.status
                )));
            }
        };

        let tracked = match message.broadcast_id {
            Some(broadcast_id) => broadcast::Entity::find_by_id(broadcast_id)
                .one(&txn)
                .await?
                .is_some_and(|b| b.is_bulk_send),
            None => false,
        };

        if previous != status {
            msg::Entity::update_many()
                .col_expr(msg::Column::Status, Expr::value(status.code()))
                .col_expr(msg::Column::ModifiedOn, Expr::value(Utc::now()))
                .filter(msg::Column::Id.eq(msg_id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        Ok(StatusWrite {
            previous,
            template_price: message.template_price,
            tracked,
        })
    }
}

#[async_trait]
impl MessageStore for SeaOrmStorage {
    async fn update_status(&self, msg_id: i64, status: MsgStatus) -> Result<StatusUpdate> {
        let written = with_retry(StorageOp::UpdateStatus, self.retry_config, || {
            self.write_status(msg_id, status)
        })
        .await
        .map_err(|e| match e {
            DbErr::RecordNotFound(_) => {
                MsgstatsError::not_found(format!("Message with id={} not found", msg_id))
            }
            other => into_storage_error(StorageOp::UpdateStatus, other),
        })?;
        let previous = written.previous;

        let delta = (written.tracked && previous != status)
            .then(|| CounterDelta::for_transition(previous, status, written.template_price));
        debug!(msg_id, from = %previous, to = %status, tracked = written.tracked, "Status written");

        Ok(StatusUpdate {
            msg_id,
            previous,
            current: status,
            delta,
        })
    }
}
