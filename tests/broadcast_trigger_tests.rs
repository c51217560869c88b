//! 群发统计触发器测试
//!
//! 状态写入经由 `MessageStore::update_status`，计数由数据库触发器累加。

mod common;

use chrono::Utc;
use common::*;
use migration::entities::{broadcast_statistics, msg};
use msgstats::errors::MsgstatsError;
use msgstats::stats::{CounterDelta, MessageStore, MsgStatus};
use msgstats::storage::SeaOrmStorage;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tempfile::TempDir;

const BULK: i64 = 100;
const SMALL: i64 = 200;

/// 组织 1，群发 100（bulk）与 200（非 bulk），均有全零统计行
async fn setup() -> (SeaOrmStorage, TempDir) {
    let (storage, dir) = create_temp_storage().await;
    let db = storage.get_db();
    add_org(db, 1, "Acme", true).await;
    add_broadcast(db, BULK, 1, true).await;
    add_broadcast(db, SMALL, 1, false).await;
    assert!(storage.create_broadcast_statistics(BULK).await.unwrap());
    assert!(storage.create_broadcast_statistics(SMALL).await.unwrap());
    (storage, dir)
}

async fn stats(storage: &SeaOrmStorage, broadcast_id: i64) -> broadcast_statistics::Model {
    storage
        .get_broadcast_statistics(broadcast_id)
        .await
        .unwrap()
        .expect("statistics row")
}

fn counters(row: &broadcast_statistics::Model) -> (i64, i64, i64, i64, i64) {
    (row.sent, row.delivered, row.failed, row.read, row.processed)
}

// =============================================================================
// 单次转换
// =============================================================================

#[tokio::test]
async fn test_sent_counts_and_adds_template_price() {
    let (storage, _dir) = setup().await;
    add_broadcast_msg(storage.get_db(), 1, Some(BULK), "W", Some(0.25)).await;
    add_broadcast_msg(storage.get_db(), 2, Some(BULK), "W", None).await;

    storage.update_status(1, MsgStatus::Sent).await.unwrap();
    storage.update_status(2, MsgStatus::Sent).await.unwrap();

    let row = stats(&storage, BULK).await;
    assert_eq!(counters(&row), (2, 0, 0, 0, 0));
    assert_eq!(row.cost, 0.25);
}

#[tokio::test]
async fn test_failed_from_queued_is_processed() {
    let (storage, _dir) = setup().await;
    add_broadcast_msg(storage.get_db(), 1, Some(BULK), "Q", None).await;
    add_broadcast_msg(storage.get_db(), 2, Some(BULK), "W", None).await;

    storage.update_status(1, MsgStatus::Failed).await.unwrap();
    storage.update_status(2, MsgStatus::Failed).await.unwrap();

    let row = stats(&storage, BULK).await;
    // 只有 Q → F 计入 processed
    assert_eq!(counters(&row), (0, 0, 2, 0, 1));
}

#[tokio::test]
async fn test_read_and_delivered() {
    let (storage, _dir) = setup().await;
    add_broadcast_msg(storage.get_db(), 1, Some(BULK), "S", None).await;

    storage.update_status(1, MsgStatus::Delivered).await.unwrap();
    storage.update_status(1, MsgStatus::Read).await.unwrap();

    assert_eq!(counters(&stats(&storage, BULK).await), (0, 1, 0, 1, 0));
}

#[tokio::test]
async fn test_wired_refreshes_modified_on() {
    let (storage, _dir) = setup().await;
    let db = storage.get_db();
    add_broadcast_msg(db, 1, Some(BULK), "Q", None).await;
    add_broadcast_msg(db, 2, Some(BULK), "S", None).await;

    let old = at(2025, 1, 1, 0, 0, 0);
    broadcast_statistics::Entity::update_many()
        .col_expr(broadcast_statistics::Column::ModifiedOn, Expr::value(old))
        .filter(broadcast_statistics::Column::BroadcastId.eq(BULK))
        .exec(db)
        .await
        .unwrap();

    // 送达不刷新 modified_on
    storage.update_status(2, MsgStatus::Delivered).await.unwrap();
    assert_eq!(stats(&storage, BULK).await.modified_on, old);

    let before = Utc::now() - chrono::Duration::seconds(5);
    storage.update_status(1, MsgStatus::Wired).await.unwrap();
    let row = stats(&storage, BULK).await;
    assert_eq!(row.processed, 1);
    assert!(row.modified_on > before);
}

// =============================================================================
// 守卫条件
// =============================================================================

#[tokio::test]
async fn test_non_bulk_broadcast_is_not_counted() {
    let (storage, _dir) = setup().await;
    add_broadcast_msg(storage.get_db(), 1, Some(SMALL), "W", Some(1.0)).await;

    let update = storage.update_status(1, MsgStatus::Sent).await.unwrap();
    assert_eq!(update.delta, None);

    let row = stats(&storage, SMALL).await;
    assert_eq!(counters(&row), (0, 0, 0, 0, 0));
    assert_eq!(row.cost, 0.0);
}

#[tokio::test]
async fn test_unchanged_status_is_not_counted() {
    let (storage, _dir) = setup().await;
    add_broadcast_msg(storage.get_db(), 1, Some(BULK), "S", Some(0.5)).await;

    let update = storage.update_status(1, MsgStatus::Sent).await.unwrap();
    assert_eq!(update.previous, MsgStatus::Sent);
    assert_eq!(update.delta, None);

    let row = stats(&storage, BULK).await;
    assert_eq!(row.sent, 0);
    assert_eq!(row.cost, 0.0);

    // 状态未变不写行，modified_on 保持原值
    let stored = msg::Entity::find_by_id(1)
        .one(storage.get_db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.modified_on, at(2026, 1, 10, 9, 0, 0));
}

#[tokio::test]
async fn test_unknown_stored_status_leaves_message_untouched() {
    let (storage, _dir) = setup().await;
    add_broadcast_msg(storage.get_db(), 1, Some(BULK), "?", Some(0.5)).await;

    let err = storage.update_status(1, MsgStatus::Sent).await.unwrap_err();
    assert!(matches!(err, MsgstatsError::Validation(ref msg) if msg.contains("id=1")));

    let stored = msg::Entity::find_by_id(1)
        .one(storage.get_db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, "?");
    assert_eq!(stored.modified_on, at(2026, 1, 10, 9, 0, 0));
    assert_eq!(stats(&storage, BULK).await.sent, 0);
}

#[tokio::test]
async fn test_message_without_broadcast_is_untracked() {
    let (storage, _dir) = setup().await;
    add_broadcast_msg(storage.get_db(), 1, None, "Q", None).await;

    let update = storage.update_status(1, MsgStatus::Wired).await.unwrap();
    assert_eq!(update.delta, None);
    assert_eq!(counters(&stats(&storage, BULK).await), (0, 0, 0, 0, 0));

    let stored = msg::Entity::find_by_id(1)
        .one(storage.get_db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, "W");
}

#[tokio::test]
async fn test_unknown_message_is_not_found() {
    let (storage, _dir) = setup().await;
    let err = storage.update_status(404, MsgStatus::Sent).await.unwrap_err();
    assert!(matches!(err, MsgstatsError::NotFound(_)));
}

#[tokio::test]
async fn test_init_statistics_is_idempotent() {
    let (storage, _dir) = setup().await;
    add_broadcast_msg(storage.get_db(), 1, Some(BULK), "W", None).await;
    storage.update_status(1, MsgStatus::Sent).await.unwrap();

    // 已存在的行不会被重置
    assert!(!storage.create_broadcast_statistics(BULK).await.unwrap());
    assert_eq!(stats(&storage, BULK).await.sent, 1);
    assert!(storage.get_broadcast_statistics(999).await.unwrap().is_none());
}

// =============================================================================
// 累加
// =============================================================================

#[tokio::test]
async fn test_hundred_recipients_interleaved_lifecycle() {
    let (storage, _dir) = setup().await;
    for id in 1..=100 {
        add_broadcast_msg(storage.get_db(), id, Some(BULK), "Q", Some(0.5)).await;
    }

    let path = [MsgStatus::Wired, MsgStatus::Sent, MsgStatus::Delivered];
    // 每条消息推进的步数不同，按步交错写入
    let mut step = vec![0usize; 100];
    let mut remaining = 300;
    let mut cursor = 0usize;
    while remaining > 0 {
        let idx = (cursor * 37) % 100;
        cursor += 1;
        if step[idx] < path.len() {
            storage
                .update_status(idx as i64 + 1, path[step[idx]])
                .await
                .unwrap();
            step[idx] += 1;
            remaining -= 1;
        }
    }

    let row = stats(&storage, BULK).await;
    assert_eq!(counters(&row), (100, 100, 0, 0, 100));
    assert_eq!(row.cost, 50.0);
}

#[tokio::test]
async fn test_reported_deltas_match_stored_counters() {
    let (storage, _dir) = setup().await;
    let transitions: &[(i64, &str, &[MsgStatus])] = &[
        (1, "Q", &[MsgStatus::Wired, MsgStatus::Sent, MsgStatus::Delivered, MsgStatus::Read]),
        (2, "Q", &[MsgStatus::Failed]),
        (3, "Q", &[MsgStatus::Wired, MsgStatus::Failed]),
        (4, "P", &[MsgStatus::Queued, MsgStatus::Wired, MsgStatus::Sent, MsgStatus::Sent]),
        (5, "W", &[MsgStatus::Errored, MsgStatus::Resent, MsgStatus::Sent]),
    ];

    let mut expected = CounterDelta::default();
    for (id, initial, steps) in transitions {
        add_broadcast_msg(storage.get_db(), *id, Some(BULK), initial, Some(0.125)).await;
        for status in steps.iter() {
            let update = storage.update_status(*id, *status).await.unwrap();
            if let Some(delta) = update.delta {
                expected.merge(&delta);
            }
        }
    }

    let row = stats(&storage, BULK).await;
    assert_eq!(
        counters(&row),
        (
            expected.sent,
            expected.delivered,
            expected.failed,
            expected.read,
            expected.processed
        )
    );
    assert_eq!(row.cost, expected.cost);
    assert_eq!(counters(&row), (3, 1, 2, 1, 4));
}
