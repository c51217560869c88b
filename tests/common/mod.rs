//! 集成测试共用的数据构造工具

#![allow(dead_code)]

use std::sync::Once;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait};
use tempfile::TempDir;

use migration::entities::{broadcast, msg, org};
use msgstats::config::init_config;
use msgstats::stats::BackfillOptions;
use msgstats::storage::SeaOrmStorage;

static INIT: Once = Once::new();

pub fn init_test_config() {
    INIT.call_once(|| {
        init_config();
    });
}

/// 临时 SQLite 数据库（已迁移）
pub async fn create_temp_storage() -> (SeaOrmStorage, TempDir) {
    init_test_config();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("Failed to create storage");

    (storage, temp_dir)
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

/// 无节流的回填参数
pub fn fast_options(start: NaiveDate, end: NaiveDate) -> BackfillOptions {
    BackfillOptions {
        start_date: start,
        end_date: end,
        org_sleep: Duration::ZERO,
        day_sleep: Duration::ZERO,
        org_id: None,
        dry_run: false,
        progress_every: 1000,
    }
}

pub async fn add_org(db: &DatabaseConnection, id: i64, name: &str, active: bool) {
    org::Entity::insert(org::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        is_active: Set(active),
        created_on: Set(at(2025, 6, 1, 0, 0, 0)),
    })
    .exec(db)
    .await
    .expect("insert org");
}

pub async fn add_broadcast(db: &DatabaseConnection, id: i64, org_id: i64, bulk: bool) {
    broadcast::Entity::insert(broadcast::ActiveModel {
        id: Set(id),
        org_id: Set(org_id),
        is_bulk_send: Set(bulk),
        created_on: Set(at(2026, 1, 1, 0, 0, 0)),
    })
    .exec(db)
    .await
    .expect("insert broadcast");
}

/// 普通消息（无群发）
pub async fn add_msg(
    db: &DatabaseConnection,
    id: i64,
    org_id: i64,
    contact_id: i64,
    direction: &str,
    created_on: DateTime<Utc>,
) {
    msg::Entity::insert(msg::ActiveModel {
        id: Set(id),
        org_id: Set(org_id),
        contact_id: Set(contact_id),
        broadcast_id: Set(None),
        direction: Set(direction.to_string()),
        status: Set("H".to_string()),
        template_price: Set(None),
        created_on: Set(created_on),
        modified_on: Set(created_on),
    })
    .exec(db)
    .await
    .expect("insert msg");
}

/// 群发出站消息
pub async fn add_broadcast_msg(
    db: &DatabaseConnection,
    id: i64,
    broadcast_id: Option<i64>,
    status: &str,
    template_price: Option<f64>,
) {
    let now = at(2026, 1, 10, 9, 0, 0);
    msg::Entity::insert(msg::ActiveModel {
        id: Set(id),
        org_id: Set(1),
        contact_id: Set(1000 + id),
        broadcast_id: Set(broadcast_id),
        direction: Set("O".to_string()),
        status: Set(status.to_string()),
        template_price: Set(template_price),
        created_on: Set(now),
        modified_on: Set(now),
    })
    .exec(db)
    .await
    .expect("insert broadcast msg");
}
