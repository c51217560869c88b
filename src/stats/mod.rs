//! 统计聚合
//!
//! - `backfill`：按 (组织, 天) 重算唯一联系人数
//! - `refresh`：单日刷新（默认昨天）
//! - `ingest`：批量应用消息状态
//! - `status`：状态编码与群发计数增量

pub mod backfill;
pub mod ingest;
pub mod progress;
pub mod refresh;
pub mod status;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::errors::Result;

pub use backfill::{
    BackfillObserver, BackfillOptions, BackfillPlan, BackfillRunner, BackfillSummary, SilentObserver,
};
pub use ingest::{IngestSummary, apply_status_lines};
pub use progress::{ProgressSnapshot, ProgressTracker};
pub use refresh::{default_refresh_day, refresh_unique_contacts};
pub use status::{CounterDelta, Direction, MsgStatus};

/// 组织的最小视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgRef {
    pub id: i64,
    pub name: String,
}

/// 一天的 UTC 半开区间 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub day: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn for_day(day: NaiveDate) -> Self {
        let start = day.and_time(NaiveTime::MIN).and_utc();
        Self {
            day,
            start,
            end: start + Duration::days(1),
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

impl UpsertOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertOutcome::Created => "created",
            UpsertOutcome::Updated => "updated",
        }
    }
}

/// 一次状态写入的结果
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub msg_id: i64,
    pub previous: MsgStatus,
    pub current: MsgStatus,
    /// `None` when the message is not counted towards broadcast statistics
    pub delta: Option<CounterDelta>,
}

#[async_trait]
pub trait OrgDirectory: Send + Sync {
    /// Active organizations ordered by id
    async fn list_active(&self) -> Result<Vec<OrgRef>>;

    async fn find_active(&self, org_id: i64) -> Result<Option<OrgRef>>;
}

#[async_trait]
pub trait MessageCounter: Send + Sync {
    /// Distinct contacts with at least one inbound message inside the window
    async fn count_unique_inbound_contacts(&self, org_id: i64, window: &DayWindow) -> Result<u64>;
}

#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn upsert_unique_contact_count(
        &self,
        org_id: i64,
        day: NaiveDate,
        count: u64,
    ) -> Result<UpsertOutcome>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn update_status(&self, msg_id: i64, status: MsgStatus) -> Result<StatusUpdate>;
}
