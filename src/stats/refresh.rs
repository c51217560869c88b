//! 每日刷新：重算单日所有活跃组织的唯一联系人数

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::info;

use super::backfill::{BackfillOptions, BackfillRunner, BackfillSummary};
use crate::errors::Result;

/// 默认刷新日：UTC 昨天
pub fn default_refresh_day(now: DateTime<Utc>) -> NaiveDate {
    (now - Duration::days(1)).date_naive()
}

pub async fn refresh_unique_contacts(
    runner: &BackfillRunner,
    day: NaiveDate,
) -> Result<BackfillSummary> {
    info!(%day, "Refreshing unique contact counts");
    runner.run(&BackfillOptions::single_day(day)).await
}
