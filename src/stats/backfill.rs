//! 唯一联系人数回填
//!
//! 对日期区间内每一天、每个活跃组织重新计算当天（UTC）有入站消息的不同联系人数，
//! 并按 (org_id, day) upsert。重复运行会用最新结果覆盖，零值同样写入。

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use super::progress::{ProgressSnapshot, ProgressTracker};
use super::{CounterStore, DayWindow, MessageCounter, OrgDirectory, OrgRef, UpsertOutcome};
use crate::errors::{MsgstatsError, Result};
use crate::system::CancellationFlag;

/// 回填参数
#[derive(Debug, Clone, PartialEq)]
pub struct BackfillOptions {
    /// Inclusive
    pub start_date: NaiveDate,
    /// Inclusive
    pub end_date: NaiveDate,
    pub org_sleep: Duration,
    pub day_sleep: Duration,
    pub org_id: Option<i64>,
    pub dry_run: bool,
    pub progress_every: u64,
}

impl BackfillOptions {
    /// 单日、无节流
    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start_date: day,
            end_date: day,
            org_sleep: Duration::ZERO,
            day_sleep: Duration::ZERO,
            org_id: None,
            dry_run: false,
            progress_every: 1000,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_date > self.end_date {
            return Err(MsgstatsError::invalid_date_range(
                "start-date must be before or equal to end-date",
            ));
        }
        if self.progress_every == 0 {
            return Err(MsgstatsError::validation(
                "progress interval must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Number of days in the inclusive range
    pub fn total_days(&self) -> u64 {
        let days = (self.end_date - self.start_date).num_days() + 1;
        days.max(0) as u64
    }
}

/// 运行前的计划概要
#[derive(Debug, Clone, PartialEq)]
pub struct BackfillPlan {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: u64,
    pub org_count: u64,
    pub total_operations: u64,
    pub org_sleep: Duration,
    pub day_sleep: Duration,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    /// Units whose count was computed (and persisted unless dry-run)
    pub processed: u64,
    pub created: u64,
    pub updated: u64,
    pub errors: u64,
    pub elapsed: Duration,
    pub interrupted: bool,
}

impl BackfillSummary {
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed.as_secs_f64() / 60.0
    }
}

/// 回填过程事件，用于控制台输出或测试采集
pub trait BackfillObserver: Send + Sync {
    fn on_start(&self, _plan: &BackfillPlan) {}

    fn on_day_start(&self, _day: NaiveDate) {}

    /// `outcome` is `None` on dry runs
    fn on_count(&self, _org: &OrgRef, _day: NaiveDate, _count: u64, _outcome: Option<UpsertOutcome>) {}

    fn on_unit_error(&self, _org: &OrgRef, _day: NaiveDate, _error: &MsgstatsError) {}

    fn on_progress(&self, _snapshot: &ProgressSnapshot) {}

    fn on_day_done(&self, _day: NaiveDate, _sleep: Duration) {}

    fn on_finish(&self, _summary: &BackfillSummary, _dry_run: bool) {}
}

/// 不输出任何内容
pub struct SilentObserver;

impl BackfillObserver for SilentObserver {}

pub struct BackfillRunner {
    orgs: Arc<dyn OrgDirectory>,
    messages: Arc<dyn MessageCounter>,
    counters: Arc<dyn CounterStore>,
    observer: Arc<dyn BackfillObserver>,
    cancel: CancellationFlag,
}

impl BackfillRunner {
    pub fn new(
        orgs: Arc<dyn OrgDirectory>,
        messages: Arc<dyn MessageCounter>,
        counters: Arc<dyn CounterStore>,
    ) -> Self {
        Self {
            orgs,
            messages,
            counters,
            observer: Arc::new(SilentObserver),
            cancel: CancellationFlag::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn BackfillObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// 解析要处理的组织；指定的组织不存在或未激活时报错
    async fn resolve_orgs(&self, org_id: Option<i64>) -> Result<Vec<OrgRef>> {
        match org_id {
            Some(id) => match self.orgs.find_active(id).await? {
                Some(org) => Ok(vec![org]),
                None => Err(MsgstatsError::org_not_found(format!(
                    "Active org with id={} not found",
                    id
                ))),
            },
            None => self.orgs.list_active().await,
        }
    }

    async fn process_unit(
        &self,
        org: &OrgRef,
        window: &DayWindow,
        dry_run: bool,
    ) -> Result<(u64, Option<UpsertOutcome>)> {
        let count = self
            .messages
            .count_unique_inbound_contacts(org.id, window)
            .await?;

        if dry_run {
            return Ok((count, None));
        }

        let outcome = self
            .counters
            .upsert_unique_contact_count(org.id, window.day, count)
            .await?;
        Ok((count, Some(outcome)))
    }

    /// 执行回填
    ///
    /// 配置错误在任何计数查询之前返回；单个单元的失败只计入 `errors`。
    pub async fn run(&self, options: &BackfillOptions) -> Result<BackfillSummary> {
        options.validate()?;
        let orgs = self.resolve_orgs(options.org_id).await?;

        let total_days = options.total_days();
        let plan = BackfillPlan {
            start_date: options.start_date,
            end_date: options.end_date,
            total_days,
            org_count: orgs.len() as u64,
            total_operations: total_days * orgs.len() as u64,
            org_sleep: options.org_sleep,
            day_sleep: options.day_sleep,
            dry_run: options.dry_run,
        };
        info!(
            start = %plan.start_date,
            end = %plan.end_date,
            days = plan.total_days,
            orgs = plan.org_count,
            operations = plan.total_operations,
            dry_run = plan.dry_run,
            "Starting unique contact backfill"
        );
        self.observer.on_start(&plan);

        let progress = ProgressTracker::new(plan.total_operations, options.progress_every);
        let mut summary = BackfillSummary::default();
        let mut day = options.start_date;

        'days: loop {
            let window = DayWindow::for_day(day);
            self.observer.on_day_start(day);

            for org in &orgs {
                if self.cancel.is_cancelled() {
                    summary.interrupted = true;
                    break 'days;
                }

                match self.process_unit(org, &window, options.dry_run).await {
                    Ok((count, outcome)) => {
                        summary.processed += 1;
                        match outcome {
                            Some(UpsertOutcome::Created) => summary.created += 1,
                            Some(UpsertOutcome::Updated) => summary.updated += 1,
                            None => {}
                        }
                        debug!(org_id = org.id, %day, count, "Unit done");
                        if count > 0 {
                            self.observer.on_count(org, day, count, outcome);
                        }
                        if progress.should_report(summary.processed) {
                            self.observer.on_progress(&progress.snapshot(summary.processed));
                        }
                    }
                    Err(e) => {
                        summary.errors += 1;
                        error!(
                            org_id = org.id,
                            org_name = %org.name,
                            %day,
                            "Unique contact count failed: {}",
                            e
                        );
                        self.observer.on_unit_error(org, day, &e);
                    }
                }

                pause(options.org_sleep).await;
            }

            self.observer.on_day_done(day, options.day_sleep);
            pause(options.day_sleep).await;

            if day >= options.end_date {
                break;
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        summary.elapsed = progress.elapsed();
        if summary.interrupted {
            warn!(
                processed = summary.processed,
                errors = summary.errors,
                "Backfill interrupted"
            );
        } else {
            info!(
                processed = summary.processed,
                created = summary.created,
                updated = summary.updated,
                errors = summary.errors,
                elapsed_secs = summary.elapsed.as_secs_f64(),
                "Backfill complete"
            );
        }
        self.observer.on_finish(&summary, options.dry_run);

        Ok(summary)
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_total_days_is_inclusive() {
        let mut options = BackfillOptions::single_day(date(2026, 1, 1));
        assert_eq!(options.total_days(), 1);
        options.end_date = date(2026, 2, 4);
        assert_eq!(options.total_days(), 35);
    }

    #[test]
    fn test_validate_rejects_reversed_range() {
        let mut options = BackfillOptions::single_day(date(2026, 1, 5));
        options.start_date = date(2026, 1, 6);
        let err = options.validate().unwrap_err();
        assert!(matches!(err, MsgstatsError::InvalidDateRange(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_validate_rejects_zero_progress_interval() {
        let mut options = BackfillOptions::single_day(date(2026, 1, 5));
        options.progress_every = 0;
        assert!(options.validate().is_err());
    }
}
