use std::time::{Duration, Instant};

/// 进度快照
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub processed: u64,
    pub total: u64,
    pub percent: f64,
    /// Operations per second
    pub rate: f64,
    pub eta_minutes: f64,
}

impl ProgressSnapshot {
    pub fn compute(processed: u64, total: u64, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 { processed as f64 / secs } else { 0.0 };
        let remaining = total.saturating_sub(processed) as f64;
        let eta_minutes = if rate > 0.0 { remaining / rate / 60.0 } else { 0.0 };
        let percent = if total > 0 {
            processed as f64 * 100.0 / total as f64
        } else {
            100.0
        };

        Self {
            processed,
            total,
            percent,
            rate,
            eta_minutes,
        }
    }
}

/// 每处理 `every` 个单元报告一次进度
#[derive(Debug)]
pub struct ProgressTracker {
    total: u64,
    every: u64,
    started: Instant,
}

impl ProgressTracker {
    pub fn new(total: u64, every: u64) -> Self {
        Self {
            total,
            every: every.max(1),
            started: Instant::now(),
        }
    }

    pub fn should_report(&self, processed: u64) -> bool {
        processed > 0 && processed % self.every == 0
    }

    pub fn snapshot(&self, processed: u64) -> ProgressSnapshot {
        ProgressSnapshot::compute(processed, self.total, self.started.elapsed())
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_rate_and_eta() {
        let snap = ProgressSnapshot::compute(100, 400, Duration::from_secs(50));
        assert_eq!(snap.percent, 25.0);
        assert_eq!(snap.rate, 2.0);
        // 300 remaining at 2 ops/s
        assert_eq!(snap.eta_minutes, 2.5);
    }

    #[test]
    fn test_snapshot_handles_zero_elapsed_and_zero_total() {
        let snap = ProgressSnapshot::compute(0, 0, Duration::ZERO);
        assert_eq!(snap.rate, 0.0);
        assert_eq!(snap.eta_minutes, 0.0);
        assert_eq!(snap.percent, 100.0);
    }

    #[test]
    fn test_should_report_on_interval_only() {
        let tracker = ProgressTracker::new(10, 3);
        assert!(!tracker.should_report(0));
        assert!(!tracker.should_report(2));
        assert!(tracker.should_report(3));
        assert!(tracker.should_report(9));

        // 间隔为 0 时按 1 处理
        let every_unit = ProgressTracker::new(10, 0);
        assert!(every_unit.should_report(1));
    }
}
