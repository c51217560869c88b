//! Command-line interface definitions using clap
//!
//! Two entry points share the backfill arguments: the managed `msgstats`
//! command and the standalone `backfill-unique-contacts` binary. They differ
//! only in throttling and progress defaults (see [`BackfillDefaults`]).

use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::errors::{MsgstatsError, Result};
use crate::stats::BackfillOptions;

pub const DEFAULT_START_DATE: &str = "2026-01-01";
pub const DEFAULT_END_DATE: &str = "2026-02-04";

/// 入口相关的默认值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackfillDefaults {
    /// Seconds between organizations
    pub sleep: f64,
    /// Seconds between days
    pub batch_sleep: f64,
    pub progress_every: u64,
}

impl BackfillDefaults {
    /// `msgstats backfill-unique-contacts`
    pub const MANAGED: Self = Self {
        sleep: 0.5,
        batch_sleep: 5.0,
        progress_every: 100,
    };

    /// `backfill-unique-contacts`
    pub const STANDALONE: Self = Self {
        sleep: 0.1,
        batch_sleep: 0.0,
        progress_every: 1000,
    };
}

/// msgstats - per-organization contact and broadcast statistics
#[derive(Parser)]
#[command(name = "msgstats")]
#[command(version)]
#[command(
    about = "Unique contact counts and broadcast statistics for a messaging platform",
    long_about = None
)]
pub struct Cli {
    /// Configuration file (default: msgstats.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Standalone backfill script
#[derive(Parser)]
#[command(name = "backfill-unique-contacts")]
#[command(version)]
#[command(about = "Backfill UniqueContactCount for a date range", long_about = None)]
pub struct StandaloneCli {
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    #[command(flatten)]
    pub backfill: BackfillArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recompute unique contact counts for a date range
    BackfillUniqueContacts(BackfillArgs),

    /// Recompute one day for all active organizations (default: yesterday UTC)
    RefreshUniqueContacts {
        /// Day to refresh (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Inspect unique contact counts
    UniqueContacts {
        #[command(subcommand)]
        action: UniqueContactsCommands,
    },

    /// Inspect or initialize broadcast statistics
    BroadcastStats {
        #[command(subcommand)]
        action: BroadcastStatsCommands,
    },

    /// Apply message status updates from JSON lines (`-` for stdin)
    ApplyStatuses {
        /// Input file path or `-`
        input: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum UniqueContactsCommands {
    /// Show stored counts for one organization
    Show {
        #[arg(long)]
        org_id: i64,

        #[arg(long)]
        start_date: Option<String>,

        #[arg(long)]
        end_date: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum BroadcastStatsCommands {
    /// Show the statistics row of a broadcast
    Show { broadcast_id: i64 },

    /// Create a zeroed statistics row if absent
    Init { broadcast_id: i64 },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: msgstats.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}

/// 回填参数（两个入口共用）
#[derive(Args, Debug, Clone)]
pub struct BackfillArgs {
    /// First day, inclusive (YYYY-MM-DD)
    #[arg(long, default_value = DEFAULT_START_DATE)]
    pub start_date: String,

    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long, default_value = DEFAULT_END_DATE)]
    pub end_date: String,

    /// Seconds to sleep between organizations
    #[arg(long, allow_negative_numbers = true)]
    pub sleep: Option<f64>,

    /// Seconds to sleep between days
    #[arg(long, allow_negative_numbers = true)]
    pub batch_sleep: Option<f64>,

    /// Only process this organization
    #[arg(long)]
    pub org_id: Option<i64>,

    /// Compute and log counts without writing
    #[arg(long)]
    pub dry_run: bool,
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        MsgstatsError::date_parse(format!("Invalid date '{}' (expected YYYY-MM-DD): {}", value, e))
    })
}

fn parse_sleep(name: &str, secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(MsgstatsError::validation(format!(
            "--{} must be a non-negative number of seconds, got {}",
            name, secs
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}

impl BackfillArgs {
    /// 解析为回填参数
    ///
    /// 进度间隔优先使用配置文件中的值。
    pub fn to_options(
        &self,
        defaults: &BackfillDefaults,
        progress_override: Option<u64>,
    ) -> Result<BackfillOptions> {
        let options = BackfillOptions {
            start_date: parse_date(&self.start_date)?,
            end_date: parse_date(&self.end_date)?,
            org_sleep: parse_sleep("sleep", self.sleep.unwrap_or(defaults.sleep))?,
            day_sleep: parse_sleep("batch-sleep", self.batch_sleep.unwrap_or(defaults.batch_sleep))?,
            org_id: self.org_id,
            dry_run: self.dry_run,
            progress_every: progress_override.unwrap_or(defaults.progress_every),
        };
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> BackfillArgs {
        let mut argv = vec!["backfill-unique-contacts"];
        argv.extend_from_slice(extra);
        StandaloneCli::parse_from(argv).backfill
    }

    #[test]
    fn test_entry_point_defaults_differ() {
        let managed = args(&[]).to_options(&BackfillDefaults::MANAGED, None).unwrap();
        assert_eq!(managed.org_sleep, Duration::from_millis(500));
        assert_eq!(managed.day_sleep, Duration::from_secs(5));
        assert_eq!(managed.progress_every, 100);

        let standalone = args(&[])
            .to_options(&BackfillDefaults::STANDALONE, None)
            .unwrap();
        assert_eq!(standalone.org_sleep, Duration::from_millis(100));
        assert_eq!(standalone.day_sleep, Duration::ZERO);
        assert_eq!(standalone.progress_every, 1000);

        assert_eq!(standalone.start_date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(standalone.end_date, NaiveDate::from_ymd_opt(2026, 2, 4).unwrap());
    }

    #[test]
    fn test_explicit_flags_and_progress_override() {
        let options = args(&[
            "--start-date",
            "2026-01-03",
            "--end-date",
            "2026-01-05",
            "--sleep",
            "0",
            "--batch-sleep",
            "1.5",
            "--org-id",
            "42",
            "--dry-run",
        ])
        .to_options(&BackfillDefaults::MANAGED, Some(7))
        .unwrap();

        assert_eq!(options.org_id, Some(42));
        assert!(options.dry_run);
        assert_eq!(options.org_sleep, Duration::ZERO);
        assert_eq!(options.day_sleep, Duration::from_millis(1500));
        assert_eq!(options.progress_every, 7);
    }

    #[test]
    fn test_negative_sleep_is_rejected() {
        let err = args(&["--sleep=-1"])
            .to_options(&BackfillDefaults::MANAGED, None)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_bad_dates_are_configuration_errors() {
        let err = args(&["--start-date", "2026-13-01"])
            .to_options(&BackfillDefaults::MANAGED, None)
            .unwrap_err();
        assert!(matches!(err, MsgstatsError::DateParse(_)));

        let err = args(&["--start-date", "2026-02-05"])
            .to_options(&BackfillDefaults::MANAGED, None)
            .unwrap_err();
        assert!(matches!(err, MsgstatsError::InvalidDateRange(_)));
    }

    #[test]
    fn test_managed_cli_parses_subcommands() {
        let cli = Cli::parse_from([
            "msgstats",
            "-c",
            "custom.toml",
            "unique-contacts",
            "show",
            "--org-id",
            "3",
        ]);
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
        assert!(matches!(
            cli.command,
            Commands::UniqueContacts {
                action: UniqueContactsCommands::Show { org_id: 3, .. }
            }
        ));
    }
}
