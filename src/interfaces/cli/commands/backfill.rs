//! Backfill command and its console output

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use colored::Colorize;

use crate::cli::{BackfillArgs, BackfillDefaults};
use crate::config::get_config;
use crate::errors::MsgstatsError;
use crate::interfaces::cli::CliError;
use crate::stats::{
    BackfillObserver, BackfillPlan, BackfillRunner, BackfillSummary, OrgRef, ProgressSnapshot,
    UpsertOutcome,
};
use crate::storage::StorageFactory;
use crate::system::{CancellationFlag, install_ctrl_c};

fn secs(duration: Duration) -> String {
    format!("{}s", duration.as_secs_f64())
}

/// 控制台输出
pub struct ConsoleObserver;

impl BackfillObserver for ConsoleObserver {
    fn on_start(&self, plan: &BackfillPlan) {
        let prefix = if plan.dry_run { "[DRY RUN] " } else { "" };
        println!(
            "{}",
            format!("{}Backfilling UniqueContactCount", prefix).bold().green()
        );
        println!(
            "  Date range: {} to {} ({} days)",
            plan.start_date.to_string().cyan(),
            plan.end_date.to_string().cyan(),
            plan.total_days
        );
        println!("  Orgs: {}", plan.org_count);
        println!("  Total queries: {}", plan.total_operations);
        println!(
            "  Sleep: {} between orgs, {} between days",
            secs(plan.org_sleep),
            secs(plan.day_sleep)
        );
        println!();
    }

    fn on_day_start(&self, day: NaiveDate) {
        println!("{}", format!("--- Processing {} ---", day).bold());
    }

    fn on_count(&self, org: &OrgRef, _day: NaiveDate, count: u64, outcome: Option<UpsertOutcome>) {
        match outcome {
            Some(outcome) => println!(
                "  org={} ({}): {} unique contacts ({})",
                org.id,
                org.name,
                count.to_string().green(),
                outcome.as_str()
            ),
            None => println!(
                "  {} org={} ({}): {} unique contacts",
                "[DRY RUN]".yellow(),
                org.id,
                org.name,
                count.to_string().green()
            ),
        }
    }

    fn on_unit_error(&self, org: &OrgRef, _day: NaiveDate, error: &MsgstatsError) {
        eprintln!(
            "  {} org={} ({}): {}",
            "ERROR".red().bold(),
            org.id,
            org.name,
            error.message()
        );
    }

    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        println!(
            "  {} {}/{} ({:.1}%) - {:.1} ops/s - ETA: {:.1} min",
            "Progress:".blue(),
            snapshot.processed,
            snapshot.total,
            snapshot.percent,
            snapshot.rate,
            snapshot.eta_minutes
        );
    }

    fn on_day_done(&self, day: NaiveDate, sleep: Duration) {
        if sleep.is_zero() {
            println!("Day {} done.", day);
        } else {
            println!("Day {} done. Sleeping {}...", day, secs(sleep));
        }
    }

    fn on_finish(&self, summary: &BackfillSummary, dry_run: bool) {
        println!();
        let title = match (summary.interrupted, dry_run) {
            (true, _) => "Interrupted".yellow().bold(),
            (false, true) => "Done! (dry run, nothing written)".green().bold(),
            (false, false) => "Done!".green().bold(),
        };
        println!("{}", title);
        println!("  Processed: {}", summary.processed);
        println!("  Created:   {}", summary.created);
        println!("  Updated:   {}", summary.updated);
        let errors = summary.errors.to_string();
        println!(
            "  Errors:    {}",
            if summary.errors > 0 { errors.red() } else { errors.normal() }
        );
        println!("  Time:      {:.1} min", summary.elapsed_minutes());
    }
}

/// 回填入口（托管命令与独立脚本共用）
pub async fn backfill_unique_contacts(
    args: BackfillArgs,
    defaults: BackfillDefaults,
) -> Result<(), CliError> {
    let config = get_config();
    let options = args.to_options(&defaults, config.backfill.progress_every)?;

    let storage = StorageFactory::create().await?;

    let cancel = CancellationFlag::new();
    install_ctrl_c(cancel.clone());

    let runner = BackfillRunner::new(storage.clone(), storage.clone(), storage)
        .with_observer(Arc::new(ConsoleObserver))
        .with_cancellation(cancel);

    let summary = runner.run(&options).await?;
    if summary.interrupted {
        return Err(CliError::Interrupted);
    }
    Ok(())
}
