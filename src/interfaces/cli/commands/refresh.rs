use std::sync::Arc;

use chrono::Utc;
use colored::Colorize;

use crate::cli::parse_date;
use crate::interfaces::cli::CliError;
use crate::stats::{BackfillRunner, default_refresh_day};
use crate::storage::SeaOrmStorage;

/// 刷新单日唯一联系人数（默认昨天）
pub async fn refresh_unique_contacts(
    storage: Arc<SeaOrmStorage>,
    date: Option<String>,
) -> Result<(), CliError> {
    let day = match date {
        Some(value) => parse_date(&value)?,
        None => default_refresh_day(Utc::now()),
    };

    let runner = BackfillRunner::new(storage.clone(), storage.clone(), storage);
    let summary = crate::stats::refresh_unique_contacts(&runner, day).await?;

    println!(
        "{} Refreshed unique contacts for {}: {} succeeded, {} errors",
        "ℹ".bold().blue(),
        day.to_string().cyan(),
        summary.processed.to_string().green(),
        if summary.errors > 0 {
            summary.errors.to_string().red()
        } else {
            summary.errors.to_string().normal()
        }
    );
    Ok(())
}
