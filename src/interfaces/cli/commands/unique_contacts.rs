use std::sync::Arc;

use colored::Colorize;

use crate::cli::parse_date;
use crate::interfaces::cli::CliError;
use crate::storage::SeaOrmStorage;

pub async fn show_unique_contacts(
    storage: Arc<SeaOrmStorage>,
    org_id: i64,
    start_date: Option<String>,
    end_date: Option<String>,
) -> Result<(), CliError> {
    let start = start_date.as_deref().map(parse_date).transpose()?;
    let end = end_date.as_deref().map(parse_date).transpose()?;

    let rows = storage
        .list_unique_contact_counts(org_id, start, end)
        .await
        .map_err(|e| CliError::CommandError(format!("Failed to load counts: {}", e)))?;

    if rows.is_empty() {
        println!(
            "{} No unique contact counts for org={}",
            "ℹ".bold().blue(),
            org_id
        );
        return Ok(());
    }

    println!(
        "{}",
        format!("Unique contacts for org={}:", org_id).bold().green()
    );
    println!();
    for row in &rows {
        println!(
            "  {}  {}",
            row.day.to_string().cyan(),
            row.count.to_string().green()
        );
    }
    println!();
    println!(
        "{} Total {} days",
        "ℹ".bold().blue(),
        rows.len().to_string().green()
    );
    Ok(())
}
