use std::sync::Arc;

use colored::Colorize;
use tokio::io::BufReader;

use crate::interfaces::cli::CliError;
use crate::stats::{IngestSummary, apply_status_lines};
use crate::storage::SeaOrmStorage;

/// 从文件或标准输入读取状态行并逐条写入
pub async fn apply_statuses(storage: Arc<SeaOrmStorage>, input: String) -> Result<(), CliError> {
    let summary = if input == "-" {
        apply_status_lines(storage.as_ref(), BufReader::new(tokio::io::stdin())).await?
    } else {
        let file = tokio::fs::File::open(&input)
            .await
            .map_err(|e| CliError::CommandError(format!("Cannot open {}: {}", input, e)))?;
        apply_status_lines(storage.as_ref(), BufReader::new(file)).await?
    };

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &IngestSummary) {
    println!("{}", "Status updates applied".bold().green());
    println!("  Lines:     {}", summary.lines);
    println!("  Applied:   {}", summary.applied.to_string().green());
    println!("  Unchanged: {}", summary.unchanged);
    let errors = summary.errors.to_string();
    println!(
        "  Errors:    {}",
        if summary.errors > 0 { errors.red() } else { errors.normal() }
    );
    println!("  Counters:  {}", summary.delta);
}
