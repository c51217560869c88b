use std::sync::Arc;

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::storage::SeaOrmStorage;

pub async fn show_broadcast_stats(
    storage: Arc<SeaOrmStorage>,
    broadcast_id: i64,
) -> Result<(), CliError> {
    let stats = storage
        .get_broadcast_statistics(broadcast_id)
        .await?
        .ok_or_else(|| {
            CliError::CommandError(format!(
                "No statistics for broadcast {}",
                broadcast_id
            ))
        })?;

    println!(
        "{}",
        format!("Broadcast {} statistics:", broadcast_id).bold().green()
    );
    println!("  sent:      {}", stats.sent);
    println!("  delivered: {}", stats.delivered);
    println!("  failed:    {}", stats.failed);
    println!("  read:      {}", stats.read);
    println!("  processed: {}", stats.processed);
    println!("  cost:      {:.4}", stats.cost);
    println!(
        "  {}",
        format!(
            "modified: {}",
            stats.modified_on.format("%Y-%m-%d %H:%M:%S UTC")
        )
        .dimmed()
    );
    Ok(())
}

pub async fn init_broadcast_stats(
    storage: Arc<SeaOrmStorage>,
    broadcast_id: i64,
) -> Result<(), CliError> {
    if storage.create_broadcast_statistics(broadcast_id).await? {
        println!(
            "{} Created statistics row for broadcast {}",
            "✓".bold().green(),
            broadcast_id
        );
    } else {
        println!(
            "{} Statistics row for broadcast {} already exists",
            "ℹ".bold().blue(),
            broadcast_id
        );
    }
    Ok(())
}
