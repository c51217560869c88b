//! Standalone backfill script
//!
//! Same job as `msgstats backfill-unique-contacts` with lighter throttling
//! and less frequent progress output, for one-off runs.

use std::process::ExitCode;

use clap::Parser;

use msgstats::cli::{BackfillDefaults, StandaloneCli};
use msgstats::interfaces::cli::commands::backfill_unique_contacts;
use msgstats::runtime::startup;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = StandaloneCli::parse();

    let _guard = match startup::prepare(cli.config.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Startup failed: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match backfill_unique_contacts(cli.backfill, BackfillDefaults::STANDALONE).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            ExitCode::from(e.exit_code())
        }
    }
}
