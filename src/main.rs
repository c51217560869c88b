use std::process::ExitCode;

use clap::Parser;

use msgstats::cli::Cli;
use msgstats::interfaces::cli::run_cli_command;
use msgstats::runtime::startup;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match startup::prepare(cli.config.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Startup failed: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run_cli_command(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            ExitCode::from(e.exit_code())
        }
    }
}
