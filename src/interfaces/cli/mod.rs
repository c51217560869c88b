//! CLI interface module
//!
//! This module dispatches parsed commands and maps failures to exit codes.

pub mod commands;

use std::fmt;

use crate::cli::{BackfillDefaults, BroadcastStatsCommands, Commands, ConfigCommands, UniqueContactsCommands};
use crate::errors::MsgstatsError;
use crate::storage::StorageFactory;

/// Exit code after Ctrl+C
pub const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug)]
pub enum CliError {
    /// Bad arguments or configuration, detected before any work
    ConfigError(String),
    StorageError(String),
    ParseError(String),
    CommandError(String),
    Interrupted,
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Interrupted => EXIT_INTERRUPTED,
            _ => 1,
        }
    }

    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::ConfigError(msg) => format!("Configuration error: {}", msg),
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
            CliError::Interrupted => "Interrupted".to_string(),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::ConfigError(msg) => {
                format!("{} {}", "Configuration error:".red().bold(), msg.white())
            }
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
            CliError::Interrupted => format!("{}", "Interrupted".yellow().bold()),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<MsgstatsError> for CliError {
    fn from(err: MsgstatsError) -> Self {
        match err {
            MsgstatsError::DateParse(_) | MsgstatsError::Serialization(_) => {
                CliError::ParseError(err.message().to_string())
            }
            e if e.is_configuration() => CliError::ConfigError(e.message().to_string()),
            e => CliError::StorageError(e.to_string()),
        }
    }
}

/// Run a CLI command from clap-parsed input
///
/// Config generation and backfill run before any database connection;
/// backfill validates its arguments first.
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => commands::config_generate(output_path, force).await,
        Commands::BackfillUniqueContacts(args) => {
            commands::backfill_unique_contacts(args, BackfillDefaults::MANAGED).await
        }
        Commands::RefreshUniqueContacts { date } => {
            commands::refresh_unique_contacts(StorageFactory::create().await?, date).await
        }
        Commands::UniqueContacts {
            action:
                UniqueContactsCommands::Show {
                    org_id,
                    start_date,
                    end_date,
                },
        } => {
            let storage = StorageFactory::create().await?;
            commands::show_unique_contacts(storage, org_id, start_date, end_date).await
        }
        Commands::BroadcastStats { action } => {
            let storage = StorageFactory::create().await?;
            match action {
                BroadcastStatsCommands::Show { broadcast_id } => {
                    commands::show_broadcast_stats(storage, broadcast_id).await
                }
                BroadcastStatsCommands::Init { broadcast_id } => {
                    commands::init_broadcast_stats(storage, broadcast_id).await
                }
            }
        }
        Commands::ApplyStatuses { input } => {
            commands::apply_statuses(StorageFactory::create().await?, input).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let config: CliError =
            MsgstatsError::invalid_date_range("start-date must be before or equal to end-date").into();
        assert!(matches!(config, CliError::ConfigError(_)));
        assert_eq!(config.exit_code(), 1);

        let storage: CliError = MsgstatsError::database_connection("refused").into();
        assert!(matches!(storage, CliError::StorageError(_)));
        assert_eq!(storage.exit_code(), 1);

        assert_eq!(CliError::Interrupted.exit_code(), 130);
    }

    #[test]
    fn test_date_errors_are_parse_errors() {
        let err: CliError = MsgstatsError::date_parse("bad").into();
        assert!(matches!(err, CliError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_config_generate_dispatches_without_storage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("msgstats.toml");

        run_cli_command(Commands::Config {
            action: ConfigCommands::Generate {
                output_path: Some(path.to_string_lossy().into_owned()),
                force: true,
            },
        })
        .await
        .unwrap();

        assert!(path.exists());
    }
}
