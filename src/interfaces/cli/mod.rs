//! CLI interface module
//!
//! This module provides command-line interface functionality for linkpanel.

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};
use crate::errors::PanelError;
use commands::{BulkArgs, config_generate, convert, quote, run_bulk};

#[derive(Debug)]
pub enum CliError {
    /// Error raised by the panel core, keeps its code
    Panel(PanelError),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::Panel(err) => err.format_simple(),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::Panel(err) => err.format_colored(),
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }

    /// Process exit code: 2 for input problems, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Panel(err) if err.is_local_validation() => 2,
            CliError::ParseError(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<PanelError> for CliError {
    fn from(err: PanelError) -> Self {
        CliError::Panel(err)
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Convert {
            amount,
            currency,
            to_usd,
        } => convert(&amount, &currency, to_usd),

        Commands::Quote {
            balance_usd,
            currency,
            amount,
        } => quote(&balance_usd, &currency, amount.as_deref()),

        Commands::Bulk {
            resource,
            action,
            ids,
            all,
            search,
            facets,
            reason,
            message,
            yes,
        } => {
            let facets = Commands::parse_facets(&facets).map_err(CliError::ParseError)?;
            run_bulk(BulkArgs {
                resource,
                action,
                ids,
                all,
                search,
                facets,
                reason,
                message,
                yes,
            })
            .await
        }

        Commands::Config { action } => match action {
            ConfigCommands::Generate { output_path, force } => {
                config_generate(output_path, force).await
            }
        },
    }
}
