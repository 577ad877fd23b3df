//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for linkpanel using clap's derive macros.

use clap::{Parser, Subcommand};

/// linkpanel - Admin panel toolkit for the link service
#[derive(Parser)]
#[command(name = "linkpanel")]
#[command(version)]
#[command(about = "Bulk actions and currency tools for the link admin panel", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Convert an amount between USD and a local currency
    Convert {
        /// Amount (USD unless --to-usd)
        amount: String,

        /// Currency code, e.g. IDR
        currency: String,

        /// Treat the amount as local currency and convert it to USD
        #[arg(long)]
        to_usd: bool,
    },

    /// Show a withdrawal quote in a display currency
    Quote {
        /// Available balance in USD
        balance_usd: String,

        /// Display currency code
        currency: String,

        /// Validate a withdrawal amount entered in the display currency
        #[arg(long)]
        amount: Option<String>,
    },

    /// Run a bulk action on one of the admin lists
    ///
    /// Usage: bulk <links|users|withdrawals> <action> (--ids a,b | --all)
    Bulk {
        /// List: links, users or withdrawals
        resource: String,

        /// Action: activate, block, suspend, notify, approve, reject
        action: String,

        /// Record IDs, comma separated
        #[arg(long, value_delimiter = ',', conflicts_with = "all")]
        ids: Vec<String>,

        /// Target every record matching the filter
        #[arg(long)]
        all: bool,

        /// Free-text search
        #[arg(long)]
        search: Option<String>,

        /// Facet filter as name=value (repeatable)
        #[arg(long = "facet", value_name = "NAME=VALUE")]
        facets: Vec<String>,

        /// Reason (required for block, suspend, reject)
        #[arg(long)]
        reason: Option<String>,

        /// Notification message (notify only)
        #[arg(long)]
        message: Option<String>,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    /// Split `name=value` facet arguments
    pub fn parse_facets(raw: &[String]) -> Result<Vec<(String, String)>, String> {
        raw.iter()
            .map(|item| match item.split_once('=') {
                Some((name, value)) if !name.trim().is_empty() => {
                    Ok((name.trim().to_string(), value.trim().to_string()))
                }
                _ => Err(format!("Invalid facet '{}', expected NAME=VALUE", item)),
            })
            .collect()
    }
}
