//! `config generate`: write a starter panel configuration

use std::path::Path;

use colored::Colorize;
use tracing::info;

use super::ask_on_terminal;
use crate::config::StaticConfig;
use crate::interfaces::cli::CliError;

pub const SAMPLE_CONFIG_PATH: &str = "config.example.toml";

/// Write the default panel configuration to `output_path`.
///
/// An existing file is only replaced with `--force` or after a y/N answer.
pub async fn config_generate(output_path: Option<String>, force: bool) -> Result<(), CliError> {
    let path = output_path.unwrap_or_else(|| SAMPLE_CONFIG_PATH.to_string());

    if !force && Path::new(&path).exists() {
        let question = format!(
            "{} {} {}",
            "Config file".yellow(),
            path.blue(),
            "exists. Replace it? [y/N] ".yellow()
        );
        let replace = ask_on_terminal(question)
            .await
            .map_err(|e| CliError::CommandError(format!("Could not read answer: {}", e)))?;
        if !replace {
            println!("{}", "Aborted.".red());
            return Ok(());
        }
    }

    let sample = StaticConfig::default();
    sample.save_to_file(&path).map_err(|e| {
        CliError::CommandError(format!("Could not write panel config to {}: {}", path, e))
    })?;
    info!("Wrote sample panel config to {}", path);

    println!("{} {}", "✓ Wrote".green().bold(), path.blue());
    println!(
        "  {} {}",
        "api.base_url".cyan(),
        format!("= {} (point it at the admin API and set api.token)", sample.api.base_url).dimmed()
    );
    println!(
        "  {} {}",
        "currency.rates".cyan(),
        format!("= {} currencies against USD", sample.currency.rates.len()).dimmed()
    );
    println!(
        "  {}",
        "Environment overrides use LP__SECTION__KEY, e.g. LP__BULK__MAX_EXPLICIT_IDS".dimmed()
    );
    Ok(())
}
