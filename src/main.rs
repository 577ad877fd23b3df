use clap::Parser;
use tracing::debug;

use linkpanel::cli::Cli;
use linkpanel::config::{get_config, init_config, init_config_from};
use linkpanel::interfaces::cli::run_cli_command;
use linkpanel::system::init_logging;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.config.as_deref() {
        Some(path) => init_config_from(path),
        None => init_config(),
    }
    let config = get_config();
    let guard = init_logging(&config.logging)?;
    debug!("Using API at {}", config.api.base_url);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(run_cli_command(cli.command));

    // 退出前刷新日志
    drop(runtime);
    drop(guard);

    if let Err(e) = outcome {
        eprintln!("{}", e.format_colored());
        std::process::exit(e.exit_code());
    }
    Ok(())
}
