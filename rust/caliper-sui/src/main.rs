// caliper-sui - Entry point
// Setup runs once per benchmark, invoke runs once per worker

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use caliper_sui::SuiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = if cli.config.exists() {
        SuiConfig::load(&cli.config)?
    } else {
        warn!("Config file {:?} not found, using defaults", cli.config);
        SuiConfig::default()
    };

    let config = config
        .with_url(cli.url.clone())
        .with_workspace_root(cli.workspace_root.clone());

    config.validate()?;

    let result = match &cli.command {
        Commands::Address => cli::runner::show_addresses(&config),
        Commands::Setup(cmd) => cli::runner::run_setup(config, cmd).await,
        Commands::Invoke(cmd) => cli::runner::run_invoke(config, cmd).await,
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
