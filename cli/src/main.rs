use std::time::Duration;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};
use userdata_core::{Config, UserDataAggregator};

mod cli;
mod commands;

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let config = Config::new(&cli.base_url, Duration::from_secs(cli.timeout_secs))?;
    let aggregator = UserDataAggregator::from_config(&config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(cli.command, aggregator, &mut out).await
}
