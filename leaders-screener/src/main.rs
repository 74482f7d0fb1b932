//! `leaders` - ROE screener and Industry Leaders watch-list.

use anyhow::{Context, Result};
use clap::Parser;

use leaders_common::logging::init_logging;
use leaders_common::Config;

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_with_env(cli.config.as_deref())
        .context("Failed to load configuration")?;
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    cli::run(cli, config).await
}
