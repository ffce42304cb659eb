use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use media_downloader::config::AppConfig;
use media_downloader::presentation::{run, Cli};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    tracing::debug!(?config, "configuration loaded");

    if run(cli, config).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Logs go to stderr so stdout stays clean for `--json`
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(cli.verbose > 0),
        )
        .init();
}
