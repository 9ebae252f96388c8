//! Dealboard CLI entry point.
//!
//! This binary is the composition root for the whole workspace. Responsibilities:
//!
//! 1. **Parse arguments and configuration**: clap flags over
//!    `.dealboard/config.toml`, validated before anything else runs.
//! 2. **Wire observability**: `tracing-subscriber` on stderr, plus an
//!    OpenTelemetry OTLP exporter when an endpoint is configured.
//! 3. **Construct infrastructure**: load the stored token, build an
//!    [`api_client::HttpApiClient`] around it, and hand it to the `board`
//!    crate's aggregator or single-level views.
//! 4. **Print the view** as text or JSON and map failures to the exit code.

mod args;
mod commands;
mod config;
mod credentials;
mod telemetry;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::args::Cli;
use crate::config::CliConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode> {
    let config = CliConfig::load(cli.config.as_deref())?.with_overrides(cli)?;
    let _telemetry = telemetry::init(&config, cli.verbose)?;
    tracing::debug!(base_url = %config.base_url, "configuration loaded");

    commands::execute(cli, &config).await
}
