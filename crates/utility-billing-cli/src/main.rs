//! Utility billing CLI - compute a bill from a JSON request.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use utility_billing_cli::{run, CliConfig};

fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the bill.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,utility_billing=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CliConfig::parse();

    tracing::debug!(
        input = ?config.input,
        output = ?config.output,
        pretty = config.pretty,
        "Configuration loaded"
    );

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.code(), "Failed to compute bill");
            ExitCode::from(e.exit_code())
        }
    }
}
