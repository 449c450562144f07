//! Utility to normalize a bureau report file and print its assessment.

use clap::Parser;
use experian_risk_api::cli::{run, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the report normalization utility.
///
/// Reads the report, normalizes it and prints the assessment (or just the record) as JSON.
/// Non-fatal diagnostics go to stderr through the log.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "experian_risk_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    println!("{}", run(&cli)?);

    Ok(())
}
