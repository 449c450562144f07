use std::path::PathBuf;

use clap::Parser;

use crate::errors::AppError;
use crate::models::RiskAssessment;
use crate::normalizer::normalize_with_diagnostics;
use crate::profiles::load_document;

#[derive(Parser, Debug)]
#[command(
    name = "normalize_report",
    about = "Normalize an Experian report and print its risk assessment",
    version
)]
pub struct Cli {
    /// Raw report file (JSON)
    pub report: PathBuf,

    /// Print only the normalized record, without the derived narrative
    #[arg(long)]
    pub record_only: bool,
}

/// Render a parsed report as pretty JSON: the full assessment, or only the record.
///
/// Diagnostics are already logged by the normalizer.
pub fn render_report(document: &serde_json::Value, record_only: bool) -> Result<String, AppError> {
    let normalized = normalize_with_diagnostics(document)?;

    let output = if record_only {
        serde_json::to_string_pretty(&normalized.record)
    } else {
        serde_json::to_string_pretty(&RiskAssessment::from_record(normalized.record))
    };
    output.map_err(|e| AppError::InternalError(format!("Failed to serialize report: {}", e)))
}

/// Load the report named on the command line and render it.
pub fn run(cli: &Cli) -> Result<String, AppError> {
    let document = load_document(&cli.report)?;
    render_report(&document, cli.record_only)
}
