//! Integrity validation for organized Bitwarden exports.
//!
//! Compares an original export against its organized output and reports
//! whether every credential survived untouched, whether items kept their
//! count and order, and what organization was applied. The report carries
//! counts and item indexes only; credential values are never printed.

use clap::{Args, Parser};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use vaultsort_core::{Export, Result, ValidationReport, VaultSortError, init_logging, validate_exports};

#[derive(Parser)]
#[command(name = "vaultsort-validate")]
#[command(about = "Validate an organized Bitwarden export against its input")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Path to the original export file
    pub input: PathBuf,

    /// Path to the organized export file
    pub output: PathBuf,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    pub quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(report) if report.passed() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("Validation aborted: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ValidationReport> {
    info!("Loading original export from {}", cli.input.display());
    let input = load_export(&cli.input)?;

    info!("Loading organized export from {}", cli.output.display());
    let output = load_export(&cli.output)?;

    let report = validate_exports(&input, &output);
    print_report(&report);

    Ok(report)
}

fn load_export(path: &Path) -> Result<Export> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| VaultSortError::io_failed(format!("Failed to read {}", path.display()), e))?;

    let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
        VaultSortError::serialization_failed(format!("Invalid JSON in {}", path.display()), e)
    })?;

    Export::from_value(value)
}

fn print_report(report: &ValidationReport) {
    println!("Validation report");
    println!("  Items (input/output):  {}/{}", report.input_items, report.output_items);
    println!("  Credentials checked:   {}", report.credentials_checked);
    println!("  Items renamed:         {}", report.renamed_items);
    println!("  Folder assignments:    {}", report.items_with_folder);
    println!("  Collection assignments: {}", report.items_with_collections);
    println!("  Labels fields:         {}", report.labels_fields);
    println!("  Folders added:         {}", report.folders_added);
    println!("  Collections added:     {}", report.collections_added);

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  - {warning}");
        }
    }

    println!();
    if report.passed() {
        println!("✓ PASSED - credentials and structure preserved");
    } else {
        println!("FAILED:");
        for error in &report.errors {
            println!("  - {error}");
        }
    }
}
