//! Bitwarden export organization tool.
//!
//! Loads a Bitwarden JSON export, infers a topical category for each item
//! from the domains in its stored URIs, and writes an organized copy with
//! folders/collections, tags, cleaned-up names, and notes metadata.
//!
//! # Security Guarantees
//! - Usernames, passwords, and TOTP secrets are never modified or logged
//! - Offline operation; the input file is the only thing read
//! - The input file itself is never written to

use clap::{Args, Parser};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use vaultsort_core::{
    Export, ExportOrganizer, OrganizerConfig, Result, VaultKind, VaultSortError, init_logging,
};

#[derive(Parser)]
#[command(name = "vaultsort")]
#[command(about = "Bitwarden export organizer")]
#[command(version)]
#[command(long_about = "
vaultsort - Organize Bitwarden JSON exports

Categorizes every login item by the domains in its stored URIs, then:
- Files it into a folder (personal vault) or collection (organization)
  named after the category
- Adds a `labels` custom field with matching tags
- Replaces generic names like \"login\" with domain-derived ones
- Prepends a metadata header to the item's notes

SAFETY:
- Always test on a COPY of your export first
- Usernames, passwords, and TOTP secrets are never modified
- Only names, notes, custom fields, folders, and collections are touched

EXAMPLES:
  vaultsort export.json                  # writes export_organized.json
  vaultsort export.json -o clean.json
  vaultsort export.json --dry-run        # preview without writing
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Path to the Bitwarden JSON export file
    pub input: PathBuf,

    /// Output file path
    #[arg(
        short,
        long,
        help = "Output file path (default: <input>_organized.json)"
    )]
    pub output: Option<PathBuf>,

    /// Preview changes without writing the output file
    #[arg(long, help = "Preview changes without writing the output file")]
    pub dry_run: bool,

    /// Skip the notes metadata header
    #[arg(long, help = "Skip adding metadata headers to notes")]
    pub no_metadata: bool,

    /// Skip name suggestions
    #[arg(long, help = "Skip suggesting cleaner item names")]
    pub no_suggest_names: bool,

    /// Skip folder/collection assignment
    #[arg(long, help = "Skip creating and assigning folders/collections")]
    pub no_folders: bool,

    /// Skip the labels custom field
    #[arg(long, help = "Skip adding tags as custom fields")]
    pub no_tags: bool,
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

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    let config = OrganizerConfig::new()
        .with_annotate_notes(!cli.no_metadata)
        .with_suggest_names(!cli.no_suggest_names)
        .with_assign_folders(!cli.no_folders)
        .with_add_tags(!cli.no_tags);

    info!("Loading Bitwarden export from {}", cli.input.display());
    let export = load_export(&cli.input)?;

    info!("Found {} items to process", export.items.len());
    match export.vault_kind() {
        VaultKind::Organization => info!("Detected organization export (has collections)"),
        VaultKind::Personal => info!("Detected personal vault export"),
    }

    let organizer = ExportOrganizer::new(config);
    let organized = organizer.organize_export(&export)?;
    info!("✓ Organization completed");

    print_summary(&export, &organized);

    if cli.dry_run {
        println!("DRY RUN MODE - no files were written");
        println!("Run again without --dry-run to save the organized export");
        return Ok(());
    }

    let output_path = output_path(&cli.input, cli.output.as_deref());
    save_export(&organized, &output_path)?;

    info!("✓ Organized export saved to {}", output_path.display());
    println!("Organized export written to {}", output_path.display());
    println!("You can now import it back into Bitwarden");

    Ok(())
}

/// Loads and shape-checks an export file.
fn load_export(path: &Path) -> Result<Export> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| VaultSortError::io_failed(format!("Failed to read {}", path.display()), e))?;

    if raw.trim().is_empty() {
        return Err(VaultSortError::malformed_export(format!(
            "{} is empty",
            path.display()
        )));
    }

    let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
        VaultSortError::serialization_failed(format!("Invalid JSON in {}", path.display()), e)
    })?;

    Export::from_value(value)
}

/// Serializes and writes the organized export.
fn save_export(export: &Export, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(export)
        .map_err(|e| VaultSortError::serialization_failed("Failed to serialize export", e))?;

    std::fs::write(path, json)
        .map_err(|e| VaultSortError::io_failed(format!("Failed to write {}", path.display()), e))
}

/// Derives the output path when none was given: `export.json` becomes
/// `export_organized.json`; already-organized names pass through.
fn output_path(input: &Path, output: Option<&Path>) -> PathBuf {
    if let Some(output) = output {
        return output.to_path_buf();
    }

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("export");
    if stem.ends_with("_organized") {
        return input.to_path_buf();
    }

    let extension = input.extension().and_then(|e| e.to_str()).unwrap_or("json");
    input.with_file_name(format!("{stem}_organized.{extension}"))
}

fn print_summary(input: &Export, organized: &Export) {
    let folders_before = input.folders_vec().len();
    let folders_after = organized.folders_vec().len();
    let collections_before = input.collections_vec().len();
    let collections_after = organized.collections_vec().len();

    let renamed = input
        .items
        .iter()
        .zip(organized.items.iter())
        .filter(|(a, b)| a.name() != b.name())
        .count();

    println!("Summary:");
    println!("  Items processed:     {}", organized.items.len());
    println!("  Items renamed:       {renamed}");
    match organized.vault_kind() {
        VaultKind::Personal => {
            println!(
                "  Folders created:     {}",
                folders_after.saturating_sub(folders_before)
            );
        }
        VaultKind::Organization => {
            println!(
                "  Collections created: {}",
                collections_after.saturating_sub(collections_before)
            );
        }
    }

    if organized.items.is_empty() {
        warn!("Export contained no items; output is unchanged");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_default() {
        let path = output_path(Path::new("/tmp/export.json"), None);
        assert_eq!(path, PathBuf::from("/tmp/export_organized.json"));
    }

    #[test]
    fn test_output_path_already_organized() {
        let path = output_path(Path::new("/tmp/export_organized.json"), None);
        assert_eq!(path, PathBuf::from("/tmp/export_organized.json"));
    }

    #[test]
    fn test_output_path_explicit() {
        let path = output_path(Path::new("export.json"), Some(Path::new("clean.json")));
        assert_eq!(path, PathBuf::from("clean.json"));
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "vaultsort",
            "export.json",
            "--dry-run",
            "--no-tags",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.input, PathBuf::from("export.json"));
        assert!(cli.dry_run);
        assert!(cli.no_tags);
        assert!(!cli.no_folders);
        assert_eq!(cli.global.verbose, 1);
    }
}
