//! Post-hoc validation of organized exports.
//!
//! Compares an input export against an organized output and reports
//! structural diffs: item count and order, credential preservation, and a
//! summary of the organization applied. Checks only ever compare values;
//! credential material is never copied into the report, which carries
//! counts and item indexes alone.

use crate::models::{Export, Item, VaultKind};

/// Login keys that must survive organization byte-for-byte.
const CREDENTIAL_KEYS: [&str; 3] = ["username", "password", "totp"];

/// Aggregate outcome of validating an organized export.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Failed checks; any entry means the output should not be trusted
    pub errors: Vec<String>,
    /// Suspicious but non-fatal observations
    pub warnings: Vec<String>,
    /// Item count in the input document
    pub input_items: usize,
    /// Item count in the output document
    pub output_items: usize,
    /// Credential fields compared across both documents
    pub credentials_checked: usize,
    /// Items whose display name changed
    pub renamed_items: usize,
    /// Output items carrying a folder assignment
    pub items_with_folder: usize,
    /// Output items carrying collection assignments
    pub items_with_collections: usize,
    /// Output items carrying a `labels` custom field
    pub labels_fields: usize,
    /// Folders present in the output but not the input
    pub folders_added: usize,
    /// Collections present in the output but not the input
    pub collections_added: usize,
}

impl ValidationReport {
    /// True when no check failed.
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Validates an organized export against its input document.
pub fn validate_exports(input: &Export, output: &Export) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_structure(input, output, &mut report);
    check_item_counts(input, output, &mut report);
    check_items(input, output, &mut report);
    summarize_registries(input, output, &mut report);

    report
}

/// Registry keys must not disappear, and the vault kind must not flip.
fn check_structure(input: &Export, output: &Export, report: &mut ValidationReport) {
    if input.vault_kind() != output.vault_kind() {
        report.error(format!(
            "vault kind changed: input is a {}, output is a {}",
            input.vault_kind(),
            output.vault_kind()
        ));
    }

    if input.folders.is_some() && output.folders.is_none() {
        report.warn("input has a folders key but the output dropped it");
    }
    if input.collections.is_some() && output.collections.is_none() {
        report.warn("input has a collections key but the output dropped it");
    }
}

fn check_item_counts(input: &Export, output: &Export, report: &mut ValidationReport) {
    report.input_items = input.items.len();
    report.output_items = output.items.len();

    if input.items.len() != output.items.len() {
        report.error(format!(
            "item count mismatch: input has {}, output has {}",
            input.items.len(),
            output.items.len()
        ));
    }
}

fn check_items(input: &Export, output: &Export, report: &mut ValidationReport) {
    let personal = output.vault_kind() == VaultKind::Personal;

    for (index, (before, after)) in input.items.iter().zip(output.items.iter()).enumerate() {
        check_identity(index, before, after, report);
        check_credentials(index, before, after, report);
        check_notes(index, before, after, report);

        if before.name() != after.name() {
            report.renamed_items += 1;
        }
        if after.folder_id().is_some() {
            report.items_with_folder += 1;
            if !personal {
                report.error(format!(
                    "item {index} carries a folder assignment in an organization export"
                ));
            }
        }
        if !after.collection_ids().is_empty() {
            report.items_with_collections += 1;
            if personal {
                report.error(format!(
                    "item {index} carries collection assignments in a personal vault"
                ));
            }
        }
        if after.fields().iter().any(|f| f.name() == "labels") {
            report.labels_fields += 1;
        }
    }
}

/// Items must stay at their original index; the `id` key is the anchor.
fn check_identity(index: usize, before: &Item, after: &Item, report: &mut ValidationReport) {
    let before_id = before.extra.get("id");
    let after_id = after.extra.get("id");
    if let (Some(before_id), Some(after_id)) = (before_id, after_id) {
        if before_id != after_id {
            report.error(format!("item {index} changed identity or position"));
        }
    }
}

fn check_credentials(index: usize, before: &Item, after: &Item, report: &mut ValidationReport) {
    let before_login = before.login();
    let after_login = after.login();

    if before_login.is_some() && after_login.is_none() {
        report.error(format!("item {index} lost its login payload"));
        return;
    }

    for key in CREDENTIAL_KEYS {
        let before_value = before_login.and_then(|l| l.extra.get(key));
        let after_value = after_login.and_then(|l| l.extra.get(key));
        if before_value.is_some() || after_value.is_some() {
            report.credentials_checked += 1;
        }
        // Values are compared, never echoed into the report
        if before_value != after_value {
            report.error(format!("item {index} changed its `{key}` field"));
        }
    }

    if let (Some(before_login), Some(after_login)) = (before_login, after_login) {
        for (key, value) in &before_login.extra {
            if CREDENTIAL_KEYS.contains(&key.as_str()) {
                continue;
            }
            if after_login.extra.get(key) != Some(value) {
                report.warn(format!("item {index} changed its login `{key}` field"));
            }
        }
    }
}

/// Original note content must survive beneath any metadata header.
fn check_notes(index: usize, before: &Item, after: &Item, report: &mut ValidationReport) {
    let original = before.notes().trim();
    if !original.is_empty() && !after.notes().contains(original) {
        report.warn(format!("item {index} no longer contains its original notes"));
    }
}

fn summarize_registries(input: &Export, output: &Export, report: &mut ValidationReport) {
    let input_folder_ids: Vec<String> =
        input.folders_vec().iter().map(|f| f.id.clone()).collect();
    report.folders_added = output
        .folders_vec()
        .iter()
        .filter(|f| !input_folder_ids.contains(&f.id))
        .count();

    let input_collection_ids: Vec<String> =
        input.collections_vec().iter().map(|c| c.id.clone()).collect();
    report.collections_added = output
        .collections_vec()
        .iter()
        .filter(|c| !input_collection_ids.contains(&c.id))
        .count();

    // Every folder/collection an item references must exist
    let known_folders: Vec<String> = output.folders_vec().iter().map(|f| f.id.clone()).collect();
    for item in &output.items {
        if let Some(id) = item.folder_id() {
            if !known_folders.iter().any(|known| known == id) {
                report.error(format!("an item references unknown folder id {id}"));
                break;
            }
        }
    }

    let known_collections: Vec<String> =
        output.collections_vec().iter().map(|c| c.id.clone()).collect();
    for item in &output.items {
        if item
            .collection_ids()
            .iter()
            .any(|id| !known_collections.contains(id))
        {
            report.error("an item references an unknown collection id".to_string());
            break;
        }
    }
}
