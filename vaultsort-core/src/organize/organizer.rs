//! Export organizer facade.
//!
//! Drives the full pipeline over a document: domain extraction,
//! classification, renaming, tagging, notes annotation, and
//! folder/collection assignment. Items are processed strictly in order and
//! to completion; the shared folder/collection registries rely on that
//! sequential guarantee.

use std::collections::BTreeSet;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, warn};

use crate::error::{Result, VaultSortError};
use crate::models::{Collection, CustomField, Export, Folder, Item, VaultKind};

use super::assist::{ClassifierError, ItemClassifier};
use super::config::OrganizerConfig;
use super::registry::find_or_create;
use super::rules::Ruleset;
use super::{domains, naming};

/// Name of the custom field carrying the comma-joined tag set.
const LABELS_FIELD: &str = "labels";

/// Line prefixes that make up the notes metadata header.
const HEADER_PREFIXES: [&str; 4] = ["Domains:", "Category:", "Tags:", "Processed:"];

/// Organizes Bitwarden exports.
///
/// The organizer never mutates its input: every item is cloned before any
/// decision is applied, and a fatal error leaves the caller's document
/// untouched.
///
/// # Example
///
/// ```rust,ignore
/// use vaultsort_core::organize::{ExportOrganizer, OrganizerConfig};
///
/// let organizer = ExportOrganizer::new(OrganizerConfig::default());
/// let organized = organizer.organize_export(&export)?;
/// ```
pub struct ExportOrganizer {
    config: OrganizerConfig,
    ruleset: Ruleset,
    assist: Option<Box<dyn ItemClassifier>>,
}

impl ExportOrganizer {
    /// Creates an organizer with the given configuration and the builtin
    /// ruleset.
    pub fn new(config: OrganizerConfig) -> Self {
        Self {
            config,
            ruleset: Ruleset::builtin().clone(),
            assist: None,
        }
    }

    /// Creates an organizer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(OrganizerConfig::default())
    }

    /// Replaces the builtin ruleset.
    pub fn with_ruleset(mut self, ruleset: Ruleset) -> Self {
        self.ruleset = ruleset;
        self
    }

    /// Installs an assisting classifier used in place of the rule-based
    /// path. Its failures degrade to the rules when
    /// `fallback_to_rules` is set, and abort the run otherwise.
    pub fn with_classifier(mut self, classifier: Box<dyn ItemClassifier>) -> Self {
        self.assist = Some(classifier);
        self
    }

    /// Returns a reference to the organizer configuration.
    pub fn config(&self) -> &OrganizerConfig {
        &self.config
    }

    /// Organizes a complete export.
    ///
    /// Items are replaced in place at their original index; item count and
    /// order are invariant. Per-item failures are logged and leave the
    /// original item unmodified at that position. Classifier failures with
    /// fallback disabled are fatal for the whole run, in which case no
    /// document is returned at all.
    pub fn organize_export(&self, export: &Export) -> Result<Export> {
        let mut organized = export.clone();
        if organized.items.is_empty() {
            return Ok(organized);
        }

        let vault = organized.vault_kind();
        let mut folders = organized.folders_vec();
        let mut collections = organized.collections_vec();

        let mut items = Vec::with_capacity(organized.items.len());
        for (index, item) in organized.items.iter().enumerate() {
            match self.organize_item(item, &mut folders, &mut collections, vault) {
                Ok(done) => items.push(done),
                Err(e) if e.is_recoverable() => {
                    warn!(
                        "Failed to organize item {} ('{}'): {}",
                        index,
                        item.name(),
                        e
                    );
                    items.push(item.clone());
                }
                Err(e) => return Err(e),
            }
        }
        organized.items = items;

        // Write back only the active registry; adding the other key would
        // flip vault-type detection on the next run.
        match vault {
            VaultKind::Personal => organized.folders = Some(Some(folders)),
            VaultKind::Organization => organized.collections = Some(Some(collections)),
        }

        Ok(organized)
    }

    /// Organizes a single item against the shared registries.
    ///
    /// Items without recognizable URIs are returned as untouched copies:
    /// no category, tags, folder, or notes rewrite applies to them.
    pub fn organize_item(
        &self,
        item: &Item,
        folders: &mut Vec<Folder>,
        collections: &mut Vec<Collection>,
        vault: VaultKind,
    ) -> Result<Item> {
        let mut organized = item.clone();

        let domains = domains::extract_domains(item);
        if domains.is_empty() {
            return Ok(organized);
        }

        let decision = self.classify(item, &domains)?;
        debug!(
            "Item '{}' classified as {} ({} tags)",
            item.name(),
            decision.category,
            decision.tags.len()
        );

        if self.config.suggest_names {
            if let Some(suggested) = decision.suggested_name {
                if suggested != item.name() {
                    organized.set_name(suggested);
                }
            }
        }

        if self.config.add_tags && !decision.tags.is_empty() {
            upsert_labels(organized.fields_mut(), &decision.tags);
        }

        if self.config.annotate_notes {
            organized.set_notes(annotate_notes(
                item.notes(),
                &domains,
                &decision.category,
                &decision.tags,
            ));
        }

        if self.config.assign_folders {
            match vault {
                VaultKind::Personal => {
                    let id = find_or_create(folders, &decision.category);
                    organized.set_folder(id);
                }
                VaultKind::Organization => {
                    let id = find_or_create(collections, &decision.category);
                    organized.set_collections(vec![id]);
                }
            }
        }

        Ok(organized)
    }

    /// Produces the category, tags, and (optionally) a suggested name for
    /// one item, applying the assisted-with-fallback policy.
    fn classify(&self, item: &Item, domains: &[String]) -> Result<Decision> {
        if let Some(assist) = &self.assist {
            match self.classify_assisted(assist.as_ref(), item) {
                Ok(decision) => return Ok(decision),
                Err(e) if self.config.fallback_to_rules => {
                    warn!(
                        "Assisted classification failed for item '{}', falling back to rules: {}",
                        item.name(),
                        e
                    );
                }
                Err(e) => {
                    return Err(VaultSortError::classifier_failed(
                        format!("assisted classification of item '{}'", item.name()),
                        e,
                    ));
                }
            }
        }

        let classification = self.ruleset.classify(domains);
        let suggested_name = self
            .config
            .suggest_names
            .then(|| naming::suggest_name(item.name(), domains));

        Ok(Decision {
            category: classification.category,
            tags: classification.tags,
            suggested_name,
        })
    }

    fn classify_assisted(
        &self,
        assist: &dyn ItemClassifier,
        item: &Item,
    ) -> std::result::Result<Decision, ClassifierError> {
        let uris: Vec<String> = item
            .login()
            .map(|login| {
                login
                    .uris()
                    .iter()
                    .filter_map(|entry| entry.uri())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let category = assist.categorize(item.name(), item.notes(), &uris)?;
        if category.trim().is_empty() {
            return Err(ClassifierError::failed("classifier returned an empty category"));
        }

        let suggested_name = if self.config.suggest_names {
            Some(assist.suggest_name(item.name(), item.notes(), &uris)?)
        } else {
            None
        };

        let tags = if self.config.add_tags {
            assist.generate_tags(item.name(), &category, item.notes(), &uris)?
        } else {
            BTreeSet::from([category.to_lowercase()])
        };

        Ok(Decision {
            category,
            tags,
            suggested_name,
        })
    }
}

/// Outcome of classifying one item.
struct Decision {
    category: String,
    tags: BTreeSet<String>,
    suggested_name: Option<String>,
}

/// Updates the `labels` custom field in place, or appends it when missing.
fn upsert_labels(fields: &mut Vec<CustomField>, tags: &BTreeSet<String>) {
    let joined = join_tags(tags);
    if let Some(field) = fields.iter_mut().find(|f| f.name() == LABELS_FIELD) {
        field.set_value(joined);
    } else {
        fields.push(CustomField::text(LABELS_FIELD, joined));
    }
}

/// Rebuilds notes as a metadata header followed by the pre-existing
/// content. A header written by a previous run is stripped first, so
/// re-organizing cannot stack headers.
fn annotate_notes(
    current: &str,
    domains: &[String],
    category: &str,
    tags: &BTreeSet<String>,
) -> String {
    let current = strip_metadata_header(current.trim());

    let mut lines = Vec::new();
    if !domains.is_empty() {
        lines.push(format!("Domains: {}", domains.join(", ")));
    }
    lines.push(format!("Category: {category}"));
    if !tags.is_empty() {
        lines.push(format!("Tags: {}", join_tags(tags)));
    }
    lines.push(format!(
        "Processed: {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    let header = lines.join("\n");

    if current.is_empty() {
        header
    } else {
        format!("{header}\n\n{current}")
    }
}

/// Drops a leading metadata header (and its blank separator line) from
/// notes, returning the remainder untouched.
fn strip_metadata_header(notes: &str) -> &str {
    let mut offset = 0;
    let mut saw_header = false;

    for line in notes.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if HEADER_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
            saw_header = true;
            offset += line.len();
        } else if saw_header && trimmed.is_empty() {
            offset += line.len();
            break;
        } else {
            break;
        }
    }

    if saw_header { &notes[offset..] } else { notes }
}

fn join_tags(tags: &BTreeSet<String>) -> String {
    tags.iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: serde_json::Value) -> Item {
        serde_json::from_value(value).unwrap()
    }

    fn github_item() -> Item {
        item(json!({
            "id": "item-1",
            "name": "login",
            "notes": "Original notes",
            "login": {
                "username": "octocat",
                "password": "secret",
                "uris": [{"uri": "https://github.com/login"}]
            }
        }))
    }

    #[test]
    fn test_organize_item_basic() {
        let organizer = ExportOrganizer::with_defaults();
        let mut folders: Vec<Folder> = Vec::new();
        let mut collections: Vec<Collection> = Vec::new();

        let original = github_item();
        let organized = organizer
            .organize_item(&original, &mut folders, &mut collections, VaultKind::Personal)
            .unwrap();

        assert_eq!(organized.name(), "Github.com");
        assert!(organized.notes().starts_with("Domains: github.com"));
        assert!(organized.notes().contains("\nCategory: Developer"));
        assert!(organized.notes().contains("\nTags: dev"));
        assert!(organized.notes().ends_with("Original notes"));

        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].name(), "Developer");
        assert_eq!(organized.folder_id(), Some(folders[0].id.as_str()));
        assert!(organized.collection_ids().is_empty());

        // Input item is untouched
        assert_eq!(original.name(), "login");
        assert_eq!(original.notes(), "Original notes");
    }

    #[test]
    fn test_organize_item_credentials_untouched() {
        let organizer = ExportOrganizer::with_defaults();
        let mut folders = Vec::new();
        let mut collections = Vec::new();

        let original = github_item();
        let organized = organizer
            .organize_item(&original, &mut folders, &mut collections, VaultKind::Personal)
            .unwrap();

        let login = organized.login().unwrap();
        assert_eq!(login.extra.get("username"), Some(&json!("octocat")));
        assert_eq!(login.extra.get("password"), Some(&json!("secret")));
    }

    #[test]
    fn test_organize_item_no_domains_passthrough() {
        let organizer = ExportOrganizer::with_defaults();
        let mut folders = Vec::new();
        let mut collections = Vec::new();

        let original = item(json!({"id": "x", "name": "No URL item", "notes": "keep"}));
        let organized = organizer
            .organize_item(&original, &mut folders, &mut collections, VaultKind::Personal)
            .unwrap();

        assert_eq!(organized, original);
        assert!(folders.is_empty());
    }

    #[test]
    fn test_organize_item_org_vault_uses_collections() {
        let organizer = ExportOrganizer::with_defaults();
        let mut folders = Vec::new();
        let mut collections = Vec::new();

        let organized = organizer
            .organize_item(
                &github_item(),
                &mut folders,
                &mut collections,
                VaultKind::Organization,
            )
            .unwrap();

        assert!(folders.is_empty());
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].name(), "Developer");
        assert_eq!(organized.collection_ids(), [collections[0].id.clone()]);
        assert!(organized.folder_id().is_none());
    }

    #[test]
    fn test_labels_field_upsert_is_idempotent() {
        let organizer = ExportOrganizer::with_defaults();
        let mut folders = Vec::new();
        let mut collections = Vec::new();

        let first = organizer
            .organize_item(&github_item(), &mut folders, &mut collections, VaultKind::Personal)
            .unwrap();
        let second = organizer
            .organize_item(&first, &mut folders, &mut collections, VaultKind::Personal)
            .unwrap();

        let labels: Vec<_> = second
            .fields()
            .iter()
            .filter(|f| f.name() == LABELS_FIELD)
            .collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].value(), "dev");
    }

    #[test]
    fn test_reorganize_does_not_stack_headers() {
        let organizer = ExportOrganizer::with_defaults();
        let mut folders = Vec::new();
        let mut collections = Vec::new();

        let first = organizer
            .organize_item(&github_item(), &mut folders, &mut collections, VaultKind::Personal)
            .unwrap();
        let second = organizer
            .organize_item(&first, &mut folders, &mut collections, VaultKind::Personal)
            .unwrap();

        assert_eq!(second.notes().matches("Category:").count(), 1);
        assert!(second.notes().ends_with("Original notes"));
        // The registry was reused, not regrown
        assert_eq!(folders.len(), 1);
    }

    #[test]
    fn test_config_toggles_disable_steps() {
        let config = OrganizerConfig::new()
            .with_suggest_names(false)
            .with_add_tags(false)
            .with_annotate_notes(false)
            .with_assign_folders(false);
        let organizer = ExportOrganizer::new(config);
        let mut folders = Vec::new();
        let mut collections = Vec::new();

        let organized = organizer
            .organize_item(&github_item(), &mut folders, &mut collections, VaultKind::Personal)
            .unwrap();

        assert_eq!(organized.name(), "login");
        assert_eq!(organized.notes(), "Original notes");
        assert!(organized.fields().is_empty());
        assert!(organized.folder_id().is_none());
        assert!(folders.is_empty());
    }

    #[test]
    fn test_organize_export_personal_vault() {
        let export = Export::from_value(json!({
            "folders": [],
            "items": [
                {"id": "a", "name": "login", "login": {"uris": [{"uri": "https://github.com"}]}},
                {"id": "b", "name": "website", "login": {"uris": [{"uri": "https://paypal.com"}]}}
            ]
        }))
        .unwrap();

        let organized = ExportOrganizer::with_defaults()
            .organize_export(&export)
            .unwrap();

        assert_eq!(organized.items.len(), 2);
        let folders = organized.folders_vec();
        let names: Vec<_> = folders.iter().map(Folder::name).collect();
        assert!(names.contains(&"Developer"));
        assert!(names.contains(&"Finance"));
        // Personal vault output never gains a collections key
        assert!(organized.collections.is_none());
    }

    #[test]
    fn test_organize_export_organization_vault() {
        let export = Export::from_value(json!({
            "collections": [],
            "items": [
                {"id": "a", "name": "login", "login": {"uris": [{"uri": "https://github.com"}]}}
            ]
        }))
        .unwrap();

        let organized = ExportOrganizer::with_defaults()
            .organize_export(&export)
            .unwrap();

        let collections = organized.collections_vec();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].name(), "Developer");
        assert_eq!(
            organized.items[0].collection_ids(),
            [collections[0].id.clone()]
        );
        assert!(organized.items[0].folder_id().is_none());
        // Organization output never gains a folders key
        assert!(organized.folders.is_none());
    }

    #[test]
    fn test_organize_export_empty_items_unchanged() {
        let export = Export::from_value(json!({"items": []})).unwrap();
        let organized = ExportOrganizer::with_defaults()
            .organize_export(&export)
            .unwrap();

        assert!(organized.items.is_empty());
        assert!(organized.folders.is_none());
        assert!(organized.collections.is_none());
    }

    #[test]
    fn test_organize_export_preserves_order_and_count() {
        let export = Export::from_value(json!({
            "items": [
                {"id": "1", "name": "No URIs"},
                {"id": "2", "name": "login", "login": {"uris": [{"uri": "https://github.com"}]}},
                {"id": "3", "name": "Also no URIs"}
            ]
        }))
        .unwrap();

        let organized = ExportOrganizer::with_defaults()
            .organize_export(&export)
            .unwrap();

        assert_eq!(organized.items.len(), 3);
        assert_eq!(organized.items[0].extra.get("id"), Some(&json!("1")));
        assert_eq!(organized.items[1].extra.get("id"), Some(&json!("2")));
        assert_eq!(organized.items[2].extra.get("id"), Some(&json!("3")));
        // URI-less items are structurally identical to their inputs
        assert_eq!(organized.items[0], export.items[0]);
        assert_eq!(organized.items[2], export.items[2]);
    }

    /// Classifier stub that always fails, for fallback policy tests.
    struct FailingClassifier;

    impl ItemClassifier for FailingClassifier {
        fn categorize(
            &self,
            _name: &str,
            _notes: &str,
            _uris: &[String],
        ) -> std::result::Result<String, ClassifierError> {
            Err(ClassifierError::failed("stub failure"))
        }

        fn suggest_name(
            &self,
            name: &str,
            _notes: &str,
            _uris: &[String],
        ) -> std::result::Result<String, ClassifierError> {
            Ok(name.to_string())
        }

        fn generate_tags(
            &self,
            _name: &str,
            category: &str,
            _notes: &str,
            _uris: &[String],
        ) -> std::result::Result<BTreeSet<String>, ClassifierError> {
            Ok(BTreeSet::from([category.to_lowercase()]))
        }
    }

    #[test]
    fn test_assisted_failure_falls_back_to_rules() {
        let organizer =
            ExportOrganizer::with_defaults().with_classifier(Box::new(FailingClassifier));
        let mut folders = Vec::new();
        let mut collections = Vec::new();

        let organized = organizer
            .organize_item(&github_item(), &mut folders, &mut collections, VaultKind::Personal)
            .unwrap();

        // Rule fallback still classified and renamed the item
        assert_eq!(organized.name(), "Github.com");
        assert_eq!(folders[0].name(), "Developer");
    }

    #[test]
    fn test_assisted_failure_without_fallback_is_fatal() {
        let config = OrganizerConfig::new().with_fallback_to_rules(false);
        let organizer = ExportOrganizer::new(config).with_classifier(Box::new(FailingClassifier));

        let export = Export::from_value(json!({
            "items": [
                {"id": "a", "name": "login", "login": {"uris": [{"uri": "https://github.com"}]}}
            ]
        }))
        .unwrap();

        let err = organizer.organize_export(&export).unwrap_err();
        assert!(matches!(err, VaultSortError::Classifier { .. }));
    }

    #[test]
    fn test_strip_metadata_header() {
        let notes = "Domains: a.com\nCategory: General\nTags: general\nProcessed: t\n\nuser notes";
        assert_eq!(strip_metadata_header(notes), "user notes");

        // Notes without a header pass through untouched
        assert_eq!(strip_metadata_header("just notes"), "just notes");

        // Header-only notes strip to nothing
        let header_only = "Category: General\nProcessed: t";
        assert_eq!(strip_metadata_header(header_only), "");
    }
}
