//! Organizer configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the export organizer.
///
/// Every step can be toggled independently; all steps are enabled by
/// default. `fallback_to_rules` only matters when an assisting classifier
/// is installed: with it disabled, a classifier failure aborts the whole
/// run instead of degrading to the rule-based path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerConfig {
    /// Replace generic display names with domain-derived ones
    pub suggest_names: bool,
    /// Maintain the `labels` custom field from the tag set
    pub add_tags: bool,
    /// Prepend the metadata header to item notes
    pub annotate_notes: bool,
    /// Assign items to a folder (personal vault) or collection
    /// (organization export) named after the category
    pub assign_folders: bool,
    /// Degrade to rule-based classification when an assisting classifier
    /// fails
    pub fallback_to_rules: bool,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            suggest_names: true,
            add_tags: true,
            annotate_notes: true,
            assign_folders: true,
            fallback_to_rules: true,
        }
    }
}

impl OrganizerConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to enable/disable name suggestion.
    pub fn with_suggest_names(mut self, enabled: bool) -> Self {
        self.suggest_names = enabled;
        self
    }

    /// Builder method to enable/disable the `labels` custom field.
    pub fn with_add_tags(mut self, enabled: bool) -> Self {
        self.add_tags = enabled;
        self
    }

    /// Builder method to enable/disable the notes metadata header.
    pub fn with_annotate_notes(mut self, enabled: bool) -> Self {
        self.annotate_notes = enabled;
        self
    }

    /// Builder method to enable/disable folder/collection assignment.
    pub fn with_assign_folders(mut self, enabled: bool) -> Self {
        self.assign_folders = enabled;
        self
    }

    /// Builder method to enable/disable rule fallback for assisted runs.
    pub fn with_fallback_to_rules(mut self, enabled: bool) -> Self {
        self.fallback_to_rules = enabled;
        self
    }
}
