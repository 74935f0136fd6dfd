//! Pluggable classification capability.
//!
//! The organizer talks to classification through the [`ItemClassifier`]
//! trait so an externally-assisted implementation (for example one backed by
//! a language model service) can replace the builtin rules. External
//! implementations wrap their failures in [`ClassifierError`]; the
//! orchestrator catches those and, when configured, downgrades to the
//! rule-based path instead of failing the run.

use std::collections::BTreeSet;

use thiserror::Error;

use super::domains::normalize_uri;
use super::naming;
use super::rules::Ruleset;

/// Failure reported by a classifier implementation.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The classifier is not usable at all (missing configuration,
    /// disabled feature)
    #[error("classifier unavailable: {reason}")]
    Unavailable { reason: String },

    /// A single classification request failed
    #[error("classification failed: {context}")]
    Failed {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ClassifierError {
    /// Creates an unavailability error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a request failure without an underlying cause.
    pub fn failed(context: impl Into<String>) -> Self {
        Self::Failed {
            context: context.into(),
            source: None,
        }
    }

    /// Creates a request failure wrapping an underlying cause.
    pub fn failed_with<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Failed {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Classification capability consumed by the organizer.
///
/// Implementations receive the item's display name, its notes, and its raw
/// stored URI strings. They must never receive - and never need -
/// credential material.
pub trait ItemClassifier {
    /// Maps an item to a category label.
    fn categorize(&self, name: &str, notes: &str, uris: &[String])
        -> Result<String, ClassifierError>;

    /// Proposes a display name for the item.
    fn suggest_name(
        &self,
        name: &str,
        notes: &str,
        uris: &[String],
    ) -> Result<String, ClassifierError>;

    /// Produces lowercase tags for the item.
    fn generate_tags(
        &self,
        name: &str,
        category: &str,
        notes: &str,
        uris: &[String],
    ) -> Result<BTreeSet<String>, ClassifierError>;
}

/// The builtin classifier backed by the ordered pattern rules.
///
/// Infallible in practice: every request normalizes the URIs itself and
/// falls through to the `General` default when nothing matches.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    ruleset: Ruleset,
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleClassifier {
    /// Creates a rule classifier with the builtin ruleset.
    pub fn new() -> Self {
        Self {
            ruleset: Ruleset::builtin().clone(),
        }
    }

    /// Creates a rule classifier with a caller-provided ruleset.
    pub fn with_ruleset(ruleset: Ruleset) -> Self {
        Self { ruleset }
    }

    fn domains(uris: &[String]) -> Vec<String> {
        let mut domains = Vec::new();
        for uri in uris {
            if uri.is_empty() {
                continue;
            }
            if let Some(domain) = normalize_uri(uri) {
                if !domains.contains(&domain) {
                    domains.push(domain);
                }
            }
        }
        domains
    }
}

impl ItemClassifier for RuleClassifier {
    fn categorize(
        &self,
        _name: &str,
        _notes: &str,
        uris: &[String],
    ) -> Result<String, ClassifierError> {
        Ok(self.ruleset.classify(&Self::domains(uris)).category)
    }

    fn suggest_name(
        &self,
        name: &str,
        _notes: &str,
        uris: &[String],
    ) -> Result<String, ClassifierError> {
        Ok(naming::suggest_name(name, &Self::domains(uris)))
    }

    fn generate_tags(
        &self,
        _name: &str,
        category: &str,
        _notes: &str,
        uris: &[String],
    ) -> Result<BTreeSet<String>, ClassifierError> {
        let mut tags = self.ruleset.classify(&Self::domains(uris)).tags;
        tags.insert(category.to_lowercase());
        Ok(tags)
    }
}
