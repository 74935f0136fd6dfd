//! Export organization pipeline.
//!
//! This module turns a flat Bitwarden export into an organized one:
//! - **Domains**: extract and normalize registrable domains from stored URIs
//! - **Classification**: map domains to a category and tag set via ordered
//!   pattern rules
//! - **Naming**: replace generic display names with domain-derived ones
//! - **Registry**: find-or-create folders (personal vaults) or collections
//!   (organization exports) by category name
//!
//! # Security Guarantees
//! - Items are cloned before any mutation; the input document is never touched
//! - Only names, notes, custom fields, and folder/collection references are
//!   written; credential material passes through untouched
//!
//! # Example
//! ```rust,ignore
//! use vaultsort_core::organize::{ExportOrganizer, OrganizerConfig};
//!
//! let organizer = ExportOrganizer::new(OrganizerConfig::default());
//! let organized = organizer.organize_export(&export)?;
//! ```

mod assist;
mod config;
mod domains;
mod naming;
mod organizer;
mod registry;
mod rules;

// Re-export public API
pub use assist::{ClassifierError, ItemClassifier, RuleClassifier};
pub use config::OrganizerConfig;
pub use organizer::ExportOrganizer;
pub use rules::{CategoryRule, Classification, Ruleset};
