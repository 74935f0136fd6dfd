//! Core data structures and organization pipeline for vaultsort.
//!
//! This crate provides the types and logic shared between the organizer and
//! validator binaries: the export document model, the classification and
//! organization pipeline, and the post-hoc diff validator.
//!
//! # Security Guarantees
//! - Usernames, passwords, and TOTP secrets are never read for
//!   decision-making, never logged, and never altered or dropped
//! - No network communication; the pipeline is fully offline
//! - No decryption or encryption of vault contents
//!
//! # Architecture
//! The pipeline is strictly sequential: each item is processed to completion
//! before the next begins, and the shared folder/collection registries rely
//! on that ordering. Classification goes through a capability trait so an
//! externally-assisted implementation can replace the builtin rules, with
//! rule fallback on failure.

pub mod error;
pub mod logging;
pub mod models;
pub mod organize;
pub mod validation;

// Re-export commonly used types
pub use error::{Result, VaultSortError};
pub use logging::init_logging;
pub use models::{
    Collection, CustomField, Export, Folder, Item, Login, LoginUri, VaultKind,
};
pub use organize::{
    CategoryRule, Classification, ClassifierError, ExportOrganizer, ItemClassifier,
    OrganizerConfig, RuleClassifier, Ruleset,
};
pub use validation::{ValidationReport, validate_exports};
