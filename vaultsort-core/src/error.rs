//! Error types for export organization.
//!
//! Error messages reference items by position and display name only.
//! Usernames, passwords, and TOTP secrets never appear in error output,
//! logs, or any other diagnostic surface.

use thiserror::Error;

/// Main error type for vaultsort operations.
#[derive(Debug, Error)]
pub enum VaultSortError {
    /// Input document is not a usable Bitwarden export
    #[error("Malformed export: {message}")]
    MalformedExport { message: String },

    /// Configuration or CLI argument error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A single item could not be organized
    #[error("Failed to organize item at index {index}: {context}")]
    ItemProcessing { index: usize, context: String },

    /// An assisting classifier failed and rule fallback was disabled
    #[error("Classifier failed: {context}")]
    Classifier {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with `VaultSortError`
pub type Result<T> = std::result::Result<T, VaultSortError>;

impl VaultSortError {
    /// Creates a malformed-export error.
    ///
    /// Raised before any processing begins; no partially organized
    /// document is ever produced alongside this error.
    pub fn malformed_export(message: impl Into<String>) -> Self {
        Self::MalformedExport {
            message: message.into(),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a per-item processing error with positional context
    pub fn item_failed(index: usize, context: impl Into<String>) -> Self {
        Self::ItemProcessing {
            index,
            context: context.into(),
        }
    }

    /// Creates a classifier error from an assisting classifier's failure
    pub fn classifier_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Classifier {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an I/O error with path context
    pub fn io_failed(context: impl Into<String>, error: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source: error,
        }
    }

    /// Creates a (de)serialization error with context
    pub fn serialization_failed(context: impl Into<String>, error: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source: error,
        }
    }

    /// True when the export organizer may log this error and keep the
    /// original item instead of aborting the whole run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ItemProcessing { .. })
    }
}
