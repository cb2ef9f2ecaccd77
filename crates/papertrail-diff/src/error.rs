//! Error types for the diff crate.

use papertrail_types::TypeError;

/// Errors that can occur during a document diff.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiffError {
    /// An input document failed validation; no diff work was done.
    #[error("invalid document: {0}")]
    Validation(#[from] TypeError),

    /// The aligner produced an inconsistent result. This is a bug in the
    /// aligner, reported instead of dropping sections.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DiffError {
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InternalInvariant(message.into())
    }
}

/// Convenience alias for diff engine results.
pub type EngineResult<T> = Result<T, DiffError>;
