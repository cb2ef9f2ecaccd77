use thiserror::Error;

/// Errors produced while reading or validating documents.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    /// The document is missing a required field or has the wrong shape.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid JSON: {0}")]
    Json(String),
}

impl TypeError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<serde_json::Error> for TypeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

/// Convenience alias for document operations.
pub type TypeResult<T> = Result<T, TypeError>;
