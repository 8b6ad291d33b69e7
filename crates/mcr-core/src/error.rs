//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]` where configuration problems can surface.

use thiserror::Error;

/// The top-level error type for `mcr-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {field}: {message}")]
    Config { field: &'static str, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn config(field: &'static str, message: impl Into<String>) -> Self {
        CoreError::Config { field, message: message.into() }
    }
}

/// Shorthand result type for `mcr-core`.
pub type CoreResult<T> = Result<T, CoreError>;
