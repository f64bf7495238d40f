//! Error Handling
//!
//! Unified error types for the engine.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use screen_insight_core::CoreError;

/// Engine-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// A template references fields the context builder does not produce.
    /// Fatal to the request: no result is produced or recorded.
    #[error("Template '{template}' requires missing context fields: {}", .missing.join(", "))]
    TemplateFieldMissing {
        template: String,
        missing: Vec<String>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors from the shared core crate
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request was dropped before a result could be delivered
    #[error("Request cancelled: {0}")]
    Cancelled(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for engine errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a missing-template-field error
    pub fn template_field_missing(template: impl Into<String>, missing: Vec<String>) -> Self {
        Self::TemplateFieldMissing {
            template: template.into(),
            missing,
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a cancellation error
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
