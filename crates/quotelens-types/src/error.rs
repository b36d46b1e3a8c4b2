//! Error types for quotelens.
//!
//! [`QuoteLensError`] separates fatal startup failures (configuration)
//! from per-request rejections (schema, validation). The HTTP layer uses
//! [`QuoteLensError::kind`] to pick a status code and never crashes on a
//! rejected record.

use thiserror::Error;

/// Top-level error type for quotelens.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum QuoteLensError {
    // ── Fatal ────────────────────────────────────────────────────────

    /// An artifact or configuration value is missing or malformed.
    ///
    /// Raised while loading the artifact bundle (prevents serving) and by
    /// the pipeline when an artifact it needs is absent.
    #[error("configuration error: {reason}")]
    Configuration {
        /// What is wrong with the configuration or artifact.
        reason: String,
    },

    // ── Per-request ──────────────────────────────────────────────────

    /// The uploaded record is missing an expected column.
    #[error("schema error: missing field '{field}'")]
    Schema {
        /// Name of the missing field.
        field: String,
    },

    /// A field failed a format check (unparseable date, non-numeric value).
    #[error("validation error: field '{field}': {reason}")]
    Validation {
        /// Name of the offending field.
        field: String,
        /// Human-readable description of the failure.
        reason: String,
    },

    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QuoteLensError {
    /// Shorthand for [`QuoteLensError::Configuration`].
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`QuoteLensError::Schema`].
    pub fn schema(field: impl Into<String>) -> Self {
        Self::Schema {
            field: field.into(),
        }
    }

    /// Shorthand for [`QuoteLensError::Validation`].
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Schema { .. } => "schema",
            Self::Validation { .. } => "validation",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }

    /// Whether the error rejects a single request rather than the process.
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::Schema { .. } | Self::Validation { .. })
    }
}

/// A convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, QuoteLensError>;
