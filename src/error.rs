//! Error types for advisify

use thiserror::Error;

/// Errors that can occur while loading advisers or producing recommendations
#[derive(Debug, Error)]
pub enum AdvisifyError {
    /// A dataset row could not be parsed
    #[error("Data format error at line {line} ({field}): {message}")]
    DataFormat {
        line: u64,
        field: String,
        message: String,
    },

    /// Embedding lengths disagree across advisers or with the embedder
    #[error("Dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    /// Query carries neither a title nor a project type
    #[error("Empty query: enter a thesis title or select at least one project type")]
    InvalidQuery,

    /// Embedding model failure
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdvisifyError {
    /// Create a data format error
    pub fn data_format(line: u64, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataFormat {
            line,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(context: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context: context.into(),
            expected,
            found,
        }
    }

    /// Create an embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the caller should ask the user for different input
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidQuery)
    }

    /// Whether the failure is transient and the user may simply retry
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Embedding(_))
    }
}

/// Result type for advisify operations
pub type Result<T> = std::result::Result<T, AdvisifyError>;
