//! Error types for CiteForge
//!
//! Provides the error taxonomy shared by the graph library and the batch runner:
//! - Distinct error types for different failure modes
//! - Machine-readable error codes
//! - Severity-aware logging

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Input errors (1xxx)
    MalformedRecord,
    MissingField,
    DuplicateId,
    InvalidParameter,

    // Lookup errors (4xxx)
    PublicationNotFound,

    // Scoring errors (7xxx)
    DegenerateScoring,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
    IoError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Input (1xxx)
            ErrorCode::MalformedRecord => 1001,
            ErrorCode::MissingField => 1002,
            ErrorCode::DuplicateId => 1003,
            ErrorCode::InvalidParameter => 1004,

            // Lookup (4xxx)
            ErrorCode::PublicationNotFound => 4001,

            // Scoring (7xxx)
            ErrorCode::DegenerateScoring => 7001,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
            ErrorCode::IoError => 9004,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Input errors
    #[error(
        "Malformed record at index {index}{}: {message}",
        .id.as_deref().map(|id| format!(" (id {id})")).unwrap_or_default()
    )]
    MalformedRecord {
        index: usize,
        id: Option<String>,
        message: String,
    },

    #[error("Required field missing at index {index}: {field}")]
    MissingField { index: usize, field: String },

    #[error("Duplicate publication id: {id}")]
    DuplicateId { id: String },

    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    // Lookup errors
    #[error("Publication not found: {id}")]
    PublicationNotFound { id: String },

    // Scoring errors
    #[error(
        "Degenerate scoring input for term '{term}': document frequency {document_frequency} over {num_documents} documents"
    )]
    DegenerateScoring {
        term: String,
        document_frequency: usize,
        num_documents: usize,
    },

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::MalformedRecord { .. } => ErrorCode::MalformedRecord,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::DuplicateId { .. } => ErrorCode::DuplicateId,
            AppError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            AppError::PublicationNotFound { .. } => ErrorCode::PublicationNotFound,
            AppError::DegenerateScoring { .. } => ErrorCode::DegenerateScoring,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Io(_) => ErrorCode::IoError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Input and scoring errors point at bad data rather than a broken run
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            AppError::MalformedRecord { .. }
                | AppError::MissingField { .. }
                | AppError::DuplicateId { .. }
                | AppError::PublicationNotFound { .. }
                | AppError::DegenerateScoring { .. }
        )
    }

    /// Check if this error should abort a batch run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AppError::PublicationNotFound { .. })
    }

    /// Log the error at a level matching its severity
    pub fn log(&self) {
        let code = self.code();
        if self.is_fatal() {
            tracing::error!(
                error = %self,
                code = ?code,
                numeric_code = code.as_code(),
                "Fatal error"
            );
        } else {
            tracing::warn!(
                error = %self,
                code = ?code,
                numeric_code = code.as_code(),
                "Recoverable error"
            );
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string()
        }
    }
}
