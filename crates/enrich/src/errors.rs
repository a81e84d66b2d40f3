//! Enrichment runner error types

use citeforge_common::errors::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid record in {path}: {source}")]
    InvalidRecord {
        path: String,
        #[source]
        source: AppError,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Pipeline(#[from] AppError),
}

impl RunError {
    /// Underlying library error, if the failure came from the graph pipeline
    pub fn app_error(&self) -> Option<&AppError> {
        match self {
            RunError::InvalidRecord { source, .. } => Some(source),
            RunError::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}
