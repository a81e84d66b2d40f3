//! CiteForge Common Library
//!
//! Shared code for the CiteForge crates including:
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of terms kept per combined-terms field
pub const DEFAULT_TOP_K: usize = 10;

/// Default upper bound on the fraction of documents a term may appear in
pub const DEFAULT_MAX_DOCUMENT_FRACTION: f64 = 1.0 / 3.0;
