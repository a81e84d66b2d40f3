//! Configuration management for CiteForge
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml, config/local.toml)
//! - Default values

use crate::errors::{AppError, Result};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Input/output locations and ingestion behaviour
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// TF-IDF and document-frequency parameters
    #[serde(default)]
    pub scoring: ScoringSettings,

    /// Co-reference inference parameters
    #[serde(default)]
    pub coreference: CoReferenceSettings,

    /// Worker pool sizing for the enrichment fan-out
    #[serde(default)]
    pub workers: WorkerSettings,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineSettings {
    /// JSON files holding fetched publication lists, merged in order
    #[serde(default = "default_input_paths")]
    pub input_paths: Vec<String>,

    /// Where the fully enriched collection is written
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Where the narrowed index-loader projection is written (None to skip)
    #[serde(default = "default_export_path")]
    pub export_path: Option<String>,

    /// Catalog URL prefix stripped from ids and referenced ids
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// Derive baseline term frequencies from title/abstract when a record has none
    #[serde(default = "default_derive_missing_terms")]
    pub derive_missing_terms: bool,

    /// Where the run summary is written (None to skip)
    #[serde(default)]
    pub summary_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoringSettings {
    /// Number of terms kept per combined-terms field
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Terms found in fewer documents than this are dropped from the document-frequency table
    #[serde(default = "default_min_document_count")]
    pub min_document_count: usize,

    /// Terms found in more than this fraction of documents are dropped
    #[serde(default = "default_max_document_fraction")]
    pub max_document_fraction: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoReferenceSettings {
    /// Shared neighbours required before two publications are linked
    #[serde(default = "default_min_shared_neighbors")]
    pub min_shared_neighbors: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerSettings {
    /// Concurrent enrichment tasks (0 = available parallelism)
    #[serde(default)]
    pub worker_count: usize,

    /// Publications handed to one task
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error) or a full EnvFilter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logging: bool,

    /// Service name attached to log lines
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_input_paths() -> Vec<String> { vec!["publications.json".to_string()] }
fn default_output_path() -> String { "enriched_publications.json".to_string() }
fn default_export_path() -> Option<String> { Some("publications_export.json".to_string()) }
fn default_id_prefix() -> String { "https://openalex.org/".to_string() }
fn default_derive_missing_terms() -> bool { true }
fn default_top_k() -> usize { crate::DEFAULT_TOP_K }
fn default_min_document_count() -> usize { 2 }
fn default_max_document_fraction() -> f64 { crate::DEFAULT_MAX_DOCUMENT_FRACTION }
fn default_min_shared_neighbors() -> usize { 1 }
fn default_chunk_size() -> usize { 256 }
fn default_log_level() -> String { "info".to_string() }
fn default_service_name() -> String { "citeforge".to_string() }

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            input_paths: default_input_paths(),
            output_path: default_output_path(),
            export_path: default_export_path(),
            id_prefix: default_id_prefix(),
            derive_missing_terms: default_derive_missing_terms(),
            summary_path: None,
        }
    }
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_document_count: default_min_document_count(),
            max_document_fraction: default_max_document_fraction(),
        }
    }
}

impl Default for CoReferenceSettings {
    fn default() -> Self {
        Self {
            min_shared_neighbors: default_min_shared_neighbors(),
        }
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            worker_count: 0,
            chunk_size: default_chunk_size(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: false,
            service_name: default_service_name(),
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix("APP")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("pipeline.input_paths")
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> std::result::Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SCORING__TOP_K=20
            .add_source(environment())
            .build()?;

        config.try_deserialize()
    }

    /// Load from an explicit config file, still honouring `APP__` overrides
    pub fn from_file(path: &str) -> std::result::Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(environment())
            .build()?;

        config.try_deserialize()
    }

    /// Reject parameter combinations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.scoring.top_k == 0 {
            return Err(invalid("scoring.top_k", "must be at least 1"));
        }
        let fraction = self.scoring.max_document_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(invalid(
                "scoring.max_document_fraction",
                &format!("must be in (0, 1], got {}", fraction),
            ));
        }
        if self.coreference.min_shared_neighbors == 0 {
            return Err(invalid("coreference.min_shared_neighbors", "must be at least 1"));
        }
        if self.workers.chunk_size == 0 {
            return Err(invalid("workers.chunk_size", "must be at least 1"));
        }
        if self.pipeline.input_paths.is_empty() {
            return Err(invalid("pipeline.input_paths", "at least one input file is required"));
        }
        Ok(())
    }

    /// Resolve the worker count, falling back to the machine's parallelism
    pub fn effective_worker_count(&self) -> usize {
        if self.workers.worker_count > 0 {
            return self.workers.worker_count;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

fn invalid(name: &str, message: &str) -> AppError {
    AppError::InvalidParameter {
        name: name.to_string(),
        message: message.to_string(),
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineSettings::default(),
            scoring: ScoringSettings::default(),
            coreference: CoReferenceSettings::default(),
            workers: WorkerSettings::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.scoring.top_k, 10);
        assert_eq!(config.scoring.min_document_count, 2);
        assert!((config.scoring.max_document_fraction - 1.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(config.coreference.min_shared_neighbors, 1);
        assert_eq!(config.pipeline.id_prefix, "https://openalex.org/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_fraction() {
        let mut config = AppConfig::default();
        config.scoring.max_document_fraction = 0.0;
        assert!(matches!(
            config.validate(),
            Err(AppError::InvalidParameter { ref name, .. })
                if name == "scoring.max_document_fraction"
        ));

        config.scoring.max_document_fraction = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let mut config = AppConfig::default();
        config.scoring.top_k = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.workers.chunk_size = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.coreference.min_shared_neighbors = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_worker_count_fallback() {
        let mut config = AppConfig::default();
        assert!(config.effective_worker_count() >= 1);
        config.workers.worker_count = 3;
        assert_eq!(config.effective_worker_count(), 3);
    }

    #[test]
    fn test_from_file_reads_explicit_path() {
        let path = std::env::temp_dir()
            .join(format!("citeforge-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[scoring]\ntop_k = 3\n\n[pipeline]\ninput_paths = [\"base.json\", \"cited.json\"]\n",
        )
        .unwrap();

        let config = AppConfig::from_file(&path.to_string_lossy()).unwrap();
        assert_eq!(config.scoring.top_k, 3);
        assert_eq!(config.pipeline.input_paths, vec!["base.json", "cited.json"]);
        assert_eq!(config.workers.chunk_size, 256);

        std::fs::remove_file(&path).ok();
        assert!(AppConfig::from_file(&path.to_string_lossy()).is_err());
    }

    #[test]
    fn test_partial_sections_deserialize_with_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"scoring": {"top_k": 5}}"#).unwrap();
        assert_eq!(config.scoring.top_k, 5);
        assert_eq!(config.scoring.min_document_count, 2);
        assert_eq!(config.workers.chunk_size, 256);
    }
}
