//! CiteForge Enrichment Runner
//!
//! Batch job over fetched catalog records:
//! 1. Loads and merges the configured publication lists
//! 2. Builds the citation and co-reference relations
//! 3. Ranks the discriminative terms of every relation neighbourhood
//! 4. Writes the enriched collection and the search-index export

mod errors;
mod runner;
mod store;

use anyhow::Context;
use citeforge_common::config::{AppConfig, ObservabilityConfig};
use citeforge_common::{metrics, VERSION};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::runner::Runner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration, from an explicit file when APP_CONFIG_FILE is set
    let config = match std::env::var("APP_CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path),
        Err(_) => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    // Initialize tracing
    init_tracing(&config.observability);

    info!(
        service = %config.observability.service_name,
        "Starting CiteForge enrichment v{}",
        VERSION
    );

    config.validate().map_err(|e| {
        e.log();
        e
    })?;

    metrics::register_metrics();

    match Runner::new(config).run().await {
        Ok(summary) => {
            info!(
                publications = summary.stats.publications,
                unresolved_ids = summary.stats.unresolved_ids,
                consistent = summary.consistency.is_consistent(),
                "Done"
            );
            Ok(())
        }
        Err(e) => {
            match e.app_error() {
                Some(app_error) => app_error.log(),
                None => error!(error = %e, "Enrichment run failed"),
            }
            Err(e.into())
        }
    }
}

fn init_tracing(config: &ObservabilityConfig) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}
