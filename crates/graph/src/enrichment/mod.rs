//! Per-publication term enrichment
//!
//! Every publication is scored independently against one shared, read-only
//! [`EnrichmentContext`]; the worker pool fans chunks of the collection out
//! over blocking tasks and stitches them back together in collection order.

mod context;
mod report;
mod worker;

pub use context::{Aggregation, EnrichmentContext};
pub use report::NotFoundReport;
pub use worker::enrich_parallel;

use citeforge_common::config::ScoringSettings;
use citeforge_common::DEFAULT_TOP_K;

/// Enrichment configuration
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// Terms kept per combined-terms field
    pub top_k: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K }
    }
}

impl From<&ScoringSettings> for EnrichmentConfig {
    fn from(settings: &ScoringSettings) -> Self {
        Self { top_k: settings.top_k }
    }
}
