//! Metrics and observability utilities
//!
//! Describes and records pipeline metrics through the `metrics` facade
//! with standardized naming conventions. Nothing is exported unless the
//! embedding application installs a recorder.

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit,
};
use std::time::Instant;

/// Metrics prefix for all CiteForge metrics
pub const METRICS_PREFIX: &str = "citeforge";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_gauge!(
        format!("{}_publications_indexed", METRICS_PREFIX),
        Unit::Count,
        "Publications in the working collection after ingestion"
    );

    describe_counter!(
        format!("{}_dangling_references_total", METRICS_PREFIX),
        Unit::Count,
        "Referenced ids dropped because they are not in the collection"
    );

    describe_counter!(
        format!("{}_duplicate_publications_total", METRICS_PREFIX),
        Unit::Count,
        "Publications skipped during ingestion because their id was already present"
    );

    describe_counter!(
        format!("{}_coreference_links_total", METRICS_PREFIX),
        Unit::Count,
        "Symmetric co-reference links created"
    );

    describe_counter!(
        format!("{}_publications_enriched_total", METRICS_PREFIX),
        Unit::Count,
        "Publications whose combined-terms fields were computed"
    );

    describe_counter!(
        format!("{}_unresolved_ids_total", METRICS_PREFIX),
        Unit::Count,
        "Relation ids that could not be resolved during enrichment"
    );

    describe_gauge!(
        format!("{}_document_frequency_terms", METRICS_PREFIX),
        Unit::Count,
        "Terms retained in the document-frequency table"
    );

    describe_histogram!(
        format!("{}_stage_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Pipeline stage latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// Helper to time a pipeline stage
pub struct StageTimer {
    start: Instant,
    stage: &'static str,
}

impl StageTimer {
    /// Start timing a stage
    pub fn start(stage: &'static str) -> Self {
        Self {
            start: Instant::now(),
            stage,
        }
    }

    /// Record stage completion and return the elapsed seconds
    pub fn finish(self) -> f64 {
        let duration = self.start.elapsed().as_secs_f64();

        histogram!(
            format!("{}_stage_duration_seconds", METRICS_PREFIX),
            "stage" => self.stage
        )
        .record(duration);

        tracing::debug!(stage = self.stage, duration_secs = duration, "Stage finished");
        duration
    }
}

/// Helper to record citation-index metrics
pub fn record_index(publications: usize, dangling_dropped: usize) {
    gauge!(format!("{}_publications_indexed", METRICS_PREFIX)).set(publications as f64);

    counter!(format!("{}_dangling_references_total", METRICS_PREFIX))
        .increment(dangling_dropped as u64);
}

/// Helper to record ingestion duplicates
pub fn record_duplicates(duplicates: usize) {
    counter!(format!("{}_duplicate_publications_total", METRICS_PREFIX))
        .increment(duplicates as u64);
}

/// Helper to record co-reference links for one relation
pub fn record_coreference(relation: &'static str, links: usize) {
    counter!(
        format!("{}_coreference_links_total", METRICS_PREFIX),
        "relation" => relation
    )
    .increment(links as u64);
}

/// Helper to record document-frequency table size
pub fn record_document_frequency(terms: usize) {
    gauge!(format!("{}_document_frequency_terms", METRICS_PREFIX)).set(terms as f64);
}

/// Helper to record enrichment metrics
pub fn record_enrichment(publications: usize, unresolved: &[(&'static str, usize)]) {
    counter!(format!("{}_publications_enriched_total", METRICS_PREFIX))
        .increment(publications as u64);

    for &(relation, count) in unresolved {
        counter!(
            format!("{}_unresolved_ids_total", METRICS_PREFIX),
            "relation" => relation
        )
        .increment(count as u64);
    }
}
