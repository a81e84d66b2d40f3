//! Enrichment pipeline
//!
//! Runs the stages in order over one in-memory collection:
//! 1. Citation index (dangling ids dropped, referencing works derived)
//! 2. Co-reference inference and relation unions
//! 3. Document frequency over the collection
//! 4. Parallel per-publication enrichment

use citeforge_common::config::AppConfig;
use citeforge_common::errors::{AppError, Result};
use citeforge_common::metrics::{self, StageTimer};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::citation::{CitationIndex, CoReferenceConfig, CoReferenceEngine, CoRelation};
use crate::enrichment::{enrich_parallel, EnrichmentConfig, EnrichmentContext, NotFoundReport};
use crate::model::{ExportRecord, Publication};
use crate::scoring::DocumentFrequencyConfig;

/// Pipeline parameters
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub document_frequency: DocumentFrequencyConfig,
    pub coreference: CoReferenceConfig,
    pub enrichment: EnrichmentConfig,
    /// Concurrent enrichment tasks
    pub worker_count: usize,
    /// Publications per enrichment task
    pub chunk_size: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            document_frequency: DocumentFrequencyConfig::default(),
            coreference: CoReferenceConfig::default(),
            enrichment: EnrichmentConfig::default(),
            worker_count: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            chunk_size: 256,
        }
    }
}

impl From<&AppConfig> for PipelineOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            document_frequency: DocumentFrequencyConfig::from(&config.scoring),
            coreference: CoReferenceConfig::from(&config.coreference),
            enrichment: EnrichmentConfig::from(&config.scoring),
            worker_count: config.effective_worker_count(),
            chunk_size: config.workers.chunk_size,
        }
    }
}

/// Figures reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineStats {
    pub publications: usize,
    pub citations: usize,
    pub dangling_dropped: usize,
    pub co_referencing_links: usize,
    pub co_referenced_links: usize,
    pub document_frequency_terms: usize,
    pub unresolved_ids: usize,
    pub index_seconds: f64,
    pub coreference_seconds: f64,
    pub document_frequency_seconds: f64,
    pub enrichment_seconds: f64,
}

/// Enriched collection plus run diagnostics
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub publications: Vec<Publication>,
    pub not_found: NotFoundReport,
    pub stats: PipelineStats,
}

impl PipelineOutput {
    /// Look up an enriched publication by id
    pub fn get(&self, id: &str) -> Result<&Publication> {
        self.publications
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::PublicationNotFound { id: id.to_string() })
    }

    /// Narrow every publication to the index-loader projection
    pub fn export_records(&self) -> Vec<ExportRecord> {
        self.publications.iter().map(ExportRecord::from).collect()
    }
}

/// Citation-graph enrichment pipeline
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run every stage, enriching on the tokio blocking pool
    #[instrument(skip(self, publications), fields(publications = publications.len()))]
    pub async fn run(&self, mut publications: Vec<Publication>) -> Result<PipelineOutput> {
        let (context, mut stats) = self.prepare(&mut publications)?;

        let timer = StageTimer::start("enrichment");
        let (publications, not_found) = enrich_parallel(
            publications,
            Arc::new(context),
            self.options.worker_count,
            self.options.chunk_size,
        )
        .await?;
        stats.enrichment_seconds = timer.finish();

        Ok(Self::finish(publications, not_found, stats))
    }

    /// Run every stage on the calling thread
    #[instrument(skip(self, publications), fields(publications = publications.len()))]
    pub fn run_blocking(&self, mut publications: Vec<Publication>) -> Result<PipelineOutput> {
        let (context, mut stats) = self.prepare(&mut publications)?;

        let timer = StageTimer::start("enrichment");
        let not_found = context.enrich_all(&mut publications)?;
        stats.enrichment_seconds = timer.finish();

        Ok(Self::finish(publications, not_found, stats))
    }

    /// Sequential stages; must complete before enrichment fans out
    fn prepare(
        &self,
        publications: &mut [Publication],
    ) -> Result<(EnrichmentContext, PipelineStats)> {
        let mut stats = PipelineStats {
            publications: publications.len(),
            ..Default::default()
        };

        let timer = StageTimer::start("index");
        let index = CitationIndex::build(publications)?;
        stats.index_seconds = timer.finish();
        stats.citations = index.edge_count();
        stats.dangling_dropped = index.dangling_dropped();
        metrics::record_index(index.node_count(), index.dangling_dropped());

        let timer = StageTimer::start("coreference");
        let engine = CoReferenceEngine::infer(&index, &self.options.coreference);
        engine.apply(&index, publications);
        for publication in publications.iter_mut() {
            publication.refresh_derived_relations();
        }
        stats.coreference_seconds = timer.finish();
        stats.co_referencing_links = engine.link_count(CoRelation::CoReferencing);
        stats.co_referenced_links = engine.link_count(CoRelation::CoReferenced);

        let timer = StageTimer::start("document_frequency");
        let context = EnrichmentContext::from_publications(
            publications,
            &self.options.document_frequency,
            &self.options.enrichment,
        );
        stats.document_frequency_seconds = timer.finish();
        stats.document_frequency_terms = context.document_frequency().len();
        metrics::record_document_frequency(stats.document_frequency_terms);

        Ok((context, stats))
    }

    fn finish(
        publications: Vec<Publication>,
        not_found: NotFoundReport,
        mut stats: PipelineStats,
    ) -> PipelineOutput {
        not_found.log_summary();
        metrics::record_enrichment(publications.len(), &not_found.counts());
        stats.unresolved_ids = not_found.total();

        info!(
            publications = stats.publications,
            citations = stats.citations,
            dangling_dropped = stats.dangling_dropped,
            co_referencing_links = stats.co_referencing_links,
            co_referenced_links = stats.co_referenced_links,
            document_frequency_terms = stats.document_frequency_terms,
            unresolved_ids = stats.unresolved_ids,
            "Pipeline finished"
        );

        PipelineOutput {
            publications,
            not_found,
            stats,
        }
    }
}
