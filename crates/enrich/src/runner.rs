//! Batch enrichment run
//!
//! Wires the graph pipeline to files:
//! 1. Load every configured input list
//! 2. Merge them into one deduplicated collection
//! 3. Run the pipeline and check the result
//! 4. Write the enriched collection, the export projection and a run summary

use chrono::{DateTime, Utc};
use citeforge_common::config::AppConfig;
use citeforge_common::VERSION;
use citeforge_graph::collection::{self, IngestOptions};
use citeforge_graph::consistency::{self, ConsistencyReport};
use citeforge_graph::{NotFoundReport, Pipeline, PipelineOptions, PipelineStats};
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument};

use crate::errors::RunError;
use crate::store;

/// What one run did, written next to the outputs
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub version: &'static str,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input_paths: Vec<String>,
    pub loaded: usize,
    pub stats: PipelineStats,
    pub not_found: NotFoundReport,
    pub consistency: ConsistencyReport,
}

pub struct Runner {
    config: AppConfig,
}

impl Runner {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self), fields(inputs = self.config.pipeline.input_paths.len()))]
    pub async fn run(&self) -> Result<RunSummary, RunError> {
        let started_at = Utc::now();
        let settings = &self.config.pipeline;

        let mut sources = Vec::with_capacity(settings.input_paths.len());
        for path in &settings.input_paths {
            sources.push(store::load_publications(Path::new(path))?);
        }
        let loaded: usize = sources.iter().map(Vec::len).sum();

        let publications = collection::collect_unique(sources, &IngestOptions::from(settings));

        let pipeline = Pipeline::new(PipelineOptions::from(&self.config));
        let output = pipeline.run(publications).await?;

        let consistency = consistency::check(&output.publications);
        consistency.log();

        store::write_json(Path::new(&settings.output_path), &output.publications)?;
        if let Some(export_path) = &settings.export_path {
            store::write_json(Path::new(export_path), &output.export_records())?;
        }

        let summary = RunSummary {
            version: VERSION,
            started_at,
            finished_at: Utc::now(),
            input_paths: settings.input_paths.clone(),
            loaded,
            stats: output.stats,
            not_found: output.not_found,
            consistency,
        };

        if let Some(summary_path) = &settings.summary_path {
            store::write_json(Path::new(summary_path), &summary)?;
        }

        info!(
            loaded,
            publications = summary.stats.publications,
            elapsed_ms = (summary.finished_at - summary.started_at).num_milliseconds(),
            "Enrichment run complete"
        );

        Ok(summary)
    }
}
