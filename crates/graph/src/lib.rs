//! CiteForge Graph Library
//!
//! Builds the citation graph of a publication collection and enriches every
//! publication with the most discriminative terms of its neighbourhood:
//! - Citation index (referenced / referencing works, dangling-id removal)
//! - Co-reference inference (co-referencing / co-referenced works)
//! - Term aggregation and exclusion
//! - Document frequency estimation and TF-IDF ranking
//! - Parallel per-publication enrichment
//!
//! The batch runner in `citeforge-enrich` wires these stages to JSON files;
//! everything here works on in-memory collections.

pub mod citation;
pub mod collection;
pub mod consistency;
pub mod enrichment;
pub mod model;
pub mod pipeline;
pub mod scoring;
pub mod terms;

pub use citation::{CitationIndex, CoReferenceConfig, CoReferenceEngine};
pub use enrichment::{EnrichmentConfig, EnrichmentContext, NotFoundReport};
pub use model::{
    CombinedTerms, ExportRecord, Publication, RankedTerms, Relation, ScoredTerm, TermCounts,
};
pub use pipeline::{Pipeline, PipelineOptions, PipelineOutput, PipelineStats};
pub use scoring::{DocumentFrequency, DocumentFrequencyConfig, TfIdfRanker};
