//! Enrichment worker pool
//!
//! Chunks run on the blocking pool; a semaphore caps how many are in flight.

use citeforge_common::errors::{AppError, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument};

use super::{EnrichmentContext, NotFoundReport};
use crate::model::Publication;

type ChunkResult = Result<(usize, Vec<Publication>, NotFoundReport)>;

/// Enrich a collection on `worker_count` concurrent blocking tasks
///
/// Output order matches input order regardless of completion order. The
/// first failing chunk aborts the run.
#[instrument(skip(publications, context), fields(publications = publications.len()))]
pub async fn enrich_parallel(
    publications: Vec<Publication>,
    context: Arc<EnrichmentContext>,
    worker_count: usize,
    chunk_size: usize,
) -> Result<(Vec<Publication>, NotFoundReport)> {
    let chunk_size = chunk_size.max(1);
    let semaphore = Arc::new(Semaphore::new(worker_count.max(1)));

    let mut chunks = Vec::with_capacity(publications.len().div_ceil(chunk_size));
    let mut remaining = publications.into_iter();
    loop {
        let chunk: Vec<Publication> = remaining.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }
        chunks.push(chunk);
    }
    let chunk_count = chunks.len();

    info!(chunk_count, chunk_size, worker_count, "Dispatching enrichment chunks");

    let mut join_set: JoinSet<ChunkResult> = JoinSet::new();
    for (chunk_index, mut chunk) in chunks.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| AppError::Internal {
                message: format!("Worker pool closed: {e}"),
            })?;
        let context = Arc::clone(&context);

        join_set.spawn_blocking(move || {
            let _permit = permit;
            let report = context.enrich_all(&mut chunk)?;
            Ok((chunk_index, chunk, report))
        });
    }

    let mut slots: Vec<Option<Vec<Publication>>> = (0..chunk_count).map(|_| None).collect();
    let mut report = NotFoundReport::default();
    while let Some(joined) = join_set.join_next().await {
        let (chunk_index, chunk, chunk_report) = joined.map_err(|e| AppError::Internal {
            message: format!("Enrichment task failed: {e}"),
        })??;
        debug!(chunk_index, publications = chunk.len(), "Chunk finished");
        report.merge(chunk_report);
        slots[chunk_index] = Some(chunk);
    }

    let enriched: Vec<Publication> = slots.into_iter().flatten().flatten().collect();
    Ok((enriched, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::EnrichmentConfig;
    use crate::model::{Relation, TermCounts};
    use crate::scoring::DocumentFrequencyConfig;

    fn collection(n: usize) -> Vec<Publication> {
        (0..n)
            .map(|i| {
                let refs = vec![((i + 1) % n).to_string(), format!("missing-{i}")];
                let terms: TermCounts = [(format!("term{}", i % 4), 1), ("shared".to_string(), 1)]
                    .into_iter()
                    .collect();
                let mut publication = Publication::new(i.to_string(), refs);
                publication.term_frequencies = terms;
                publication
            })
            .collect()
    }

    fn context(publications: &[Publication]) -> Arc<EnrichmentContext> {
        Arc::new(EnrichmentContext::from_publications(
            publications,
            &DocumentFrequencyConfig::default(),
            &EnrichmentConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        let publications = collection(23);
        let ctx = context(&publications);

        let mut sequential = publications.clone();
        let sequential_report = ctx.enrich_all(&mut sequential).unwrap();

        let (parallel, parallel_report) =
            enrich_parallel(publications, Arc::clone(&ctx), 3, 4).await.unwrap();

        assert_eq!(parallel, sequential);
        assert_eq!(parallel_report, sequential_report);
        assert_eq!(parallel_report.count(Relation::Referenced), 23);
    }

    #[tokio::test]
    async fn test_parallel_preserves_order() {
        let publications = collection(10);
        let ids: Vec<String> = publications.iter().map(|p| p.id.clone()).collect();
        let ctx = context(&publications);

        let (enriched, _) = enrich_parallel(publications, ctx, 8, 1).await.unwrap();
        let enriched_ids: Vec<String> = enriched.iter().map(|p| p.id.clone()).collect();
        assert_eq!(enriched_ids, ids);
    }

    #[tokio::test]
    async fn test_parallel_empty_collection() {
        let ctx = context(&[]);
        let (enriched, report) = enrich_parallel(Vec::new(), ctx, 4, 16).await.unwrap();
        assert!(enriched.is_empty());
        assert!(report.is_empty());
    }

    #[test]
    fn test_zero_workers_and_chunk_size_are_clamped() {
        let publications = collection(5);
        let ctx = context(&publications);
        let (enriched, _) = tokio_test::block_on(enrich_parallel(publications, ctx, 0, 0)).unwrap();
        assert_eq!(enriched.len(), 5);
    }
}
