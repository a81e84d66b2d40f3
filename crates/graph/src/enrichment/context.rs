//! Shared enrichment context
//!
//! Read-only state every enrichment worker needs: the id -> term lookup, the
//! document-frequency table of the collection and the ranker.

use citeforge_common::errors::Result;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::{EnrichmentConfig, NotFoundReport};
use crate::model::{Publication, Relation, TermCounts};
use crate::scoring::{DocumentFrequency, DocumentFrequencyConfig, TfIdfRanker};
use crate::terms;

/// Terms summed over the resolvable ids of one relation list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub terms: TermCounts,
    pub found: Vec<String>,
    pub not_found: Vec<String>,
}

/// Immutable after construction; shared between workers behind an `Arc`
#[derive(Debug, Clone)]
pub struct EnrichmentContext {
    lookup: HashMap<String, TermCounts>,
    document_frequency: DocumentFrequency,
    ranker: TfIdfRanker,
}

impl EnrichmentContext {
    pub fn new(
        lookup: HashMap<String, TermCounts>,
        document_frequency: DocumentFrequency,
        config: &EnrichmentConfig,
    ) -> Self {
        Self {
            lookup,
            document_frequency,
            ranker: TfIdfRanker::new(config.top_k),
        }
    }

    /// Build the lookup and the document-frequency table from the collection itself
    pub fn from_publications(
        publications: &[Publication],
        df_config: &DocumentFrequencyConfig,
        config: &EnrichmentConfig,
    ) -> Self {
        let document_frequency = DocumentFrequency::estimate(
            publications.iter().map(|p| &p.term_frequencies),
            publications.len(),
            df_config,
        );
        let lookup = publications
            .iter()
            .map(|p| (p.id.clone(), p.term_frequencies.clone()))
            .collect();
        Self::new(lookup, document_frequency, config)
    }

    pub fn document_frequency(&self) -> &DocumentFrequency {
        &self.document_frequency
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lookup.contains_key(id)
    }

    /// Sum the term maps of every known id in `ids`
    pub fn aggregate(&self, ids: &[String]) -> Aggregation {
        let mut aggregation = Aggregation::default();
        for id in ids {
            match self.lookup.get(id) {
                Some(counts) => {
                    terms::combine_into(&mut aggregation.terms, counts);
                    aggregation.found.push(id.clone());
                }
                None => aggregation.not_found.push(id.clone()),
            }
        }
        aggregation
    }

    /// Aggregated neighbourhood terms per relation, minus the publication's own terms
    pub fn combined_counts(&self, publication: &Publication) -> BTreeMap<Relation, TermCounts> {
        Relation::ALL
            .iter()
            .map(|&relation| {
                let aggregation = self.aggregate(relation.ids(publication));
                (relation, terms::exclude(&aggregation.terms, &publication.term_frequencies))
            })
            .collect()
    }

    /// Enrich one publication in place
    ///
    /// Unknown ids are removed from the four primary relation lists and
    /// returned; the unions and counts are rebuilt from the trimmed lists
    /// before the six rankings are computed.
    pub fn process_publication(&self, publication: &mut Publication) -> Result<NotFoundReport> {
        let mut report = NotFoundReport::default();

        for relation in Relation::PRIMARY {
            let ids = relation.ids_mut(publication);
            if ids.iter().all(|id| self.contains(id)) {
                continue;
            }
            let (found, missing): (Vec<String>, Vec<String>) =
                std::mem::take(ids).into_iter().partition(|id| self.contains(id));
            *ids = found;
            report.record(relation, missing);
        }

        publication.refresh_derived_relations();

        for (relation, counts) in self.combined_counts(publication) {
            let ranked = self.ranker.rank(&counts, &self.document_frequency)?;
            publication.combined_terms.set(relation, ranked);
        }

        Ok(report)
    }

    /// Enrich a slice of publications sequentially
    pub fn enrich_all(&self, publications: &mut [Publication]) -> Result<NotFoundReport> {
        let mut report = NotFoundReport::default();
        for publication in publications.iter_mut() {
            report.merge(self.process_publication(publication)?);
        }
        debug!(publications = publications.len(), missing = report.total(), "Chunk enriched");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> TermCounts {
        pairs.iter().map(|(t, c)| (t.to_string(), *c)).collect()
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn context(lookup: &[(&str, TermCounts)]) -> EnrichmentContext {
        let lookup = lookup.iter().map(|(id, c)| (id.to_string(), c.clone())).collect();
        let df = DocumentFrequency::from_counts(
            [("apple", 2), ("banana", 3), ("cherry", 1), ("date", 4), ("fig", 2)],
            12,
        );
        EnrichmentContext::new(lookup, df, &EnrichmentConfig::default())
    }

    #[test]
    fn test_aggregate_sums_known_ids() {
        let ctx = context(&[
            ("1", counts(&[("apple", 3), ("banana", 2)])),
            ("2", counts(&[("banana", 4), ("cherry", 6)])),
        ]);
        let aggregation = ctx.aggregate(&ids(&["1", "2", "404"]));

        assert_eq!(aggregation.terms, counts(&[("apple", 3), ("banana", 6), ("cherry", 6)]));
        assert_eq!(aggregation.found, vec!["1", "2"]);
        assert_eq!(aggregation.not_found, vec!["404"]);
    }

    #[test]
    fn test_combined_counts_per_relation() {
        let ctx = context(&[
            ("1", counts(&[("apple", 1), ("banana", 1)])),
            ("2", counts(&[("banana", 2), ("cherry", 1)])),
            ("3", counts(&[("date", 5)])),
            ("4", counts(&[("fig", 1), ("apple", 2)])),
        ]);
        let mut publication = Publication::new("0", ids(&["1", "2"])).with_terms([("banana", 9)]);
        publication.referencing_works = ids(&["3"]);
        publication.co_referenced_works = ids(&["4"]);
        publication.co_referencing_works = ids(&["1"]);
        publication.refresh_derived_relations();

        let combined = ctx.combined_counts(&publication);
        assert_eq!(combined[&Relation::Referenced], counts(&[("apple", 1), ("cherry", 1)]));
        assert_eq!(combined[&Relation::Referencing], counts(&[("date", 5)]));
        assert_eq!(
            combined[&Relation::Reference],
            counts(&[("apple", 1), ("cherry", 1), ("date", 5)])
        );
        assert_eq!(combined[&Relation::CoReferenced], counts(&[("apple", 2), ("fig", 1)]));
        assert_eq!(combined[&Relation::CoReferencing], counts(&[("apple", 1)]));
        assert_eq!(
            combined[&Relation::CoReference],
            counts(&[("apple", 3), ("fig", 1)])
        );
    }

    #[test]
    fn test_process_trims_unknown_ids() {
        let ctx = context(&[("2", counts(&[("apple", 1)])), ("3", counts(&[("fig", 2)]))]);
        let mut publication = Publication::new("1", ids(&["2", "non_existent_id"]));
        publication.referencing_works = ids(&["3", "ghost"]);
        publication.co_referenced_works = ids(&["ghost"]);
        publication.counts.cited_by_count = 5;

        let report = ctx.process_publication(&mut publication).unwrap();

        assert_eq!(publication.referenced_works, vec!["2"]);
        assert_eq!(publication.referencing_works, vec!["3"]);
        assert!(publication.co_referenced_works.is_empty());
        assert_eq!(publication.reference_works, vec!["2", "3"]);
        assert_eq!(publication.counts.cited_by_count, 5);
        assert_eq!(publication.counts.reference, 2);
        assert_eq!(publication.counts.co_referenced, 0);

        assert_eq!(report.ids(Relation::Referenced).collect::<Vec<_>>(), vec!["non_existent_id"]);
        assert_eq!(report.ids(Relation::Referencing).collect::<Vec<_>>(), vec!["ghost"]);
        assert_eq!(report.count(Relation::CoReferenced), 1);
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_process_ranks_every_relation() {
        let ctx = context(&[
            ("2", counts(&[("apple", 2), ("date", 1)])),
            ("3", counts(&[("cherry", 1)])),
        ]);
        let mut publication = Publication::new("1", ids(&["2"])).with_terms([("date", 1)]);
        publication.co_referencing_works = ids(&["3"]);

        let report = ctx.process_publication(&mut publication).unwrap();
        assert!(report.is_empty());

        // apple: 2 * log2(12 / 2); date is excluded as the publication's own term
        let referenced = publication.combined_terms.get(Relation::Referenced);
        assert_eq!(referenced.terms(), vec!["apple"]);
        let score = referenced.get("apple").unwrap();
        assert!((score - 2.0 * 6f64.log2()).abs() < 1e-12);

        assert_eq!(publication.combined_terms.get(Relation::Reference), referenced);
        assert_eq!(publication.combined_terms.get(Relation::CoReferencing).terms(), vec!["cherry"]);
        assert_eq!(publication.combined_terms.get(Relation::CoReference).terms(), vec!["cherry"]);
        assert!(publication.combined_terms.get(Relation::Referencing).is_empty());
        assert!(publication.combined_terms.get(Relation::CoReferenced).is_empty());
    }

    #[test]
    fn test_process_is_idempotent() {
        let ctx = context(&[("2", counts(&[("apple", 2)])), ("3", counts(&[("fig", 1)]))]);
        let mut publication = Publication::new("1", ids(&["2", "x"]));
        publication.co_referenced_works = ids(&["3"]);

        ctx.process_publication(&mut publication).unwrap();
        let first = publication.clone();
        let report = ctx.process_publication(&mut publication).unwrap();

        assert_eq!(publication, first);
        assert!(report.is_empty());
    }

    #[test]
    fn test_from_publications_estimates_over_collection() {
        let publications: Vec<Publication> = (0..6)
            .map(|i| {
                let mut terms = vec![("shared", 1)];
                if i < 2 {
                    terms.push(("pair", 1));
                }
                Publication::new(i.to_string(), Vec::new()).with_terms(terms)
            })
            .collect();
        let ctx = EnrichmentContext::from_publications(
            &publications,
            &DocumentFrequencyConfig::default(),
            &EnrichmentConfig::default(),
        );

        assert_eq!(ctx.document_frequency().num_documents(), 6);
        assert_eq!(ctx.document_frequency().get("pair"), Some(2));
        assert!(!ctx.document_frequency().contains("shared"));
        assert!(ctx.contains("5"));
    }

    #[test]
    fn test_enrich_all_merges_reports() {
        let ctx = context(&[("a", counts(&[("apple", 1)]))]);
        let mut publications = vec![
            Publication::new("p1", ids(&["a", "m1"])),
            Publication::new("p2", ids(&["m2"])),
        ];
        let report = ctx.enrich_all(&mut publications).unwrap();
        assert_eq!(report.count(Relation::Referenced), 2);
        assert!(publications[1].referenced_works.is_empty());
    }
}
