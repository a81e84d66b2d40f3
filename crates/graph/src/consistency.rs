//! Post-run consistency check
//!
//! Verifies the relation invariants of an enriched collection: citation and
//! co-reference symmetry, duplicate-free lists, no self ids in derived lists,
//! no ids outside the collection, and counts matching the lists. Also compares
//! the catalog citation totals with what the collection actually holds.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::model::{Publication, Relation, RelationCounts};

const MAX_SAMPLES: usize = 5;

/// Relations derived by the pipeline; none of them may name the publication itself
const DERIVED: [Relation; 4] = [
    Relation::Referencing,
    Relation::CoReferenced,
    Relation::CoReferencing,
    Relation::CoReference,
];

/// Count of one kind of violation plus a few examples
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Violations {
    pub count: usize,
    pub samples: Vec<String>,
}

impl Violations {
    fn record(&mut self, sample: impl FnOnce() -> String) {
        self.count += 1;
        if self.samples.len() < MAX_SAMPLES {
            self.samples.push(sample());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Catalog totals against the locally resolved lists
///
/// A gap means the fetched collection is missing works the catalog knows of.
/// That is expected for a bounded fetch, so it never makes a report inconsistent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchCoverage {
    pub catalog_references: usize,
    pub local_references: usize,
    pub catalog_citations: usize,
    pub local_citations: usize,
    pub partial_references: Violations,
    pub partial_citations: Violations,
}

impl FetchCoverage {
    fn record(&mut self, publication: &Publication) {
        let id = publication.id.as_str();
        let counts = &publication.counts;
        let local_references = publication.referenced_works.len();
        let local_citations = publication.referencing_works.len();

        self.catalog_references += counts.referenced_works_count;
        self.local_references += local_references;
        self.catalog_citations += counts.cited_by_count;
        self.local_citations += local_citations;

        if local_references < counts.referenced_works_count {
            self.partial_references.record(|| {
                format!("{id}: {local_references} of {}", counts.referenced_works_count)
            });
        }
        if local_citations < counts.cited_by_count {
            self.partial_citations
                .record(|| format!("{id}: {local_citations} of {}", counts.cited_by_count));
        }
    }

    pub fn log(&self) {
        info!(
            catalog_references = self.catalog_references,
            local_references = self.local_references,
            partial_references = self.partial_references.count,
            catalog_citations = self.catalog_citations,
            local_citations = self.local_citations,
            partial_citations = self.partial_citations.count,
            "Fetch coverage"
        );
    }
}

/// Outcome of [`check`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    pub publications: usize,
    pub coverage: FetchCoverage,
    pub duplicate_publications: Violations,
    pub asymmetric_citations: Violations,
    pub asymmetric_co_references: Violations,
    pub duplicate_entries: Violations,
    pub self_references: Violations,
    pub dangling_ids: Violations,
    pub stale_counts: Violations,
}

impl ConsistencyReport {
    fn categories(&self) -> [(&'static str, &Violations); 7] {
        [
            ("duplicate_publications", &self.duplicate_publications),
            ("asymmetric_citations", &self.asymmetric_citations),
            ("asymmetric_co_references", &self.asymmetric_co_references),
            ("duplicate_entries", &self.duplicate_entries),
            ("self_references", &self.self_references),
            ("dangling_ids", &self.dangling_ids),
            ("stale_counts", &self.stale_counts),
        ]
    }

    pub fn is_consistent(&self) -> bool {
        self.categories().iter().all(|(_, v)| v.is_empty())
    }

    pub fn violation_count(&self) -> usize {
        self.categories().iter().map(|(_, v)| v.count).sum()
    }

    pub fn log(&self) {
        self.coverage.log();
        if self.is_consistent() {
            info!(publications = self.publications, "Collection is consistent");
            return;
        }
        for (kind, violations) in self.categories() {
            if !violations.is_empty() {
                warn!(
                    kind,
                    count = violations.count,
                    samples = ?violations.samples,
                    "Consistency violation"
                );
            }
        }
    }
}

/// Check the relation invariants of a collection
pub fn check(publications: &[Publication]) -> ConsistencyReport {
    let mut report = ConsistencyReport {
        publications: publications.len(),
        ..Default::default()
    };

    let mut by_id: HashMap<&str, &Publication> = HashMap::with_capacity(publications.len());
    for publication in publications {
        if by_id.insert(publication.id.as_str(), publication).is_some() {
            report.duplicate_publications.record(|| publication.id.clone());
        }
    }

    let lists_contain = |id: &str, relation: Relation, needle: &str| {
        by_id
            .get(id)
            .map(|other| relation.ids(other).iter().any(|x| x == needle))
            .unwrap_or(false)
    };

    for publication in publications {
        let id = publication.id.as_str();

        for relation in Relation::ALL {
            let ids = relation.ids(publication);
            let mut seen = HashSet::with_capacity(ids.len());
            for other in ids {
                if !seen.insert(other.as_str()) {
                    report
                        .duplicate_entries
                        .record(|| format!("{id}.{relation} repeats {other}"));
                }
                if !by_id.contains_key(other.as_str()) {
                    report.dangling_ids.record(|| format!("{id}.{relation} -> {other}"));
                }
            }
        }

        for relation in DERIVED {
            if relation.ids(publication).iter().any(|other| other == id) {
                report.self_references.record(|| format!("{id}.{relation}"));
            }
        }

        for cited in publication.referenced_works.iter().filter(|c| c.as_str() != id) {
            if by_id.contains_key(cited.as_str())
                && !lists_contain(cited.as_str(), Relation::Referencing, id)
            {
                report
                    .asymmetric_citations
                    .record(|| format!("{id} cites {cited} but is not in its referencing_works"));
            }
        }
        for citer in &publication.referencing_works {
            if by_id.contains_key(citer.as_str())
                && !lists_contain(citer.as_str(), Relation::Referenced, id)
            {
                report
                    .asymmetric_citations
                    .record(|| format!("{citer} listed as citing {id} but does not cite it"));
            }
        }

        for relation in [Relation::CoReferenced, Relation::CoReferencing] {
            for other in relation.ids(publication) {
                if by_id.contains_key(other.as_str())
                    && !lists_contain(other.as_str(), relation, id)
                {
                    report
                        .asymmetric_co_references
                        .record(|| format!("{id}.{relation} -> {other} is one-sided"));
                }
            }
        }

        if publication.counts != RelationCounts::derived_from(publication) {
            report.stale_counts.record(|| id.to_string());
        }
        report.coverage.record(publication);
    }

    report
}
