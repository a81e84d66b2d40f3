//! Co-reference inference
//!
//! Two publications are linked when they occur together in enough neighbour
//! groups of the citation index:
//! - co-referencing: both are cited by a common work (group = what a citer cites)
//! - co-referenced: both cite a common work (group = who cites a target)

use citeforge_common::config::CoReferenceSettings;
use citeforge_common::metrics;
use std::collections::HashMap;
use tracing::{info, instrument};

use super::{CitationIndex, CoRelation};
use crate::model::Publication;

/// Co-reference configuration
#[derive(Debug, Clone)]
pub struct CoReferenceConfig {
    /// Shared neighbours required before two publications are linked
    pub min_shared_neighbors: usize,
}

impl Default for CoReferenceConfig {
    fn default() -> Self {
        Self { min_shared_neighbors: 1 }
    }
}

impl From<&CoReferenceSettings> for CoReferenceConfig {
    fn from(settings: &CoReferenceSettings) -> Self {
        Self {
            min_shared_neighbors: settings.min_shared_neighbors,
        }
    }
}

/// Symmetric co-reference relations over a [`CitationIndex`]
#[derive(Debug, Clone, Default)]
pub struct CoReferenceEngine {
    co_referencing: Vec<Vec<usize>>,
    co_referenced: Vec<Vec<usize>>,
}

impl CoReferenceEngine {
    /// Infer both relations from the index
    #[instrument(skip_all, fields(nodes = index.node_count()))]
    pub fn infer(index: &CitationIndex, config: &CoReferenceConfig) -> Self {
        let n = index.node_count();

        // A citer citing itself is not its own sibling
        let cited_groups = index
            .outgoing()
            .iter()
            .enumerate()
            .map(|(citer, cited)| cited.iter().copied().filter(move |&p| p != citer));
        let co_referencing = link_pairs(n, cited_groups, config.min_shared_neighbors);

        let citing_groups = index.incoming().iter().map(|citers| citers.iter().copied());
        let co_referenced = link_pairs(n, citing_groups, config.min_shared_neighbors);

        let engine = Self {
            co_referencing,
            co_referenced,
        };

        let referencing_links = engine.link_count(CoRelation::CoReferencing);
        let referenced_links = engine.link_count(CoRelation::CoReferenced);
        metrics::record_coreference(CoRelation::CoReferencing.as_str(), referencing_links);
        metrics::record_coreference(CoRelation::CoReferenced.as_str(), referenced_links);
        info!(
            co_referencing_links = referencing_links,
            co_referenced_links = referenced_links,
            "Co-reference relations inferred"
        );

        engine
    }

    /// Positions sharing a citing work with `position`, ascending
    pub fn co_referencing_of(&self, position: usize) -> &[usize] {
        self.co_referencing.get(position).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Positions sharing a cited work with `position`, ascending
    pub fn co_referenced_of(&self, position: usize) -> &[usize] {
        self.co_referenced.get(position).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Number of undirected links in one relation
    pub fn link_count(&self, relation: CoRelation) -> usize {
        let lists = match relation {
            CoRelation::CoReferencing => &self.co_referencing,
            CoRelation::CoReferenced => &self.co_referenced,
        };
        lists.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Overwrite the co-relation lists of every publication
    ///
    /// `publications` must be the slice the index was built from.
    pub fn apply(&self, index: &CitationIndex, publications: &mut [Publication]) {
        for (position, publication) in publications.iter_mut().enumerate() {
            publication.co_referencing_works =
                self.co_referencing_of(position).iter().map(|&p| index.id(p).to_string()).collect();
            publication.co_referenced_works =
                self.co_referenced_of(position).iter().map(|&p| index.id(p).to_string()).collect();
        }
    }
}

/// Link every pair co-occurring in at least `min_shared` groups
///
/// Groups are expected to be duplicate-free; the result is symmetric, sorted
/// and never contains a position in its own list.
fn link_pairs<G, I>(n: usize, groups: G, min_shared: usize) -> Vec<Vec<usize>>
where
    G: Iterator<Item = I>,
    I: Iterator<Item = usize>,
{
    let mut shared: HashMap<(usize, usize), usize> = HashMap::new();
    for group in groups {
        let members: Vec<usize> = group.collect();
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                if a == b {
                    continue;
                }
                let key = if a < b { (a, b) } else { (b, a) };
                *shared.entry(key).or_insert(0) += 1;
            }
        }
    }

    let mut links = vec![Vec::new(); n];
    for ((a, b), count) in shared {
        if count >= min_shared {
            links[a].push(b);
            links[b].push(a);
        }
    }
    for list in &mut links {
        list.sort_unstable();
    }
    links
}
