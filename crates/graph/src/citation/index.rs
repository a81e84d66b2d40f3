//! Citation index
//!
//! Provides the in-memory forward/backward citation index of a collection

use citeforge_common::errors::{AppError, Result};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

use crate::model::Publication;
use crate::terms;

/// In-memory citation index keyed by collection position
#[derive(Debug, Clone, Default)]
pub struct CitationIndex {
    /// Publication ids in collection order
    ids: Vec<String>,

    /// Reverse of `ids`
    positions: HashMap<String, usize>,

    /// Adjacency list: position -> positions it cites (self-citations kept)
    outgoing: Vec<Vec<usize>>,

    /// Reverse adjacency: position -> positions citing it (self excluded)
    incoming: Vec<Vec<usize>>,

    /// Referenced ids dropped because they are not in the collection
    dangling_dropped: usize,
}

impl CitationIndex {
    /// Build the index and rewrite the citation lists of every publication
    ///
    /// `referenced_works` is filtered in place to ids of the collection (and
    /// deduplicated); `referencing_works` is replaced by the inverse relation.
    /// Running it twice yields the same lists.
    #[instrument(skip(publications), fields(publications = publications.len()))]
    pub fn build(publications: &mut [Publication]) -> Result<Self> {
        // 1. Known ids
        let mut positions = HashMap::with_capacity(publications.len());
        for (index, publication) in publications.iter().enumerate() {
            if publication.id.is_empty() {
                return Err(AppError::MalformedRecord {
                    index,
                    id: None,
                    message: "publication id is empty".to_string(),
                });
            }
            if positions.insert(publication.id.clone(), index).is_some() {
                return Err(AppError::DuplicateId {
                    id: publication.id.clone(),
                });
            }
        }

        // 2. Drop dangling references, destructively
        let mut dangling_dropped = 0;
        for publication in publications.iter_mut() {
            let before = publication.referenced_works.len();
            publication.referenced_works.retain(|id| positions.contains_key(id));
            dangling_dropped += before - publication.referenced_works.len();
            terms::deduplicate_in_place(&mut publication.referenced_works);
        }

        // 3. Forward and inverted adjacency
        let mut outgoing = Vec::with_capacity(publications.len());
        let mut incoming = vec![Vec::new(); publications.len()];
        for (citing, publication) in publications.iter().enumerate() {
            let cited: Vec<usize> = publication
                .referenced_works
                .iter()
                .map(|id| positions[id])
                .collect();
            for &target in &cited {
                if target != citing {
                    incoming[target].push(citing);
                }
            }
            outgoing.push(cited);
        }

        // 4. Assign referencing works from the inverted index
        let ids: Vec<String> = publications.iter().map(|p| p.id.clone()).collect();
        for (position, publication) in publications.iter_mut().enumerate() {
            publication.referencing_works = incoming[position]
                .iter()
                .map(|&citing| ids[citing].clone())
                .collect();
        }

        if dangling_dropped > 0 {
            warn!(dangling_dropped, "Dropped references to publications outside the collection");
        }

        let index = Self {
            ids,
            positions,
            outgoing,
            incoming,
            dangling_dropped,
        };

        info!(
            nodes = index.node_count(),
            edges = index.edge_count(),
            dangling_dropped,
            "Citation index built"
        );

        Ok(index)
    }

    /// Position of a publication id in the collection
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Publication id at a collection position
    pub fn id(&self, position: usize) -> &str {
        &self.ids[position]
    }

    /// Positions cited by the publication at `position`
    pub fn references_of(&self, position: usize) -> &[usize] {
        self.outgoing.get(position).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Positions citing the publication at `position`
    pub fn citations_of(&self, position: usize) -> &[usize] {
        self.incoming.get(position).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Ids of the papers cited by this paper
    pub fn get_references(&self, id: &str) -> Vec<&str> {
        self.position(id)
            .map(|p| self.references_of(p).iter().map(|&r| self.id(r)).collect())
            .unwrap_or_default()
    }

    /// Ids of the papers citing this paper
    pub fn get_citations(&self, id: &str) -> Vec<&str> {
        self.position(id)
            .map(|p| self.citations_of(p).iter().map(|&c| self.id(c)).collect())
            .unwrap_or_default()
    }

    /// Forward adjacency, one entry per publication
    pub fn outgoing(&self) -> &[Vec<usize>] {
        &self.outgoing
    }

    /// Inverted adjacency, one entry per publication
    pub fn incoming(&self) -> &[Vec<usize>] {
        &self.incoming
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Get edge count (self-citations included)
    pub fn edge_count(&self) -> usize {
        self.outgoing.iter().map(Vec::len).sum()
    }

    /// Get citation count (incoming edges)
    pub fn citation_count(&self, id: &str) -> usize {
        self.position(id).map(|p| self.citations_of(p).len()).unwrap_or(0)
    }

    /// Get reference count (outgoing edges)
    pub fn reference_count(&self, id: &str) -> usize {
        self.position(id).map(|p| self.references_of(p).len()).unwrap_or(0)
    }

    pub fn dangling_dropped(&self) -> usize {
        self.dangling_dropped
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pubs(edges: &[(&str, &[&str])]) -> Vec<Publication> {
        edges
            .iter()
            .map(|(id, refs)| Publication::new(*id, refs.iter().map(|r| r.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_basic_forward_backward() {
        let mut publications = pubs(&[("1", &["2"]), ("2", &["3"]), ("3", &[])]);
        let index = CitationIndex::build(&mut publications).unwrap();

        assert!(publications[0].referencing_works.is_empty());
        assert_eq!(publications[1].referencing_works, vec!["1"]);
        assert_eq!(publications[2].referencing_works, vec!["2"]);
        assert_eq!(index.node_count(), 3);
        assert_eq!(index.get_references("1"), vec!["2"]);
        assert_eq!(index.get_citations("3"), vec!["2"]);
    }

    #[test]
    fn test_circular_references() {
        let mut publications = pubs(&[("1", &["2"]), ("2", &["3"]), ("3", &["1"])]);
        CitationIndex::build(&mut publications).unwrap();

        assert_eq!(publications[0].referencing_works, vec!["3"]);
        assert_eq!(publications[1].referencing_works, vec!["1"]);
        assert_eq!(publications[2].referencing_works, vec!["2"]);
    }

    #[test]
    fn test_multiple_citers_keep_collection_order() {
        let mut publications = pubs(&[("1", &["2", "3"]), ("2", &["3"]), ("3", &[])]);
        let index = CitationIndex::build(&mut publications).unwrap();

        assert_eq!(publications[2].referencing_works, vec!["1", "2"]);
        assert_eq!(index.citation_count("3"), 2);
        assert_eq!(index.reference_count("1"), 2);
    }

    #[test]
    fn test_dangling_ids_removed() {
        let mut publications = pubs(&[("1", &["2", "unknown"]), ("2", &[])]);
        let index = CitationIndex::build(&mut publications).unwrap();

        assert_eq!(publications[0].referenced_works, vec!["2"]);
        assert!(publications[0].referencing_works.is_empty());
        assert_eq!(publications[1].referencing_works, vec!["1"]);
        assert_eq!(index.dangling_dropped(), 1);
    }

    #[test]
    fn test_self_citation_kept_forward_only() {
        let mut publications = pubs(&[("1", &["1"]), ("2", &["1"])]);
        let index = CitationIndex::build(&mut publications).unwrap();

        assert_eq!(publications[0].referenced_works, vec!["1"]);
        assert_eq!(publications[0].referencing_works, vec!["2"]);
        assert!(publications[1].referencing_works.is_empty());
        assert_eq!(index.edge_count(), 2);
    }

    #[test]
    fn test_duplicate_references_collapse() {
        let mut publications = pubs(&[("1", &["2", "2"]), ("2", &[])]);
        CitationIndex::build(&mut publications).unwrap();

        assert_eq!(publications[0].referenced_works, vec!["2"]);
        assert_eq!(publications[1].referencing_works, vec!["1"]);
    }

    #[test]
    fn test_stale_referencing_works_are_replaced() {
        let mut publications = pubs(&[("1", &[]), ("2", &[])]);
        publications[0].referencing_works = vec!["2".into(), "non_existent_id".into()];
        CitationIndex::build(&mut publications).unwrap();

        assert!(publications[0].referencing_works.is_empty());
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut publications = pubs(&[("1", &["2", "3", "x"]), ("2", &["3"]), ("3", &["1"])]);
        CitationIndex::build(&mut publications).unwrap();
        let first: Vec<Vec<String>> =
            publications.iter().map(|p| p.referencing_works.clone()).collect();

        let index = CitationIndex::build(&mut publications).unwrap();
        let second: Vec<Vec<String>> =
            publications.iter().map(|p| p.referencing_works.clone()).collect();

        assert_eq!(first, second);
        assert_eq!(index.dangling_dropped(), 0);
    }

    #[test]
    fn test_empty_collection() {
        let mut publications: Vec<Publication> = Vec::new();
        let index = CitationIndex::build(&mut publications).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.edge_count(), 0);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut publications = pubs(&[("1", &[]), ("1", &[])]);
        assert!(matches!(
            CitationIndex::build(&mut publications),
            Err(AppError::DuplicateId { ref id }) if id == "1"
        ));
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut publications = pubs(&[("1", &[]), ("", &[])]);
        assert!(matches!(
            CitationIndex::build(&mut publications),
            Err(AppError::MalformedRecord { index: 1, .. })
        ));
    }

    #[test]
    fn test_unknown_id_lookups() {
        let mut publications = pubs(&[("1", &[])]);
        let index = CitationIndex::build(&mut publications).unwrap();
        assert!(index.get_references("nope").is_empty());
        assert_eq!(index.citation_count("nope"), 0);
        assert_eq!(index.position("1"), Some(0));
    }
}
