//! Unresolvable ids collected during enrichment

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use crate::model::Relation;

/// How many ids per relation are printed in the summary line
const SAMPLE_SIZE: usize = 5;

/// Ids named in a relation list but absent from the term lookup, per relation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NotFoundReport {
    missing: BTreeMap<Relation, BTreeSet<String>>,
}

impl NotFoundReport {
    pub fn record<I>(&mut self, relation: Relation, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut ids = ids.into_iter().peekable();
        if ids.peek().is_some() {
            self.missing.entry(relation).or_default().extend(ids);
        }
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: NotFoundReport) {
        for (relation, ids) in other.missing {
            self.missing.entry(relation).or_default().extend(ids);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }

    /// Distinct missing ids per relation, summed over relations
    pub fn total(&self) -> usize {
        self.missing.values().map(BTreeSet::len).sum()
    }

    pub fn count(&self, relation: Relation) -> usize {
        self.missing.get(&relation).map(BTreeSet::len).unwrap_or(0)
    }

    pub fn ids(&self, relation: Relation) -> impl Iterator<Item = &str> {
        self.missing.get(&relation).into_iter().flatten().map(String::as_str)
    }

    /// `(relation field name, count)` pairs for metric labels
    pub fn counts(&self) -> Vec<(&'static str, usize)> {
        self.missing
            .iter()
            .map(|(relation, ids)| (relation.field_name(), ids.len()))
            .collect()
    }

    /// One warning per relation with missing ids
    pub fn log_summary(&self) {
        for (relation, ids) in &self.missing {
            let sample: Vec<&str> = ids.iter().take(SAMPLE_SIZE).map(String::as_str).collect();
            warn!(
                relation = %relation,
                missing = ids.len(),
                sample = ?sample,
                "Relation ids not found in collection"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_merge() {
        let mut report = NotFoundReport::default();
        report.record(Relation::Referenced, vec!["x".to_string(), "y".to_string()]);
        report.record(Relation::CoReferenced, Vec::new());

        let mut other = NotFoundReport::default();
        other.record(Relation::Referenced, vec!["y".to_string(), "z".to_string()]);
        other.record(Relation::Referencing, vec!["q".to_string()]);
        report.merge(other);

        assert_eq!(report.count(Relation::Referenced), 3);
        assert_eq!(report.count(Relation::Referencing), 1);
        assert_eq!(report.count(Relation::CoReferenced), 0);
        assert_eq!(report.total(), 4);
        assert_eq!(report.ids(Relation::Referenced).collect::<Vec<_>>(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_empty_relations_not_recorded() {
        let mut report = NotFoundReport::default();
        report.record(Relation::CoReference, std::iter::empty());
        assert!(report.is_empty());
        assert!(report.counts().is_empty());
    }

    #[test]
    fn test_serializes_by_field_name() {
        let mut report = NotFoundReport::default();
        report.record(Relation::CoReferencing, vec!["W1".to_string()]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value, serde_json::json!({"co_referencing_works": ["W1"]}));
        assert_eq!(report.counts(), vec![("co_referencing_works", 1)]);
    }
}
