//! Document frequency estimation
//!
//! Counts, for every term, how many documents of the collection contain it,
//! then drops hapax terms and near-universal terms.

use citeforge_common::config::ScoringSettings;
use citeforge_common::DEFAULT_MAX_DOCUMENT_FRACTION;
use std::collections::HashMap;

use crate::model::TermCounts;

/// Relevance filter applied to raw document counts
#[derive(Debug, Clone)]
pub struct DocumentFrequencyConfig {
    /// Terms in fewer documents are dropped (2 removes hapax terms)
    pub min_document_count: usize,

    /// Terms in more than this fraction of the collection are dropped
    pub max_document_fraction: f64,
}

impl Default for DocumentFrequencyConfig {
    fn default() -> Self {
        Self {
            min_document_count: 2,
            max_document_fraction: DEFAULT_MAX_DOCUMENT_FRACTION,
        }
    }
}

impl From<&ScoringSettings> for DocumentFrequencyConfig {
    fn from(settings: &ScoringSettings) -> Self {
        Self {
            min_document_count: settings.min_document_count,
            max_document_fraction: settings.max_document_fraction,
        }
    }
}

/// Term -> number of documents containing it, for a collection of known size
#[derive(Debug, Clone, Default)]
pub struct DocumentFrequency {
    counts: HashMap<String, usize>,
    num_documents: usize,
}

impl DocumentFrequency {
    /// Estimate document frequencies over per-document term maps
    pub fn estimate<'a, I>(
        documents: I,
        num_documents: usize,
        config: &DocumentFrequencyConfig,
    ) -> Self
    where
        I: IntoIterator<Item = &'a TermCounts>,
    {
        let mut raw: HashMap<String, usize> = HashMap::new();
        for document in documents {
            for (term, &count) in document {
                if count > 0 {
                    *raw.entry(term.clone()).or_insert(0) += 1;
                }
            }
        }

        // Epsilon absorbs rounding of fractions such as 1/3
        let ceiling = num_documents as f64 * config.max_document_fraction + 1e-9;
        let total_terms = raw.len();
        raw.retain(|_, &mut count| count >= config.min_document_count && count as f64 <= ceiling);

        tracing::debug!(
            num_documents,
            total_terms,
            retained_terms = raw.len(),
            "Document frequency estimated"
        );

        Self {
            counts: raw,
            num_documents,
        }
    }

    /// Wrap an explicit table, bypassing the relevance filter
    pub fn from_counts<I, S>(counts: I, num_documents: usize) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        Self {
            counts: counts.into_iter().map(|(term, count)| (term.into(), count)).collect(),
            num_documents,
        }
    }

    pub fn get(&self, term: &str) -> Option<usize> {
        self.counts.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.counts.contains_key(term)
    }

    pub fn num_documents(&self) -> usize {
        self.num_documents
    }

    /// Number of retained terms
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(term, &count)| (term.as_str(), count))
    }

    /// The `limit` terms of `terms` with the highest document frequency
    ///
    /// Terms missing from the table are skipped. Ties keep lexicographic order.
    pub fn top_terms_by_document_frequency(&self, terms: &TermCounts, limit: usize) -> Vec<String> {
        let mut ranked: Vec<(&String, usize)> = terms
            .keys()
            .filter_map(|term| self.get(term).map(|df| (term, df)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(limit).map(|(term, _)| term.clone()).collect()
    }
}
