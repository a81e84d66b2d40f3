//! Bounded TF-IDF ranking
//!
//! `score = count * log2(num_documents / document_frequency)`. Terms missing
//! from the document-frequency table score 0.

use citeforge_common::errors::{AppError, Result};
use citeforge_common::DEFAULT_TOP_K;

use super::DocumentFrequency;
use crate::model::{RankedTerms, TermCounts};

/// Score one term against a document-frequency table
///
/// A zero document frequency, an empty collection or a frequency above the
/// collection size cannot come out of [`DocumentFrequency::estimate`] and is
/// reported as [`AppError::DegenerateScoring`].
pub fn calculate_tfidf(
    term: &str,
    count: u64,
    document_frequency: &DocumentFrequency,
) -> Result<f64> {
    let Some(df) = document_frequency.get(term) else {
        return Ok(0.0);
    };
    let num_documents = document_frequency.num_documents();

    if df == 0 || num_documents == 0 || df > num_documents {
        return Err(AppError::DegenerateScoring {
            term: term.to_string(),
            document_frequency: df,
            num_documents,
        });
    }

    Ok(count as f64 * (num_documents as f64 / df as f64).log2())
}

/// Ranks aggregated term counts and keeps the best `top_k`
#[derive(Debug, Clone)]
pub struct TfIdfRanker {
    top_k: usize,
}

impl TfIdfRanker {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Score every term and return the `top_k` best, highest first
    ///
    /// Zero scores (unknown terms, terms present in every document) sort after
    /// all positive ones; equal scores keep lexicographic term order.
    pub fn rank(
        &self,
        term_counts: &TermCounts,
        document_frequency: &DocumentFrequency,
    ) -> Result<RankedTerms> {
        let scores = term_counts
            .iter()
            .map(|(term, &count)| {
                Ok((term.as_str(), calculate_tfidf(term, count, document_frequency)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut ranked = RankedTerms::from_scores(scores);
        ranked.truncate(self.top_k);
        Ok(ranked)
    }
}

impl Default for TfIdfRanker {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}
