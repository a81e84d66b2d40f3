//! Term scoring
//!
//! Document frequency estimation over the working collection and the
//! bounded TF-IDF ranking applied to every combined-terms field.

mod document_frequency;
mod tfidf;

pub use document_frequency::{DocumentFrequency, DocumentFrequencyConfig};
pub use tfidf::{calculate_tfidf, TfIdfRanker};
