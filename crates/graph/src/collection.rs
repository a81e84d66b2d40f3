//! Collection ingestion
//!
//! Turns fetched catalog records into one working collection: records are
//! parsed one at a time so a bad record is reported with its position, ids
//! lose their catalog URL prefix, and repeated publications are dropped.

use citeforge_common::config::PipelineSettings;
use citeforge_common::errors::{AppError, Result};
use citeforge_common::metrics;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::model::{Publication, Relation};
use crate::terms;

const DEFAULT_ID_PREFIX: &str = "https://openalex.org/";

/// Ingestion options
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Prefix removed from ids and relation entries (empty to keep ids as-is)
    pub id_prefix: String,

    /// Fill empty `term_frequencies` from title and abstract
    pub derive_missing_terms: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            derive_missing_terms: true,
        }
    }
}

impl From<&PipelineSettings> for IngestOptions {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            id_prefix: settings.id_prefix.clone(),
            derive_missing_terms: settings.derive_missing_terms,
        }
    }
}

/// Parse one raw record
///
/// `id` is the only required field; everything else defaults to empty.
pub fn parse_publication(index: usize, value: Value) -> Result<Publication> {
    let id = match value.as_object().map(|object| object.get("id")) {
        None => {
            return Err(AppError::MalformedRecord {
                index,
                id: None,
                message: "expected a JSON object".to_string(),
            })
        }
        Some(None) | Some(Some(Value::Null)) => {
            return Err(AppError::MissingField {
                index,
                field: "id".to_string(),
            })
        }
        Some(Some(Value::String(id))) if id.is_empty() => {
            return Err(AppError::MalformedRecord {
                index,
                id: None,
                message: "publication id is empty".to_string(),
            })
        }
        Some(Some(Value::String(id))) => id.clone(),
        Some(Some(other)) => {
            return Err(AppError::MalformedRecord {
                index,
                id: None,
                message: format!("publication id must be a string, got {other}"),
            })
        }
    };

    serde_json::from_value(value).map_err(|e| AppError::MalformedRecord {
        index,
        id: Some(id),
        message: e.to_string(),
    })
}

/// Parse a JSON array of raw records, failing on the first bad one
pub fn parse_publications(value: Value) -> Result<Vec<Publication>> {
    let Value::Array(records) = value else {
        return Err(AppError::MalformedRecord {
            index: 0,
            id: None,
            message: "expected a JSON array of publications".to_string(),
        });
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| parse_publication(index, record))
        .collect()
}

/// Remove `prefix` from the start of `id`, if present
pub fn strip_prefix(id: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return id.to_string();
    }
    id.strip_prefix(prefix).unwrap_or(id).to_string()
}

/// Strip the id prefix from the id and every relation list of a publication
pub fn normalize_ids(publication: &mut Publication, prefix: &str) {
    if prefix.is_empty() {
        return;
    }
    publication.id = strip_prefix(&publication.id, prefix);
    for relation in Relation::ALL {
        for id in relation.ids_mut(publication).iter_mut() {
            *id = strip_prefix(id, prefix);
        }
    }
}

/// Merge several publication lists into one, first occurrence of an id wins
pub fn collect_unique<I>(sources: I, options: &IngestOptions) -> Vec<Publication>
where
    I: IntoIterator<Item = Vec<Publication>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut collection = Vec::new();
    let mut duplicates = 0usize;
    let mut derived = 0usize;

    for (source_index, source) in sources.into_iter().enumerate() {
        let before = collection.len();
        for mut publication in source {
            normalize_ids(&mut publication, &options.id_prefix);
            if !seen.insert(publication.id.clone()) {
                duplicates += 1;
                continue;
            }
            if options.derive_missing_terms && publication.term_frequencies.is_empty() {
                publication.term_frequencies = terms::extract_term_frequencies(
                    &publication.title,
                    &publication.abstract_text,
                    publication.language.as_deref(),
                );
                derived += 1;
            }
            collection.push(publication);
        }
        debug!(source_index, added = collection.len() - before, "Source merged");
    }

    if duplicates > 0 {
        warn!(duplicates, "Skipped publications already present in the collection");
    }
    metrics::record_duplicates(duplicates);
    info!(publications = collection.len(), duplicates, derived, "Collection assembled");

    collection
}
