//! Publication data model
//!
//! A [`Publication`] is created once from catalog data, enriched in place by
//! the pipeline stages and finally projected to an [`ExportRecord`].

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::terms;

/// Normalized term -> occurrence count
pub type TermCounts = BTreeMap<String, u64>;

/// Publication record flowing through the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    /// Catalog id, unique across the working collection
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(rename = "abstract", default, deserialize_with = "null_as_default")]
    pub abstract_text: String,

    /// Author display names, passed through untouched
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub authorships: Vec<String>,

    /// Catalog language code, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Baseline vocabulary of the publication's own title and abstract
    #[serde(default, deserialize_with = "null_as_default")]
    pub term_frequencies: TermCounts,

    /// Works this publication cites
    #[serde(default, deserialize_with = "null_as_default")]
    pub referenced_works: Vec<String>,

    /// Works citing this publication (derived)
    #[serde(default, deserialize_with = "null_as_default")]
    pub referencing_works: Vec<String>,

    /// Union of referenced and referencing works (derived)
    #[serde(default, deserialize_with = "null_as_default")]
    pub reference_works: Vec<String>,

    /// Works sharing a citing work with this one (derived)
    #[serde(default, deserialize_with = "null_as_default")]
    pub co_referencing_works: Vec<String>,

    /// Works sharing a cited work with this one (derived)
    #[serde(default, deserialize_with = "null_as_default")]
    pub co_referenced_works: Vec<String>,

    /// Union of both co-relations (derived)
    #[serde(default, deserialize_with = "null_as_default")]
    pub co_reference_works: Vec<String>,

    #[serde(flatten)]
    pub counts: RelationCounts,

    #[serde(flatten)]
    pub combined_terms: CombinedTerms,
}

impl Publication {
    /// Create a bare publication citing the given ids
    pub fn new(id: impl Into<String>, referenced_works: Vec<String>) -> Self {
        Self {
            id: id.into(),
            referenced_works,
            ..Default::default()
        }
    }

    /// Attach a baseline vocabulary
    pub fn with_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        self.term_frequencies = terms.into_iter().map(|(t, c)| (t.into(), c)).collect();
        self
    }

    /// Recompute the two union relations and the locally derived counts from the current lists
    pub fn refresh_derived_relations(&mut self) {
        self.reference_works =
            terms::merge_and_deduplicate(&self.referenced_works, &self.referencing_works);
        self.co_reference_works =
            terms::merge_and_deduplicate(&self.co_referenced_works, &self.co_referencing_works);
        self.counts = RelationCounts::derived_from(self);
    }
}

/// Relation sizes stored alongside the lists
///
/// `referenced_works_count` and `cited_by_count` are catalog totals and pass
/// through untouched; the remaining four are sizes of the local lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationCounts {
    #[serde(default, deserialize_with = "null_as_default")]
    pub referenced_works_count: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cited_by_count: usize,
    #[serde(default, rename = "count_reference", deserialize_with = "blank_count")]
    pub reference: usize,
    #[serde(default, rename = "count_co_referenced", deserialize_with = "blank_count")]
    pub co_referenced: usize,
    #[serde(default, rename = "count_co_referencing", deserialize_with = "blank_count")]
    pub co_referencing: usize,
    #[serde(default, rename = "count_co_reference", deserialize_with = "blank_count")]
    pub co_reference: usize,
}

impl RelationCounts {
    /// Counts with the four local sizes taken from the publication's lists
    pub fn derived_from(publication: &Publication) -> Self {
        Self {
            reference: publication.reference_works.len(),
            co_referenced: publication.co_referenced_works.len(),
            co_referencing: publication.co_referencing_works.len(),
            co_reference: publication.co_reference_works.len(),
            ..publication.counts
        }
    }
}

/// The six relation categories a publication is enriched from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Relation {
    #[serde(rename = "referenced_works")]
    Referenced,
    #[serde(rename = "referencing_works")]
    Referencing,
    #[serde(rename = "reference_works")]
    Reference,
    #[serde(rename = "co_referenced_works")]
    CoReferenced,
    #[serde(rename = "co_referencing_works")]
    CoReferencing,
    #[serde(rename = "co_reference_works")]
    CoReference,
}

impl Relation {
    pub const ALL: [Relation; 6] = [
        Relation::Referenced,
        Relation::Referencing,
        Relation::Reference,
        Relation::CoReferenced,
        Relation::CoReferencing,
        Relation::CoReference,
    ];

    /// Relations read directly from the graph; the other two are their unions
    pub const PRIMARY: [Relation; 4] = [
        Relation::Referenced,
        Relation::Referencing,
        Relation::CoReferenced,
        Relation::CoReferencing,
    ];

    /// Name of the id-list field this relation is stored in
    pub fn field_name(&self) -> &'static str {
        match self {
            Relation::Referenced => "referenced_works",
            Relation::Referencing => "referencing_works",
            Relation::Reference => "reference_works",
            Relation::CoReferenced => "co_referenced_works",
            Relation::CoReferencing => "co_referencing_works",
            Relation::CoReference => "co_reference_works",
        }
    }

    pub fn ids<'a>(&self, publication: &'a Publication) -> &'a [String] {
        match self {
            Relation::Referenced => &publication.referenced_works,
            Relation::Referencing => &publication.referencing_works,
            Relation::Reference => &publication.reference_works,
            Relation::CoReferenced => &publication.co_referenced_works,
            Relation::CoReferencing => &publication.co_referencing_works,
            Relation::CoReference => &publication.co_reference_works,
        }
    }

    pub fn ids_mut<'a>(&self, publication: &'a mut Publication) -> &'a mut Vec<String> {
        match self {
            Relation::Referenced => &mut publication.referenced_works,
            Relation::Referencing => &mut publication.referencing_works,
            Relation::Reference => &mut publication.reference_works,
            Relation::CoReferenced => &mut publication.co_referenced_works,
            Relation::CoReferencing => &mut publication.co_referencing_works,
            Relation::CoReference => &mut publication.co_reference_works,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// A term with its TF-IDF score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTerm {
    pub term: String,
    pub score: f64,
}

/// Terms ordered by descending score, serialized as a JSON object in that order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedTerms(Vec<ScoredTerm>);

impl RankedTerms {
    /// Order scored terms by descending score; equal scores keep their input order
    pub fn from_scores<I, S>(scores: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut terms: Vec<ScoredTerm> = scores
            .into_iter()
            .map(|(term, score)| ScoredTerm { term: term.into(), score })
            .collect();
        terms.sort_by(|a, b| b.score.total_cmp(&a.score));
        Self(terms)
    }

    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredTerm> {
        self.0.iter()
    }

    pub fn get(&self, term: &str) -> Option<f64> {
        self.0.iter().find(|t| t.term == term).map(|t| t.score)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.get(term).is_some()
    }

    pub fn terms(&self) -> Vec<&str> {
        self.0.iter().map(|t| t.term.as_str()).collect()
    }
}

impl Serialize for RankedTerms {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for scored in &self.0 {
            map.serialize_entry(&scored.term, &scored.score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RankedTerms {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let scores =
            Option::<BTreeMap<String, f64>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(RankedTerms::from_scores(scores))
    }
}

/// The six per-relation top-K term rankings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedTerms {
    #[serde(default, rename = "combined_terms_referenced_works")]
    pub referenced: RankedTerms,
    #[serde(default, rename = "combined_terms_referencing_works")]
    pub referencing: RankedTerms,
    #[serde(default, rename = "combined_terms_reference_works")]
    pub reference: RankedTerms,
    #[serde(default, rename = "combined_terms_co_referenced_works")]
    pub co_referenced: RankedTerms,
    #[serde(default, rename = "combined_terms_co_referencing_works")]
    pub co_referencing: RankedTerms,
    #[serde(default, rename = "combined_terms_co_reference_works")]
    pub co_reference: RankedTerms,
}

impl CombinedTerms {
    pub fn get(&self, relation: Relation) -> &RankedTerms {
        match relation {
            Relation::Referenced => &self.referenced,
            Relation::Referencing => &self.referencing,
            Relation::Reference => &self.reference,
            Relation::CoReferenced => &self.co_referenced,
            Relation::CoReferencing => &self.co_referencing,
            Relation::CoReference => &self.co_reference,
        }
    }

    pub fn set(&mut self, relation: Relation, ranked: RankedTerms) {
        let slot = match relation {
            Relation::Referenced => &mut self.referenced,
            Relation::Referencing => &mut self.referencing,
            Relation::Reference => &mut self.reference,
            Relation::CoReferenced => &mut self.co_referenced,
            Relation::CoReferencing => &mut self.co_referencing,
            Relation::CoReference => &mut self.co_reference,
        };
        *slot = ranked;
    }
}

/// Narrow projection handed to the search-index loader
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authorships: Vec<String>,
    #[serde(flatten)]
    pub combined_terms: CombinedTerms,
}

impl From<&Publication> for ExportRecord {
    fn from(publication: &Publication) -> Self {
        Self {
            id: publication.id.clone(),
            title: publication.title.clone(),
            abstract_text: publication.abstract_text.clone(),
            authorships: publication.authorships.clone(),
            combined_terms: publication.combined_terms.clone(),
        }
    }
}

/// Treat an explicit JSON `null` like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CountField {
    Count(usize),
    Text(String),
}

/// Local counts are recomputed, so fetched records may leave them as `""` or `null`
fn blank_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<CountField>::deserialize(deserializer)? {
        None => Ok(0),
        Some(CountField::Count(count)) => Ok(count),
        Some(CountField::Text(text)) if text.trim().is_empty() => Ok(0),
        Some(CountField::Text(text)) => text.trim().parse().map_err(|_| {
            <D::Error as serde::de::Error>::custom(format!("invalid count {text:?}"))
        }),
    }
}
