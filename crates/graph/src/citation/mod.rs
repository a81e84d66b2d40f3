//! Citation graph relations
//!
//! Builds the bidirectional citation index of a collection and infers the
//! symmetric co-reference relations from it.

mod coreference;
mod index;

pub use coreference::{CoReferenceConfig, CoReferenceEngine};
pub use index::CitationIndex;

use serde::{Deserialize, Serialize};

/// Which shared-neighbour relation a co-reference link belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoRelation {
    /// Both publications are cited by a common work
    CoReferencing,
    /// Both publications cite a common work
    CoReferenced,
}

impl CoRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoRelation::CoReferencing => "co_referencing_works",
            CoRelation::CoReferenced => "co_referenced_works",
        }
    }
}
