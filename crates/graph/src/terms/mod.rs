//! Term aggregation
//!
//! Combines term maps of a publication's neighbours and removes the
//! publication's own vocabulary from the result.

pub mod normalize;

use std::collections::{BTreeMap, HashSet};

use crate::model::TermCounts;

pub use normalize::{extract_term_frequencies, STOP_WORDS};

/// Sum several term maps over the union of their keys
pub fn combine<'a, I>(maps: I) -> TermCounts
where
    I: IntoIterator<Item = &'a TermCounts>,
{
    let mut combined = TermCounts::new();
    for map in maps {
        combine_into(&mut combined, map);
    }
    combined
}

/// Add every count of `other` onto `target`
pub fn combine_into(target: &mut TermCounts, other: &TermCounts) {
    for (term, count) in other {
        *target.entry(term.clone()).or_insert(0) += count;
    }
}

/// Keep only the keys of `map` that are absent from `exclusion`
pub fn exclude<V, W>(
    map: &BTreeMap<String, V>,
    exclusion: &BTreeMap<String, W>,
) -> BTreeMap<String, V>
where
    V: Clone,
{
    map.iter()
        .filter(|(term, _)| !exclusion.contains_key(*term))
        .map(|(term, value)| (term.clone(), value.clone()))
        .collect()
}

/// Concatenate two id lists, keeping the first occurrence of every id
pub fn merge_and_deduplicate(first: &[String], second: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(first.len() + second.len());
    let mut merged = Vec::with_capacity(first.len() + second.len());
    for id in first.iter().chain(second) {
        if seen.insert(id.as_str()) {
            merged.push(id.clone());
        }
    }
    merged
}

/// Drop repeated ids in place, keeping the first occurrence
pub fn deduplicate_in_place(ids: &mut Vec<String>) {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.retain(|id| seen.insert(id.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> TermCounts {
        pairs.iter().map(|(t, c)| (t.to_string(), *c)).collect()
    }

    #[test]
    fn test_combine_sums_shared_terms() {
        let a = counts(&[("termA", 2), ("termB", 3)]);
        let b = counts(&[("termA", 1), ("termC", 4)]);
        let combined = combine([&a, &b]);
        assert_eq!(combined, counts(&[("termA", 3), ("termB", 3), ("termC", 4)]));
    }

    #[test]
    fn test_combine_is_order_independent() {
        let a = counts(&[("x", 1), ("y", 2)]);
        let b = counts(&[("y", 5)]);
        let c = counts(&[("z", 7), ("x", 1)]);
        assert_eq!(combine([&a, &b, &c]), combine([&c, &a, &b]));
    }

    #[test]
    fn test_combine_empty() {
        let empty: Vec<&TermCounts> = Vec::new();
        assert!(combine(empty).is_empty());
    }

    #[test]
    fn test_exclude_drops_baseline_terms() {
        let map = counts(&[("graph", 4), ("citation", 2), ("network", 1)]);
        let own = counts(&[("graph", 1)]);
        let result = exclude(&map, &own);
        assert_eq!(result, counts(&[("citation", 2), ("network", 1)]));
    }

    #[test]
    fn test_merge_and_deduplicate_keeps_first_order() {
        let a = vec!["3".to_string(), "4".to_string()];
        let b = vec!["4".to_string(), "7".to_string(), "3".to_string()];
        assert_eq!(merge_and_deduplicate(&a, &b), vec!["3", "4", "7"]);
        assert!(merge_and_deduplicate(&[], &[]).is_empty());
    }

    #[test]
    fn test_deduplicate_in_place() {
        let mut ids = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        deduplicate_in_place(&mut ids);
        assert_eq!(ids, vec!["a", "b"]);
    }
}
