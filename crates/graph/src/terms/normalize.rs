//! Baseline term extraction
//!
//! Turns a title and abstract into a term-frequency map for records that
//! arrive without one. Deliberately shallow: lowercase, strip punctuation,
//! drop short tokens, numbers and English stop words. No stemming and no
//! language detection.

use crate::model::TermCounts;

/// Tokens shorter than this are ignored
const MIN_TOKEN_CHARS: usize = 3;

/// English stop words
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "an", "and", "any",
    "are", "aren", "aren't", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "couldn", "couldn't", "d", "did", "didn", "didn't",
    "do", "does", "doesn", "doesn't", "doing", "don", "don't", "down", "during", "each", "few",
    "for", "from", "further", "had", "hadn", "hadn't", "has", "hasn", "hasn't", "have", "haven",
    "haven't", "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how",
    "i", "if", "in", "into", "is", "isn", "isn't", "it", "it's", "its", "itself", "just", "ll",
    "m", "ma", "me", "mightn", "mightn't", "more", "most", "mustn", "mustn't", "my", "myself",
    "needn", "needn't", "no", "nor", "not", "now", "o", "of", "off", "on", "once", "only", "or",
    "other", "our", "ours", "ourselves", "out", "over", "own", "re", "s", "same", "shan",
    "shan't", "she", "she's", "should", "should've", "shouldn", "shouldn't", "so", "some",
    "such", "t", "than", "that", "that'll", "the", "their", "theirs", "them", "themselves",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "ve", "very", "was", "wasn", "wasn't", "we", "were", "weren", "weren't", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "won", "won't",
    "wouldn", "wouldn't", "y", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
    "yourself", "yourselves",
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Split text into normalized tokens
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|&c| is_word_char(c) || c.is_whitespace() || c == '-' || c == '@')
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|token| {
            // Must start with a letter (or underscore), which also rules out pure numbers
            token
                .chars()
                .next()
                .map(|c| is_word_char(c) && !c.is_numeric())
                .unwrap_or(false)
        })
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

/// Count normalized terms of a title/abstract pair
///
/// Records tagged with a language other than English get an empty map: the
/// stop-word list would let their function words through as terms.
pub fn extract_term_frequencies(
    title: &str,
    abstract_text: &str,
    language: Option<&str>,
) -> TermCounts {
    if let Some(language) = language {
        if !language.is_empty() && !language.eq_ignore_ascii_case("en") {
            return TermCounts::new();
        }
    }

    let mut counts = TermCounts::new();
    for token in tokenize(&format!("{} {}", title, abstract_text)) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_filters_short_numeric_and_stop_words() {
        let tokens = tokenize("The 3D citation-graph of 2024: a study in co-citation analysis!");
        assert_eq!(
            tokens,
            vec!["citation-graph", "study", "co-citation", "analysis"]
        );
    }

    #[test]
    fn test_tokenize_keeps_unicode_words() {
        let tokens = tokenize("Schrödinger équations");
        assert_eq!(tokens, vec!["schrödinger", "équations"]);
    }

    #[test]
    fn test_tokenize_drops_leading_symbols() {
        assert_eq!(tokenize("@mention -dash _under"), vec!["_under"]);
    }

    #[test]
    fn test_extract_counts_occurrences() {
        let counts =
            extract_term_frequencies("Graph mining", "Mining citation graph data", Some("en"));
        assert_eq!(counts.get("graph"), Some(&2));
        assert_eq!(counts.get("mining"), Some(&2));
        assert_eq!(counts.get("citation"), Some(&1));
        assert_eq!(counts.get("data"), Some(&1));
    }

    #[test]
    fn test_extract_skips_non_english() {
        assert!(extract_term_frequencies("Graphentheorie", "Zitationen", Some("de")).is_empty());
        assert!(!extract_term_frequencies("Graph theory", "", None).is_empty());
    }

    #[test]
    fn test_extract_empty_text() {
        assert!(extract_term_frequencies("", "", Some("en")).is_empty());
    }
}
