//! Word extraction helpers shared by chunking, retrieval, and hygiene.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("invalid word regex"));

/// Lower-cased word set, no length filter.
pub fn words(text: &str) -> HashSet<String> {
    WORD.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lower-cased word set keeping only words of at least four characters.
pub fn keywords(text: &str) -> HashSet<String> {
    WORD.find_iter(&text.to_lowercase())
        .filter(|m| m.as_str().chars().count() >= 4)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lower-cased words in order of appearance, duplicates kept.
pub fn word_sequence(text: &str) -> Vec<String> {
    WORD.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_lowercases_and_dedupes() {
        let set = words("The quick THE fox");
        assert_eq!(set.len(), 3);
        assert!(set.contains("the"));
        assert!(set.contains("quick"));
        assert!(set.contains("fox"));
    }

    #[test]
    fn test_keywords_filters_short_words() {
        let set = keywords("we use the database for all data");
        assert!(set.contains("database"));
        assert!(set.contains("data"));
        assert!(!set.contains("we"));
        assert!(!set.contains("use"));
        assert!(!set.contains("the"));
    }

    #[test]
    fn test_word_sequence_keeps_order_and_duplicates() {
        let seq = word_sequence("alpha beta Alpha");
        assert_eq!(seq, vec!["alpha", "beta", "alpha"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(words("").is_empty());
        assert!(keywords("   ").is_empty());
        assert!(word_sequence("!!!").is_empty());
    }
}
