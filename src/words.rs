use crate::error::CloudError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+(?:['’][\p{L}]+)*").expect("word regex"));

/// Common English function words that carry no signal in a cloud.
const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "but", "by", "can", "could", "did", "do", "does", "for", "from", "get",
    "got", "had", "has", "have", "he", "her", "here", "him", "his", "how", "i", "if", "in",
    "into", "is", "it", "it's", "its", "just", "know", "like", "me", "more", "my", "no", "not",
    "now", "of", "on", "one", "or", "our", "out", "she", "so", "some", "that", "that's", "the",
    "their", "them", "then", "there", "they", "this", "to", "up", "us", "was", "we", "were",
    "what", "when", "which", "who", "will", "with", "would", "you", "your",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: u32,
}

/// Word occurrence counts for one layout call.
///
/// Words are unique; inserting a word twice sums its counts. Insertion order is
/// preserved and acts as the tie-break between equal counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCounts {
    entries: Vec<WordFrequency>,
    index: HashMap<String, usize>,
}

impl WordCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WordFrequency> {
        self.entries.iter()
    }

    pub fn get(&self, word: &str) -> Option<u32> {
        self.index.get(word).map(|&idx| self.entries[idx].count)
    }

    /// Add `count` occurrences of `word`. Empty words and zero counts are
    /// ignored.
    pub fn add(&mut self, word: impl Into<String>, count: u32) {
        let word = word.into();
        if word.is_empty() || count == 0 {
            return;
        }
        if let Some(&idx) = self.index.get(&word) {
            let entry = &mut self.entries[idx];
            entry.count = entry.count.saturating_add(count);
            return;
        }
        self.index.insert(word.clone(), self.entries.len());
        self.entries.push(WordFrequency { word, count });
    }

    /// Entries sorted by descending count; equal counts keep insertion order.
    pub fn sorted(&self) -> Vec<WordFrequency> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted
    }

    pub fn min_max(&self) -> Option<(u32, u32)> {
        let min = self.entries.iter().map(|e| e.count).min()?;
        let max = self.entries.iter().map(|e| e.count).max()?;
        Some((min, max))
    }

    /// Parse the backend aggregation payload. Both `{"word_counts": {...}}` and
    /// a bare `{word: count}` object are accepted.
    pub fn from_json(input: &str) -> Result<Self, CloudError> {
        let value: serde_json::Value = serde_json::from_str(input)?;
        let object = match value.get("word_counts") {
            Some(inner) => inner.as_object(),
            None => value.as_object(),
        }
        .ok_or(CloudError::NotAnObject)?;

        let mut counts = WordCounts::new();
        for (word, raw) in object {
            if word.trim().is_empty() {
                return Err(CloudError::EmptyWord);
            }
            let count = raw
                .as_u64()
                .or_else(|| {
                    raw.as_f64()
                        .filter(|c| c.is_finite() && c.fract() == 0.0 && *c <= u32::MAX as f64)
                        .map(|c| c as u64)
                })
                .and_then(|c| u32::try_from(c).ok())
                .filter(|&c| c >= 1)
                .ok_or_else(|| CloudError::invalid_count(word.as_str()))?;
            counts.add(word.clone(), count);
        }
        Ok(counts)
    }

    /// Count words in raw transcript text. Tokens are lower-cased; stop words
    /// and tokens shorter than `min_len` characters are skipped.
    pub fn from_text(text: &str, min_len: usize) -> Self {
        let mut counts = WordCounts::new();
        for token in WORD_RE.find_iter(text) {
            let word = token.as_str().to_lowercase().replace('’', "'");
            if word.chars().count() < min_len || is_stop_word(&word) {
                continue;
            }
            if word.chars().all(|ch| ch.is_ascii_digit()) {
                continue;
            }
            counts.add(word, 1);
        }
        counts
    }
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

impl<K: Into<String>> FromIterator<(K, u32)> for WordCounts {
    fn from_iter<T: IntoIterator<Item = (K, u32)>>(iter: T) -> Self {
        let mut counts = WordCounts::new();
        for (word, count) in iter {
            counts.add(word, count);
        }
        counts
    }
}

impl<K: Into<String>> Extend<(K, u32)> for WordCounts {
    fn extend<T: IntoIterator<Item = (K, u32)>>(&mut self, iter: T) {
        for (word, count) in iter {
            self.add(word, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_words_are_sorted_for_binary_search() {
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOP_WORDS);
    }

    #[test]
    fn duplicates_merge_and_keep_first_position() {
        let counts: WordCounts = [("news", 3), ("sports", 5), ("news", 4)].into_iter().collect();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get("news"), Some(7));
        assert_eq!(counts.iter().next().unwrap().word, "news");
    }

    #[test]
    fn zero_counts_and_empty_words_are_ignored() {
        let counts: WordCounts = [("", 3), ("quiet", 0), ("loud", 1)].into_iter().collect();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("loud"), Some(1));
    }

    #[test]
    fn sorting_is_stable_for_equal_counts() {
        let counts: WordCounts = [("b", 2), ("a", 2), ("c", 9), ("d", 2)].into_iter().collect();
        let order: Vec<String> = counts.sorted().into_iter().map(|e| e.word).collect();
        assert_eq!(order, vec!["c", "b", "a", "d"]);
    }

    #[test]
    fn parses_backend_payload() {
        let counts =
            WordCounts::from_json(r#"{"word_counts": {"election": 12, "weather": 3}}"#).unwrap();
        assert_eq!(counts.get("election"), Some(12));
        assert_eq!(counts.get("weather"), Some(3));
        assert_eq!(counts.min_max(), Some((3, 12)));
    }

    #[test]
    fn parses_bare_object_and_rejects_bad_counts() {
        assert_eq!(WordCounts::from_json(r#"{"x": 2.0}"#).unwrap().get("x"), Some(2));
        assert!(matches!(
            WordCounts::from_json(r#"{"x": 0}"#),
            Err(CloudError::InvalidCount { .. })
        ));
        assert!(matches!(
            WordCounts::from_json(r#"{"x": "many"}"#),
            Err(CloudError::InvalidCount { .. })
        ));
        assert!(matches!(
            WordCounts::from_json("[1, 2]"),
            Err(CloudError::NotAnObject)
        ));
    }

    #[test]
    fn rejects_counts_beyond_u32() {
        assert!(matches!(
            WordCounts::from_json(r#"{"a": 5000000000, "b": 4294967295}"#),
            Err(CloudError::InvalidCount { word }) if word == "a"
        ));
        assert!(matches!(
            WordCounts::from_json(r#"{"a": 5e9}"#),
            Err(CloudError::InvalidCount { .. })
        ));
        let max = WordCounts::from_json(r#"{"b": 4294967295}"#).unwrap();
        assert_eq!(max.get("b"), Some(u32::MAX));
    }

    #[test]
    fn tokenizes_transcript_text() {
        let counts = WordCounts::from_text(
            "The Mayor said the budget vote is Tuesday. Budget talks, budget cuts! 2024",
            3,
        );
        assert_eq!(counts.get("budget"), Some(3));
        assert_eq!(counts.get("mayor"), Some(1));
        assert_eq!(counts.get("the"), None);
        assert_eq!(counts.get("is"), None);
        assert_eq!(counts.get("2024"), None);
    }

    #[test]
    fn keeps_contractions_together() {
        let counts = WordCounts::from_text("Don’t stop, don't stop", 2);
        assert_eq!(counts.get("don't"), Some(2));
        assert_eq!(counts.get("stop"), Some(2));
    }
}
