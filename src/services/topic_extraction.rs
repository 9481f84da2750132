//! Topic extraction from transcript text.
//!
//! Word and n-gram frequency analysis. Phrases are counted within a single
//! segment (never across a speaker change) and only qualify after repeating.

// Allow cast_precision_loss for frequency counts converted to weights.
#![allow(clippy::cast_precision_loss)]

use crate::models::TranscriptSegment;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tracing::instrument;

/// Words never reported as topics, nor as part of a phrase.
pub static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // Articles, conjunctions, auxiliaries
        "a", "an", "the", "and", "or", "but", "is", "are", "was", "were", "be", "been", "being",
        // Prepositions
        "in", "on", "at", "to", "for", "with", "by", "about", "like", "through", "over", "before",
        "after", "between", "under", "above", "of", "during", "from", "into", "onto", "upon",
        // Demonstratives and pronouns
        "this", "that", "these", "those", "it", "its", "it's", "we", "our", "us", "they",
        "their", "them", "i", "my", "me", "he", "his", "him", "she", "her", "you", "your",
        "there", "here", "what", "which", "who", "whom", "when", "where", "why", "how",
        // Modals
        "have", "has", "had", "do", "does", "did", "will", "would", "shall", "should", "can",
        "could", "may", "might", "must",
        // Adverbs
        "just", "very", "so", "too", "also", "as", "then", "than", "only", "even", "still",
        "again", "much", "more", "most", "some", "any", "each", "every", "other", "such",
        // Contractions
        "i'm", "i've", "i'll", "i'd", "we're", "we've", "we'll", "you're", "you've", "you'll",
        "they're", "they've", "that's", "there's", "what's", "let's", "don't", "doesn't",
        "didn't", "can't", "won't", "isn't", "aren't", "wasn't", "haven't", "wouldn't",
        "couldn't", "shouldn't",
        // Conversational filler
        "yeah", "okay", "right", "well", "really", "actually", "basically", "know", "think",
        "thing", "things", "going", "gonna", "want", "wanna", "mean", "sure", "kind", "sort",
        "maybe", "something", "anything", "everything", "stuff", "good", "great", "thanks",
        "thank", "hello", "everyone", "people", "yes", "no", "not", "all", "get", "got",
        "said", "say", "says", "see", "look", "come", "make", "take", "because", "though",
        "into", "been", "being", "lot", "lots", "little", "able", "need", "needs",
    ]
    .into_iter()
    .collect()
});

/// Tuning for [`TopicExtractor`].
#[derive(Debug, Clone, PartialEq)]
pub struct TopicExtractorConfig {
    /// Minimum characters for a token to count (tokens must be longer than 3).
    pub min_word_len: usize,
    /// Shortest phrase length in tokens.
    pub min_ngram: usize,
    /// Longest phrase length in tokens.
    pub max_ngram: usize,
    /// Occurrences a phrase needs to qualify.
    pub min_phrase_count: usize,
    /// Multiplier applied to phrase counts so phrases outrank single words.
    pub phrase_weight: f64,
}

impl Default for TopicExtractorConfig {
    fn default() -> Self {
        Self {
            min_word_len: 4,
            min_ngram: 2,
            max_ngram: 4,
            min_phrase_count: 2,
            phrase_weight: 2.0,
        }
    }
}

/// A candidate topic with its combined score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Lowercase word or phrase.
    pub label: String,
    /// Frequency-derived weight.
    pub weight: f64,
}

/// Extracts ranked candidate topics from transcript text.
#[derive(Debug, Clone, Default)]
pub struct TopicExtractor {
    config: TopicExtractorConfig,
}

impl TopicExtractor {
    /// Creates an extractor with default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor with explicit tuning.
    #[must_use]
    pub fn with_config(mut config: TopicExtractorConfig) -> Self {
        config.min_ngram = config.min_ngram.max(2);
        config.max_ngram = config.max_ngram.max(config.min_ngram);
        config.min_phrase_count = config.min_phrase_count.max(2);
        Self { config }
    }

    /// Returns the top `count` topics across the given segments.
    #[instrument(skip(self, segments), fields(segments = segments.len()))]
    pub fn extract(&self, segments: &[TranscriptSegment], count: usize) -> Vec<Topic> {
        let texts: Vec<String> = segments.iter().map(TranscriptSegment::text).collect();
        self.extract_from_texts(texts.iter().map(String::as_str), count)
    }

    /// Returns only the labels of the top `count` topics.
    pub fn extract_labels(&self, segments: &[TranscriptSegment], count: usize) -> Vec<String> {
        self.extract(segments, count)
            .into_iter()
            .map(|t| t.label)
            .collect()
    }

    /// Returns the top `count` topics across independent text blocks.
    ///
    /// Phrases are counted within a block, never across blocks.
    pub fn extract_from_texts<'a>(
        &self,
        texts: impl IntoIterator<Item = &'a str>,
        count: usize,
    ) -> Vec<Topic> {
        if count == 0 {
            return Vec::new();
        }

        let mut word_counts: HashMap<String, usize> = HashMap::new();
        let mut phrase_counts: HashMap<String, usize> = HashMap::new();

        for text in texts {
            let tokens = tokenize(text);
            for token in tokens.iter().filter(|t| self.is_candidate(t)) {
                *word_counts.entry(token.clone()).or_default() += 1;
            }
            self.count_phrases(&tokens, &mut phrase_counts);
        }

        let mut topics: Vec<Topic> = word_counts
            .into_iter()
            .map(|(label, n)| Topic {
                label,
                weight: n as f64,
            })
            .chain(
                phrase_counts
                    .into_iter()
                    .filter(|(_, n)| *n >= self.config.min_phrase_count)
                    .map(|(label, n)| Topic {
                        label,
                        weight: n as f64 * self.config.phrase_weight,
                    }),
            )
            .collect();

        topics.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| a.label.cmp(&b.label))
        });
        topics.truncate(count);
        topics
    }

    fn is_candidate(&self, token: &str) -> bool {
        token.chars().count() >= self.config.min_word_len
            && !is_stop_word(token)
            && !token.chars().all(|c| c.is_ascii_digit())
    }

    fn count_phrases(&self, tokens: &[String], counts: &mut HashMap<String, usize>) {
        for n in self.config.min_ngram..=self.config.max_ngram {
            for window in tokens.windows(n) {
                if window.iter().all(|t| self.is_candidate(t)) {
                    *counts.entry(window.join(" ")).or_default() += 1;
                }
            }
        }
    }
}

/// Returns true for words that are never topics.
#[must_use]
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// Lowercases, strips punctuation (keeping apostrophes) and splits on whitespace.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\'' | '\u{2019}' => cleaned.push('\''),
            '-' | '/' | '_' => cleaned.push(' '),
            c if c.is_alphanumeric() => cleaned.extend(c.to_lowercase()),
            c if c.is_whitespace() => cleaned.push(' '),
            _ => {},
        }
    }
    cleaned
        .split_whitespace()
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(texts: &[&str]) -> Vec<TranscriptSegment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TranscriptSegment::new("A", i as f64 * 10.0, t))
            .collect()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Budget, budget!! Q3-planning isn't   DONE."),
            vec!["budget", "budget", "q3", "planning", "isn't", "done"]
        );
        assert_eq!(tokenize("'quoted' words"), vec!["quoted", "words"]);
        assert!(tokenize("?!.,").is_empty());
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let extractor = TopicExtractor::new();
        assert!(extractor.extract(&[], 5).is_empty());
        assert!(extractor.extract(&segments(&["", "   "]), 5).is_empty());
    }

    #[test]
    fn test_short_and_stop_words_excluded() {
        let extractor = TopicExtractor::new();
        let topics = extractor.extract_labels(
            &segments(&["the cat and the dog were about there", "cat dog were"]),
            10,
        );
        assert!(topics.is_empty(), "got {topics:?}");
    }

    #[test]
    fn test_repeated_phrase_outranks_words() {
        let extractor = TopicExtractor::new();
        let topics = extractor.extract(
            &segments(&[
                "marketing budget review today",
                "the marketing budget is tight",
                "hiring plan",
            ]),
            5,
        );
        assert_eq!(topics[0].label, "marketing budget");
        assert!((topics[0].weight - 4.0).abs() < f64::EPSILON);
        assert!(topics.iter().any(|t| t.label == "budget"));
        assert!(!topics.iter().any(|t| t.label == "hiring plan"));
    }

    #[test]
    fn test_four_word_phrase_qualifies() {
        let extractor = TopicExtractor::new();
        let topics = extractor.extract(
            &segments(&[
                "quarterly revenue growth targets slipped",
                "again quarterly revenue growth targets",
            ]),
            20,
        );
        let phrase = topics
            .iter()
            .find(|t| t.label == "quarterly revenue growth targets")
            .unwrap();
        assert!((phrase.weight - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_phrases_do_not_span_segments() {
        let extractor = TopicExtractor::new();
        let topics = extractor.extract_labels(
            &segments(&["roadmap", "launch", "roadmap", "launch"]),
            10,
        );
        assert!(!topics.contains(&"roadmap launch".to_string()));
    }

    #[test]
    fn test_count_is_respected_and_ties_break_alphabetically() {
        let extractor = TopicExtractor::new();
        let input = segments(&["foxtrot echo delta charlie bravo alpha"]);
        let topics = extractor.extract_labels(&input, 3);
        assert_eq!(topics, vec!["alpha", "bravo", "charlie"]);
        assert!(extractor.extract(&input, 0).is_empty());
    }

    #[test]
    fn test_with_config_clamps_ngram_bounds() {
        let extractor = TopicExtractor::with_config(TopicExtractorConfig {
            min_ngram: 0,
            max_ngram: 1,
            min_phrase_count: 0,
            ..TopicExtractorConfig::default()
        });
        assert_eq!(extractor.config.min_ngram, 2);
        assert_eq!(extractor.config.max_ngram, 2);
        assert_eq!(extractor.config.min_phrase_count, 2);
    }
}
