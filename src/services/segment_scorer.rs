//! Segment importance scoring.
//!
//! Topic matches are scored from occurrence count, the position of the first
//! occurrence and segment length, clamped to [`MAX_TOPIC_SCORE`]. Structural
//! moments use fixed constants above that clamp.

// Allow cast_precision_loss for word and speaker counts used in scores.
#![allow(clippy::cast_precision_loss)]

use crate::models::TranscriptSegment;

/// Score of the meeting's first segment.
pub const START_SCORE: f64 = 12.0;

/// Score of the meeting's last segment.
pub const END_SCORE: f64 = 11.0;

/// Upper bound for any topic-match score.
pub const MAX_TOPIC_SCORE: f64 = 10.0;

/// Weights for a topic-match score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    /// Awarded to any segment containing the topic.
    pub base: f64,
    /// Added per occurrence.
    pub per_occurrence: f64,
    /// Maximum bonus for an occurrence at the very start of the text.
    pub max_position_bonus: f64,
    /// Maximum bonus for long segments.
    pub max_length_bonus: f64,
    /// Word count that earns the full length bonus.
    pub length_bonus_words: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            base: 3.0,
            per_occurrence: 2.0,
            max_position_bonus: 2.0,
            max_length_bonus: 1.0,
            length_bonus_words: 50.0,
        }
    }
}

/// Scores a text against a topic with default weights.
///
/// Returns `None` if the topic does not occur (case-insensitive substring).
#[must_use]
pub fn score_topic(text: &str, topic: &str) -> Option<f64> {
    score_topic_with(&ScoreWeights::default(), text, topic)
}

/// Scores a text against a topic.
#[must_use]
pub fn score_topic_with(weights: &ScoreWeights, text: &str, topic: &str) -> Option<f64> {
    let needle = topic.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    let haystack = text.to_lowercase();
    let first = haystack.find(&needle)?;
    let occurrences = haystack.matches(needle.as_str()).count();

    let position = 1.0 - first as f64 / haystack.len().max(1) as f64;
    let words = text.split_whitespace().count() as f64;
    let length = (words / weights.length_bonus_words).min(1.0) * weights.max_length_bonus;

    let score = weights.base
        + weights.per_occurrence * occurrences as f64
        + weights.max_position_bonus * position
        + length;
    Some(score.min(MAX_TOPIC_SCORE))
}

/// Scores a segment against a topic.
#[must_use]
pub fn score_segment(segment: &TranscriptSegment, topic: &str) -> Option<f64> {
    score_topic(&segment.text(), topic)
}

/// Score of a multi-speaker window: 2.0 plus 0.5 per distinct speaker, at most 5.0.
#[must_use]
pub fn conversation_score(distinct_speakers: usize) -> f64 {
    (2.0 + 0.5 * distinct_speakers as f64).min(5.0)
}

/// Score of a long contribution: 1.0 plus one point per 100 words, at most 3.0.
#[must_use]
pub fn extended_score(word_count: usize) -> f64 {
    (1.0 + word_count as f64 / 100.0).min(3.0)
}
