//! Key moment selection.
//!
//! Candidates come from four sources: structural (first and last segment),
//! topic matches, multi-speaker windows and, when still short, the longest
//! unused segments. Candidates are deduplicated greedily by importance so no
//! two kept moments start within the proximity window, truncated, then
//! returned in time order.

// Allow cast_precision_loss and cast_possible_truncation for window bucketing.
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use super::segment_scorer::{
    END_SCORE, START_SCORE, conversation_score, extended_score, score_segment,
};
use crate::models::{Granularity, KeyMoment, MomentKind, TranscriptSegment};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use tracing::instrument;

/// Shortest conversation window, in seconds.
const MIN_WINDOW_SECS: f64 = 30.0;

/// Options for [`MomentSelector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentOptions {
    /// Minimum distance between kept moments, in seconds.
    pub proximity_window_secs: f64,
    /// Controls the conversation window size.
    pub granularity: Granularity,
    /// Upper bound on returned moments.
    pub max_moments: usize,
}

impl Default for MomentOptions {
    fn default() -> Self {
        Self {
            proximity_window_secs: 30.0,
            granularity: Granularity::Medium,
            max_moments: 5,
        }
    }
}

impl MomentOptions {
    /// Builds options for a granularity, adjusting the requested count for it.
    #[must_use]
    pub fn for_granularity(granularity: Granularity, requested: usize) -> Self {
        Self {
            granularity,
            max_moments: granularity.adjust_moment_count(requested),
            ..Self::default()
        }
    }

    /// Sets the proximity window.
    #[must_use]
    pub const fn with_proximity_window(mut self, secs: f64) -> Self {
        self.proximity_window_secs = secs;
        self
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    index: usize,
    moment: KeyMoment,
}

/// Picks a bounded, time-ordered set of key moments from a transcript.
#[derive(Debug, Clone, Default)]
pub struct MomentSelector {
    options: MomentOptions,
}

impl MomentSelector {
    /// Creates a selector.
    #[must_use]
    pub const fn new(options: MomentOptions) -> Self {
        Self { options }
    }

    /// Returns the selector's options.
    #[must_use]
    pub const fn options(&self) -> &MomentOptions {
        &self.options
    }

    /// Selects key moments.
    ///
    /// An empty transcript yields an empty result.
    #[instrument(
        skip(self, segments, topics),
        fields(operation = "select_moments", segments = segments.len(), topics = topics.len())
    )]
    pub fn select(&self, segments: &[TranscriptSegment], topics: &[String]) -> Vec<KeyMoment> {
        let max = self.options.max_moments;
        if segments.is_empty() || max == 0 {
            return Vec::new();
        }

        let mut ordered: Vec<&TranscriptSegment> = segments.iter().collect();
        ordered.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        let mut candidates = structural_candidates(&ordered);
        candidates.extend(topic_candidates(&ordered, topics));
        candidates.extend(self.conversation_candidates(&ordered));

        let mut kept = self.deduplicate(candidates.clone());
        if kept.len() < max {
            let used: HashSet<usize> = candidates.iter().map(|c| c.index).collect();
            candidates.extend(extended_candidates(&ordered, &used));
            kept = self.deduplicate(candidates);
        }

        kept.truncate(max);
        let mut moments: Vec<KeyMoment> = kept.into_iter().map(|c| c.moment).collect();
        moments.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        metrics::counter!("key_moments_selected_total").increment(moments.len() as u64);
        tracing::debug!(selected = moments.len(), "Selected key moments");
        moments
    }

    fn conversation_candidates(&self, ordered: &[&TranscriptSegment]) -> Vec<Candidate> {
        let (Some(first), Some(last)) = (ordered.first(), ordered.last()) else {
            return Vec::new();
        };
        let origin = first.start_time;
        let duration = (last.end() - origin).max(0.0);
        let window =
            (duration / f64::from(self.options.granularity.window_divisor())).max(MIN_WINDOW_SECS);

        let mut candidates = Vec::new();
        let mut bucket_start = 0;
        while bucket_start < ordered.len() {
            let bucket = ((ordered[bucket_start].start_time - origin) / window).floor() as u64;
            let bucket_end = ordered[bucket_start..]
                .iter()
                .position(|s| ((s.start_time - origin) / window).floor() as u64 != bucket)
                .map_or(ordered.len(), |offset| bucket_start + offset);

            let speakers: BTreeSet<&str> = ordered[bucket_start..bucket_end]
                .iter()
                .map(|s| s.speaker.as_str())
                .collect();
            if speakers.len() >= 2 {
                let head = ordered[bucket_start];
                let importance = conversation_score(speakers.len());
                candidates.push(Candidate {
                    index: bucket_start,
                    moment: KeyMoment {
                        start_time: head.start_time,
                        speaker: head.speaker.clone(),
                        description: format!(
                            "Conversation between {}",
                            speakers.into_iter().collect::<Vec<_>>().join(", ")
                        ),
                        importance,
                        kind: MomentKind::Conversation,
                    },
                });
            }
            bucket_start = bucket_end;
        }
        candidates
    }

    fn deduplicate(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.sort_by(rank);
        let window = self.options.proximity_window_secs.max(0.0);
        let mut kept: Vec<Candidate> = Vec::new();
        for candidate in candidates {
            let clashes = kept.iter().any(|k| {
                k.index == candidate.index
                    || (k.moment.start_time - candidate.moment.start_time).abs() < window
            });
            if !clashes {
                kept.push(candidate);
            }
        }
        kept
    }
}

/// Importance descending, then earlier start, then earlier segment.
fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.moment
        .importance
        .total_cmp(&a.moment.importance)
        .then_with(|| a.moment.start_time.total_cmp(&b.moment.start_time))
        .then_with(|| a.index.cmp(&b.index))
}

fn structural_candidates(ordered: &[&TranscriptSegment]) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(2);
    if let Some(first) = ordered.first() {
        candidates.push(Candidate {
            index: 0,
            moment: KeyMoment {
                start_time: first.start_time,
                speaker: first.speaker.clone(),
                description: "Meeting start".to_string(),
                importance: START_SCORE,
                kind: MomentKind::Structural,
            },
        });
    }
    if ordered.len() > 1 {
        let index = ordered.len() - 1;
        let last = ordered[index];
        candidates.push(Candidate {
            index,
            moment: KeyMoment {
                start_time: last.start_time,
                speaker: last.speaker.clone(),
                description: "Meeting conclusion".to_string(),
                importance: END_SCORE,
                kind: MomentKind::Structural,
            },
        });
    }
    candidates
}

fn topic_candidates(ordered: &[&TranscriptSegment], topics: &[String]) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    topics
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .filter_map(|topic| {
            let (index, score) = ordered
                .iter()
                .enumerate()
                .filter_map(|(i, s)| score_segment(s, topic).map(|score| (i, score)))
                // Strictly greater keeps the earliest segment on ties.
                .fold(None, |best: Option<(usize, f64)>, (i, score)| match best {
                    Some((_, top)) if top >= score => best,
                    _ => Some((i, score)),
                })?;
            let segment = ordered[index];
            Some(Candidate {
                index,
                moment: KeyMoment {
                    start_time: segment.start_time,
                    speaker: segment.speaker.clone(),
                    description: format!("Discussion about \"{topic}\""),
                    importance: score,
                    kind: MomentKind::TopicMatch,
                },
            })
        })
        .collect()
}

fn extended_candidates(ordered: &[&TranscriptSegment], used: &HashSet<usize>) -> Vec<Candidate> {
    ordered
        .iter()
        .enumerate()
        .filter(|(i, s)| !used.contains(i) && s.word_count() > 0)
        .map(|(index, segment)| Candidate {
            index,
            moment: KeyMoment {
                start_time: segment.start_time,
                speaker: segment.speaker.clone(),
                description: format!("Extended discussion by {}", segment.speaker),
                importance: extended_score(segment.word_count()),
                kind: MomentKind::ExtendedDiscussion,
            },
        })
        .collect()
}
