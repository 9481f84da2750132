//! Transcript and meeting types.
//!
//! These are the validated, typed forms of what the meeting-data API returns.
//! Raw JSON never reaches the analysis code; see `gateway::wire`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fallback length of a segment whose end time the API omitted.
pub const DEFAULT_SEGMENT_SECS: f64 = 5.0;

/// Speaker label used when the API does not attribute a segment.
pub const UNKNOWN_SPEAKER: &str = "Unknown Speaker";

/// One contiguous span of transcribed speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Speaker label, possibly [`UNKNOWN_SPEAKER`].
    pub speaker: String,
    /// Start offset in seconds from the beginning of the recording.
    pub start_time: f64,
    /// End offset in seconds, when the API provided one.
    pub end_time: Option<f64>,
    /// Word tokens in spoken order.
    pub words: Vec<String>,
}

impl TranscriptSegment {
    /// Creates a segment from a speaker, start time and whitespace-separated text.
    #[must_use]
    pub fn new(speaker: impl Into<String>, start_time: f64, text: &str) -> Self {
        Self {
            speaker: speaker.into(),
            start_time,
            end_time: None,
            words: text.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Sets an explicit end time.
    #[must_use]
    pub const fn with_end_time(mut self, end_time: f64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Returns the end offset, defaulting to five seconds after the start.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.end_time
            .unwrap_or(self.start_time + DEFAULT_SEGMENT_SECS)
    }

    /// Returns the words joined by single spaces.
    #[must_use]
    pub fn text(&self) -> String {
        self.words.join(" ")
    }

    /// Returns the number of word tokens.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}

/// Lightweight meeting metadata, as returned by the meeting listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeetingSummary {
    /// Bot / recording identifier.
    pub id: String,
    /// Display name of the recording bot, used as the meeting title.
    pub title: String,
    /// URL of the meeting the bot joined.
    pub meeting_url: Option<String>,
    /// Classification tag such as `sales` or `standup`.
    pub meeting_type: Option<String>,
    /// When the recording was created.
    pub created_at: Option<DateTime<Utc>>,
    /// Email of the user who created the bot.
    pub creator_email: Option<String>,
    /// Known participant names.
    pub participants: Vec<String>,
}

impl MeetingSummary {
    /// Returns true if the meeting carries the given type tag (case-insensitive).
    #[must_use]
    pub fn has_type(&self, meeting_type: &str) -> bool {
        self.meeting_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(meeting_type))
    }
}

/// A fully fetched meeting with its transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    /// Metadata shared with the listing form.
    pub summary: MeetingSummary,
    /// Direct URL of the recording video.
    pub recording_url: String,
    /// Recording length reported by the API, in seconds.
    pub duration_secs: Option<f64>,
    /// Segments sorted ascending by start time.
    pub segments: Vec<TranscriptSegment>,
}

impl Meeting {
    /// Creates a meeting, sorting segments by start time.
    #[must_use]
    pub fn new(
        summary: MeetingSummary,
        recording_url: impl Into<String>,
        mut segments: Vec<TranscriptSegment>,
    ) -> Self {
        segments.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        Self {
            summary,
            recording_url: recording_url.into(),
            duration_secs: None,
            segments,
        }
    }

    /// Sets the reported recording duration.
    #[must_use]
    pub const fn with_duration(mut self, duration_secs: f64) -> Self {
        self.duration_secs = Some(duration_secs);
        self
    }

    /// Returns the meeting identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.summary.id
    }

    /// Returns the meeting title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.summary.title
    }

    /// Returns the effective duration: reported, else the last segment's end.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration_secs
            .or_else(|| self.segments.last().map(TranscriptSegment::end))
            .unwrap_or(0.0)
    }

    /// Returns the distinct speakers in order of first appearance.
    #[must_use]
    pub fn speakers(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.segments
            .iter()
            .filter(|s| seen.insert(s.speaker.as_str()))
            .map(|s| s.speaker.clone())
            .collect()
    }

    /// Returns participants from metadata, else the transcript speakers.
    #[must_use]
    pub fn participants(&self) -> Vec<String> {
        if self.summary.participants.is_empty() {
            self.speakers()
        } else {
            self.summary.participants.clone()
        }
    }
}

/// A calendar event, optionally with an attached recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event identifier.
    pub id: String,
    /// Event title.
    pub name: String,
    /// Scheduled start.
    pub start_time: DateTime<Utc>,
    /// Identifier of the recording bot attached to the event, if any.
    pub meeting_id: Option<String>,
    /// Classification tag carried by the bot parameters, if any.
    pub meeting_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_end_defaults_to_five_seconds() {
        let segment = TranscriptSegment::new("Alice", 12.0, "hello there");
        assert!((segment.end() - 17.0).abs() < f64::EPSILON);

        let segment = segment.with_end_time(14.5);
        assert!((segment.end() - 14.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_segment_text_and_word_count() {
        let segment = TranscriptSegment::new("Bob", 0.0, "  let's   talk budget ");
        assert_eq!(segment.text(), "let's talk budget");
        assert_eq!(segment.word_count(), 3);
    }

    #[test]
    fn test_meeting_sorts_segments() {
        let meeting = Meeting::new(
            MeetingSummary {
                id: "m1".to_string(),
                ..MeetingSummary::default()
            },
            "https://example.com/m1.mp4",
            vec![
                TranscriptSegment::new("B", 30.0, "second"),
                TranscriptSegment::new("A", 0.0, "first"),
            ],
        );
        assert_eq!(meeting.segments[0].text(), "first");
        assert!((meeting.duration() - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_speakers_in_first_appearance_order() {
        let meeting = Meeting::new(
            MeetingSummary::default(),
            "",
            vec![
                TranscriptSegment::new("Carol", 0.0, "a"),
                TranscriptSegment::new("Alice", 5.0, "b"),
                TranscriptSegment::new("Carol", 10.0, "c"),
            ],
        );
        assert_eq!(meeting.speakers(), vec!["Carol", "Alice"]);
        assert_eq!(meeting.participants(), vec!["Carol", "Alice"]);
    }

    #[test]
    fn test_has_type_is_case_insensitive() {
        let summary = MeetingSummary {
            meeting_type: Some("Sales".to_string()),
            ..MeetingSummary::default()
        };
        assert!(summary.has_type("sales"));
        assert!(!summary.has_type("standup"));
    }
}
