//! Search strategy, constraints and hits.

use super::{MeetingSummary, TranscriptSegment};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordering applied to search hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Highest segment score first (default).
    #[default]
    Relevance,
    /// Newest meeting first, then by time within the meeting.
    Date,
    /// Alphabetical by speaker, then by time.
    Speaker,
}

impl SortBy {
    /// Parses a sort order, defaulting to relevance.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "date" => Self::Date,
            "speaker" => Self::Speaker,
            _ => Self::Relevance,
        }
    }
}

/// A window into a recording, in seconds. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive lower bound on segment start.
    pub start: Option<f64>,
    /// Inclusive upper bound on segment end.
    pub end: Option<f64>,
}

impl TimeRange {
    /// Creates a closed range.
    #[must_use]
    pub const fn between(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Returns true if the segment lies fully inside the range.
    #[must_use]
    pub fn contains(&self, segment: &TranscriptSegment) -> bool {
        self.start.is_none_or(|start| segment.start_time >= start)
            && self.end.is_none_or(|end| segment.end() <= end)
    }

    /// Returns true if neither bound is set.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// A relative date phrase detected in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelativeDate {
    /// "today"
    Today,
    /// "yesterday"
    Yesterday,
    /// "this week"
    ThisWeek,
    /// "last week" / "recently"
    LastWeek,
    /// "last month"
    LastMonth,
}

impl RelativeDate {
    /// Resolves the phrase to a calendar window relative to `now`.
    #[must_use]
    pub fn resolve(self, now: DateTime<Utc>) -> DateWindow {
        let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let (start, end) = match self {
            Self::Today => (midnight, now),
            Self::Yesterday => (midnight - Duration::days(1), midnight),
            Self::ThisWeek => (now - Duration::days(7), now),
            Self::LastWeek => (now - Duration::days(14), now - Duration::days(7)),
            Self::LastMonth => (now - Duration::days(30), now),
        };
        DateWindow { start, end }
    }
}

/// Absolute calendar window used when listing calendar events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
}

/// Filters extracted from a query or supplied explicitly, shared by all strategies.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchConstraints {
    /// Speaker name fragment.
    pub speaker: Option<String>,
    /// Time window inside a recording.
    pub time_range: Option<TimeRange>,
    /// Topic or subject phrase.
    pub topic: Option<String>,
    /// Relative date phrase, resolved only for calendar searches.
    pub relative_date: Option<RelativeDate>,
}

impl SearchConstraints {
    /// Returns true if segments must be filtered by time or speaker.
    #[must_use]
    pub fn is_segment_filtered(&self) -> bool {
        self.speaker.is_some() || self.time_range.is_some_and(|r| !r.is_open())
    }
}

/// The search approach chosen for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum SearchStrategy {
    /// A single identified meeting.
    SpecificMeeting {
        /// Bot / recording identifier.
        meeting_id: String,
        /// Additional filters.
        constraints: SearchConstraints,
    },
    /// All meetings carrying a type tag.
    MeetingType {
        /// Type tag, lowercase.
        meeting_type: String,
        /// Additional filters.
        constraints: SearchConstraints,
    },
    /// Recordings attached to events of one calendar.
    Calendar {
        /// Calendar identifier.
        calendar_id: String,
        /// Optional type tag to narrow events.
        meeting_type: Option<String>,
        /// Additional filters.
        constraints: SearchConstraints,
    },
    /// Meetings touched earlier in this session.
    RecentMeetings {
        /// Additional filters.
        constraints: SearchConstraints,
    },
    /// A bounded prefix of all meetings.
    GeneralFallback {
        /// Additional filters.
        constraints: SearchConstraints,
    },
}

impl SearchStrategy {
    /// Returns the strategy name used in logs and metrics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SpecificMeeting { .. } => "specific-meeting",
            Self::MeetingType { .. } => "meeting-type",
            Self::Calendar { .. } => "calendar",
            Self::RecentMeetings { .. } => "recent-meetings",
            Self::GeneralFallback { .. } => "general-fallback",
        }
    }

    /// Returns the constraints carried by the strategy.
    #[must_use]
    pub const fn constraints(&self) -> &SearchConstraints {
        match self {
            Self::SpecificMeeting { constraints, .. }
            | Self::MeetingType { constraints, .. }
            | Self::Calendar { constraints, .. }
            | Self::RecentMeetings { constraints }
            | Self::GeneralFallback { constraints } => constraints,
        }
    }
}

/// Whether a segment in a hit is the match itself or surrounding context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentRole {
    /// The matching segment.
    Match,
    /// A neighbor included for context.
    Context,
}

/// A segment inside a hit's context window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitSegment {
    /// The segment.
    pub segment: TranscriptSegment,
    /// Match or context.
    pub role: SegmentRole,
}

/// One matched segment with its originating meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Metadata of the meeting the segment came from.
    pub meeting: MeetingSummary,
    /// Recording URL of that meeting.
    pub recording_url: String,
    /// The matching segment.
    pub segment: TranscriptSegment,
    /// Relevance score.
    pub score: f64,
    /// Context window in time order, including the match; empty unless requested.
    pub context: Vec<HitSegment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_time_range_contains() {
        let range = TimeRange::between(600.0, 1200.0);
        assert!(range.contains(&TranscriptSegment::new("A", 600.0, "x")));
        assert!(range.contains(&TranscriptSegment::new("A", 1195.0, "x")));
        assert!(!range.contains(&TranscriptSegment::new("A", 1196.0, "x")));
        assert!(!range.contains(&TranscriptSegment::new("A", 599.0, "x")));

        let open_end = TimeRange {
            start: Some(60.0),
            end: None,
        };
        assert!(open_end.contains(&TranscriptSegment::new("A", 9_999.0, "x")));
    }

    #[test]
    fn test_segment_filtered() {
        let mut constraints = SearchConstraints::default();
        assert!(!constraints.is_segment_filtered());
        constraints.time_range = Some(TimeRange::default());
        assert!(!constraints.is_segment_filtered());
        constraints.speaker = Some("alice".to_string());
        assert!(constraints.is_segment_filtered());
    }

    #[test]
    fn test_relative_date_resolution() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 15, 30, 0).unwrap();
        let window = RelativeDate::Yesterday.resolve(now);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 5, 9, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap());

        let window = RelativeDate::Today.resolve(now);
        assert_eq!(window.end, now);
    }

    #[test]
    fn test_sort_by_parse() {
        assert_eq!(SortBy::parse("Date"), SortBy::Date);
        assert_eq!(SortBy::parse("speaker"), SortBy::Speaker);
        assert_eq!(SortBy::parse(""), SortBy::Relevance);
    }
}
