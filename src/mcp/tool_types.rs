//! Argument types and helper functions for MCP tools.
//!
//! All argument types use `#[serde(deny_unknown_fields)]`, so a misspelled
//! parameter fails loudly instead of silently falling back to a default.

use crate::models::{Granularity, RecordingMode, SortBy, TranscriptionProvider};
use crate::services::ExplicitFilters;
use crate::services::formatting::SharedSegment;
use crate::{Error, Result};
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

/// Maximum allowed length for free-text query fields.
pub const MAX_QUERY_LENGTH: usize = 10_240; // 10 KB

/// Maximum allowed length for identifiers (bot, calendar).
pub const MAX_ID_LENGTH: usize = 256;

/// Maximum allowed length for titles, names and descriptions.
pub const MAX_TEXT_LENGTH: usize = 4_096;

/// Upper bound for result and meeting limits.
pub const MAX_RESULT_LIMIT: usize = 50;

/// Upper bound for moments requested from `findKeyMoments`.
pub const MAX_MOMENTS: usize = 50;

/// Upper bound for segments shared in one call.
pub const MAX_SHARED_SEGMENTS: usize = 100;

/// Arguments for `findKeyMoments`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FindKeyMomentsArgs {
    /// Meeting to analyze.
    pub bot_id: String,
    /// Title used in the output instead of the recorded one.
    pub meeting_title: Option<String>,
    /// Topics to look for.
    pub topics: Option<Vec<String>>,
    /// Requested number of moments before granularity adjustment.
    #[serde(default = "default_max_moments")]
    pub max_moments: usize,
    /// Level of detail.
    #[serde(default)]
    pub granularity: Granularity,
    /// Detect topics from the transcript even when topics are supplied.
    #[serde(default)]
    pub auto_detect_topics: bool,
}

/// Arguments for `searchTranscript`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchTranscriptArgs {
    /// Meeting to search.
    pub bot_id: String,
    /// Text to find.
    pub query: String,
}

/// Arguments for `searchTranscriptByType`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchByTypeArgs {
    /// Meeting type tag.
    pub meeting_type: String,
    /// Text to find.
    pub query: String,
    /// Maximum meetings searched and results returned.
    #[serde(default = "default_type_limit")]
    pub limit: usize,
}

/// Arguments for `findMeetingTopic`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FindMeetingTopicArgs {
    /// Meeting to search.
    pub bot_id: String,
    /// Topic phrase.
    pub topic: String,
}

/// Arguments for `searchVideoSegment`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchVideoSegmentArgs {
    /// Meeting to search.
    pub bot_id: String,
    /// Window start in seconds.
    pub start_time: Option<f64>,
    /// Window end in seconds.
    pub end_time: Option<f64>,
    /// Speaker name fragment.
    pub speaker: Option<String>,
}

/// Arguments for `intelligentSearch`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IntelligentSearchArgs {
    /// Natural-language query.
    pub query: String,
    /// Filters overriding values parsed from the query.
    #[serde(default)]
    pub filters: ExplicitFilters,
    /// Attach neighboring segments to each hit.
    #[serde(default = "default_true")]
    pub include_context: bool,
    /// Maximum hits returned.
    pub max_results: Option<usize>,
    /// `relevance`, `date` or `speaker`.
    pub sort_by: Option<String>,
}

impl IntelligentSearchArgs {
    /// Returns the requested ordering.
    #[must_use]
    pub fn sort_by(&self) -> SortBy {
        self.sort_by.as_deref().map_or(SortBy::Relevance, SortBy::parse)
    }
}

/// Arguments for `shareableMeetingLink`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShareableLinkArgs {
    /// Meeting to link.
    pub bot_id: String,
    /// Jump target in seconds.
    pub timestamp: Option<f64>,
    /// Heading for the link.
    pub title: Option<String>,
    /// Speaker at the timestamp.
    pub speaker_name: Option<String>,
    /// What happens at the timestamp.
    pub description: Option<String>,
}

/// Arguments for `shareMeetingSegments`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShareSegmentsArgs {
    /// Meeting to link.
    pub bot_id: String,
    /// Timestamps to share.
    pub segments: Vec<SharedSegment>,
}

/// Arguments for tools that take only a meeting id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BotIdArgs {
    /// Meeting id.
    pub bot_id: String,
}

/// Arguments for `listUpcomingMeetings`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpcomingMeetingsArgs {
    /// Calendar to read.
    pub calendar_id: String,
}

/// Arguments for `joinMeeting`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JoinMeetingArgs {
    /// Meeting link.
    pub meeting_url: String,
    /// Name shown for the bot.
    pub bot_name: String,
    /// Reserve a bot instead of joining immediately.
    #[serde(default)]
    pub reserved: bool,
    /// Unix timestamp to join at.
    pub start_time: Option<i64>,
    /// Recording layout.
    #[serde(default)]
    pub recording_mode: RecordingMode,
}

/// Arguments for `scheduleRecording`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScheduleRecordingArgs {
    /// Calendar event to record (UUID).
    pub event_id: String,
    /// Name shown for the bot.
    pub bot_name: String,
    /// Recording layout.
    #[serde(default)]
    pub recording_mode: RecordingMode,
}

/// Arguments for `retranscribeBot`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RetranscribeArgs {
    /// Bot whose recording is transcribed again.
    pub bot_id: String,
    /// Engine to use.
    pub speech_to_text_provider: Option<TranscriptionProvider>,
    /// Key for the engine.
    pub speech_to_text_api_key: Option<String>,
    /// Callback for completion.
    pub webhook_url: Option<String>,
}

/// Arguments for tools without parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoArgs {}

const fn default_max_moments() -> usize {
    5
}

const fn default_type_limit() -> usize {
    10
}

const fn default_true() -> bool {
    true
}

/// Deserializes tool arguments, treating `null` as an empty object.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if the arguments do not match `T`.
pub fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    let arguments = if arguments.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| Error::InvalidInput(e.to_string()))
}

/// Validates that a string input does not exceed the maximum allowed length.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if the input exceeds `max_length`.
pub fn validate_input_length(input: &str, field_name: &str, max_length: usize) -> Result<()> {
    if input.len() > max_length {
        return Err(Error::InvalidInput(format!(
            "{field_name} exceeds maximum length ({} > {max_length} bytes)",
            input.len()
        )));
    }
    Ok(())
}

/// Trims a required string field and checks it is non-empty and bounded.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if the value is blank or too long.
pub fn require_text(input: &str, field_name: &str, max_length: usize) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{field_name} must not be empty")));
    }
    validate_input_length(trimmed, field_name, max_length)?;
    Ok(trimmed.to_string())
}

/// Checks an optional timestamp is a finite, non-negative number of seconds.
///
/// # Errors
///
/// Returns `Error::InvalidInput` for negative or non-finite values.
pub fn validate_seconds(value: Option<f64>, field_name: &str) -> Result<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(Error::InvalidInput(format!(
            "{field_name} must be a non-negative number of seconds"
        ))),
        other => Ok(other),
    }
}

/// Checks a string is an absolute `http` or `https` URL.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if the value is blank, too long or not a web URL.
pub fn require_url(input: &str, field_name: &str) -> Result<String> {
    let trimmed = require_text(input, field_name, MAX_TEXT_LENGTH)?;
    match Url::parse(&trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(trimmed),
        _ => Err(Error::InvalidInput(format!("{field_name} must be an http(s) URL"))),
    }
}

/// Checks a string is a UUID and returns it in canonical form.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if the value does not parse as a UUID.
pub fn require_uuid(input: &str, field_name: &str) -> Result<String> {
    Uuid::parse_str(input.trim())
        .map(|id| id.hyphenated().to_string())
        .map_err(|_| Error::InvalidInput(format!("{field_name} must be a UUID")))
}

/// Checks a limit lies in `1..=max`.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if the limit is out of range.
pub fn validate_limit(value: usize, field_name: &str, max: usize) -> Result<usize> {
    if value == 0 || value > max {
        return Err(Error::InvalidInput(format!(
            "{field_name} must be between 1 and {max}"
        )));
    }
    Ok(value)
}

/// Finds the largest char boundary at or before `index`.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    s.char_indices()
        .map(|(offset, _)| offset)
        .take_while(|offset| *offset <= index)
        .last()
        .unwrap_or(0)
}

/// Truncates a string to at most `max_len` bytes, appending `...`.
///
/// Cuts only at UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let boundary = floor_char_boundary(s, max_len.saturating_sub(3));
    format!("{}...", &s[..boundary])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==========================================================================
    // Unknown field rejection
    // ==========================================================================

    #[test]
    fn test_key_moments_args_rejects_unknown_fields() {
        let result: Result<FindKeyMomentsArgs> =
            parse_args(json!({ "botId": "b1", "maxMoment": 3 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_intelligent_search_filters_reject_unknown_fields() {
        let result: Result<IntelligentSearchArgs> = parse_args(json!({
            "query": "budget",
            "filters": { "meetingTyp": "sales" }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_share_segments_rejects_unknown_segment_fields() {
        let result: Result<ShareSegmentsArgs> = parse_args(json!({
            "botId": "b1",
            "segments": [{ "timestamp": 1.0, "description": "x", "color": "red" }]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_no_args_accepts_null_and_empty() {
        assert!(parse_args::<NoArgs>(Value::Null).is_ok());
        assert!(parse_args::<NoArgs>(json!({})).is_ok());
        assert!(parse_args::<NoArgs>(json!({ "x": 1 })).is_err());
    }

    // ==========================================================================
    // Defaults
    // ==========================================================================

    #[test]
    fn test_key_moments_defaults() {
        let args: FindKeyMomentsArgs = parse_args(json!({ "botId": "b1" })).unwrap();
        assert_eq!(args.max_moments, 5);
        assert_eq!(args.granularity, Granularity::Medium);
        assert!(!args.auto_detect_topics);
        assert!(args.topics.is_none());
    }

    #[test]
    fn test_key_moments_granularity_parses_lowercase() {
        let args: FindKeyMomentsArgs =
            parse_args(json!({ "botId": "b1", "granularity": "high" })).unwrap();
        assert_eq!(args.granularity, Granularity::High);
    }

    #[test]
    fn test_intelligent_search_defaults() {
        let args: IntelligentSearchArgs = parse_args(json!({ "query": "budget" })).unwrap();
        assert!(args.include_context);
        assert!(args.max_results.is_none());
        assert_eq!(args.sort_by(), SortBy::Relevance);
        assert_eq!(args.filters, ExplicitFilters::default());
    }

    #[test]
    fn test_intelligent_search_camel_case_filters() {
        let args: IntelligentSearchArgs = parse_args(json!({
            "query": "pricing",
            "filters": { "meetingType": "sales", "calendarId": "cal-1", "startTime": 60.0 },
            "sortBy": "date"
        }))
        .unwrap();
        assert_eq!(args.filters.meeting_type.as_deref(), Some("sales"));
        assert_eq!(args.filters.calendar_id.as_deref(), Some("cal-1"));
        assert_eq!(args.filters.start_time, Some(60.0));
        assert_eq!(args.sort_by(), SortBy::Date);
    }

    #[test]
    fn test_type_search_default_limit() {
        let args: SearchByTypeArgs =
            parse_args(json!({ "meetingType": "sales", "query": "pricing" })).unwrap();
        assert_eq!(args.limit, 10);
    }

    // ==========================================================================
    // Validation helpers
    // ==========================================================================

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("  abc ", "botId", 10).unwrap(), "abc");
        assert!(require_text("   ", "botId", 10).is_err());
        assert!(require_text("abcdefghijk", "botId", 10).is_err());
    }

    #[test]
    fn test_validate_seconds() {
        assert_eq!(validate_seconds(Some(3.5), "startTime").unwrap(), Some(3.5));
        assert_eq!(validate_seconds(None, "startTime").unwrap(), None);
        assert!(validate_seconds(Some(-1.0), "startTime").is_err());
        assert!(validate_seconds(Some(f64::INFINITY), "startTime").is_err());
    }

    #[test]
    fn test_require_url() {
        assert_eq!(
            require_url(" https://meet.google.com/abc-defg-hij ", "meetingUrl").unwrap(),
            "https://meet.google.com/abc-defg-hij"
        );
        assert!(require_url("meet.google.com/abc", "meetingUrl").is_err());
        assert!(require_url("ftp://files.example.com/x", "meetingUrl").is_err());
    }

    #[test]
    fn test_require_uuid_canonicalizes() {
        assert_eq!(
            require_uuid("67E55044-10B1-426F-9247-BB680E5FE0C8", "eventId").unwrap(),
            "67e55044-10b1-426f-9247-bb680e5fe0c8"
        );
        assert!(require_uuid("event-1", "eventId").is_err());
    }

    #[test]
    fn test_join_meeting_defaults() {
        let args: JoinMeetingArgs = parse_args(json!({
            "meetingUrl": "https://meet.google.com/abc",
            "botName": "Recorder"
        }))
        .unwrap();
        assert!(!args.reserved);
        assert!(args.start_time.is_none());
        assert_eq!(args.recording_mode, RecordingMode::SpeakerView);

        let bad_mode: Result<JoinMeetingArgs> = parse_args(json!({
            "meetingUrl": "https://meet.google.com/abc",
            "botName": "Recorder",
            "recordingMode": "wide_view"
        }));
        assert!(bad_mode.is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit(50, "limit", MAX_RESULT_LIMIT).unwrap(), 50);
        assert!(validate_limit(0, "limit", MAX_RESULT_LIMIT).is_err());
        assert!(validate_limit(51, "limit", MAX_RESULT_LIMIT).is_err());
    }

    #[test]
    fn test_validate_input_length() {
        let long = "x".repeat(MAX_QUERY_LENGTH + 1);
        let err = validate_input_length(&long, "query", MAX_QUERY_LENGTH).unwrap_err();
        assert!(err.to_string().contains("query exceeds maximum length"));
    }

    // ==========================================================================
    // UTF-8 safe truncation
    // ==========================================================================

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("short", 100), "short");
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multi_byte_boundary() {
        // "é" is two bytes; the cut backs off to the previous boundary.
        assert_eq!(truncate("éééé", 6), "é...");
        assert_eq!(truncate("caféine et thé", 8), "café...");
    }
}
