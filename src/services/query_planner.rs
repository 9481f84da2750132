//! Natural-language query planning.
//!
//! A query is scanned with a fixed set of patterns for an identifier, a
//! meeting type, a speaker, a time range, a topic and a relative date.
//! Explicit filters override the extracted value of the same field. The
//! strategy is then chosen by the first matching entry of [`RULES`].
//!
//! Planning performs no I/O and reads no clock: the same query, filters and
//! cache state always produce the same plan.

// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use crate::models::{RelativeDate, SearchConstraints, SearchStrategy, TimeRange};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::instrument;

// ============================================================================
// Patterns
// ============================================================================

/// `meeting id: <hex>` / `bot uuid <hex>`.
static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:meeting|bot)\s+(?:id|uuid|bot)[\s:]+([a-f0-9-]{8,})")
        .expect("static regex: meeting id")
});

/// A canonical UUID anywhere in the query.
static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\b")
        .expect("static regex: uuid")
});

/// Meeting-type vocabulary, checked in order.
static TYPE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)\bsales\b").expect("static regex: sales"),
            "sales",
        ),
        (
            Regex::new(r"(?i)\b(?:psychiatric|therapy|mental\s+health)\b")
                .expect("static regex: psychiatric"),
            "psychiatric",
        ),
        (
            Regex::new(r"(?i)\b(?:stand-?ups?|scrum|daily)\b").expect("static regex: standup"),
            "standup",
        ),
        (
            Regex::new(r"(?i)\binterviews?\b").expect("static regex: interview"),
            "interview",
        ),
        (
            Regex::new(r"(?i)\bproduct\b").expect("static regex: product"),
            "product",
        ),
        (
            Regex::new(r"(?i)\bplanning\b").expect("static regex: planning"),
            "planning",
        ),
        (
            Regex::new(r"(?i)\bretro(?:spective)?s?\b").expect("static regex: retrospective"),
            "retrospective",
        ),
        (
            Regex::new(r"(?i)(?:\bone-on-one\b|\b1:1\b)").expect("static regex: one-on-one"),
            "one-on-one",
        ),
    ]
});

/// `what did Alice say`, `when does Bob Smith mention`.
static SPEAKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:where|when|what)\s+(?:did|does|was)\s+([a-z][a-z'-]*)(?:\s+[a-z][a-z'-]*)?\s+(?:say|said|talk|speak|mention)\w*",
    )
    .expect("static regex: speaker")
});

/// Optional unit suffix after a minute count.
const MINUTES_SUFFIX: &str = r"(?:\s*(?:minutes?|mins?)\b)?";

static BETWEEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bbetween\s+(\d+)(?::(\d{{1,2}}))?{MINUTES_SUFFIX}\s+(?:and|to)\s+(\d+)(?::(\d{{1,2}}))?{MINUTES_SUFFIX}"
    ))
    .expect("static regex: between")
});

static AFTER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bafter\s+(\d+)(?::(\d{{1,2}}))?{MINUTES_SUFFIX}"))
        .expect("static regex: after")
});

static BEFORE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bbefore\s+(\d+)(?::(\d{{1,2}}))?{MINUTES_SUFFIX}"))
        .expect("static regex: before")
});

static AROUND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\baround\s+(\d+)(?::(\d{{1,2}}))?{MINUTES_SUFFIX}"))
        .expect("static regex: around")
});

/// `about pricing`, `discussed the roadmap`; stops at a connective, punctuation or a number.
static TOPIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:talk\s+about|discussion\s+of|discussed|discuss|mentioned|mention|covered|cover|about)\s+(.+?)(?:\s+(?:in|during|at|between|after|before|around|from|with)\b|\s*[?.!,]|\s*\d|$)",
    )
    .expect("static regex: topic")
});

/// Relative date words, longest phrases first.
static RELATIVE_DATE_PATTERNS: LazyLock<Vec<(Regex, RelativeDate)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)\blast\s+month\b").expect("static regex: last month"),
            RelativeDate::LastMonth,
        ),
        (
            Regex::new(r"(?i)\b(?:last\s+week|recently)\b").expect("static regex: last week"),
            RelativeDate::LastWeek,
        ),
        (
            Regex::new(r"(?i)\bthis\s+week\b").expect("static regex: this week"),
            RelativeDate::ThisWeek,
        ),
        (
            Regex::new(r"(?i)\byesterday\b").expect("static regex: yesterday"),
            RelativeDate::Yesterday,
        ),
        (
            Regex::new(r"(?i)\btoday\b").expect("static regex: today"),
            RelativeDate::Today,
        ),
    ]
});

/// `in sales meetings`, `from the standup calls`.
static TYPE_PHRASE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:in|from|during|across)\s+)?(?:the\s+|our\s+|my\s+)?(?:sales|psychiatric|therapy|stand-?up|scrum|daily|interview|product|planning|retro(?:spective)?|one-on-one|1:1)\s+(?:meetings?|calls?|sessions?)\b",
    )
    .expect("static regex: type phrase")
});

static RELATIVE_DATE_PHRASE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:from\s+|in\s+)?(?:the\s+)?(?:yesterday|today|recently|last\s+(?:week|month)|this\s+week)\b")
        .expect("static regex: relative date phrase")
});

static LEADING_CONNECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:about|regarding|on)\s+").expect("static regex: leading connective")
});

static TRAILING_CONNECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(?:in|from|during|of|for|with|at|by)$")
        .expect("static regex: trailing connective")
});

static LEADING_ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:the|a|an)\s+").expect("static regex: leading article"));

// ============================================================================
// Input and output
// ============================================================================

/// Filters supplied alongside the query. Each overrides the value extracted
/// from the query text for the same field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExplicitFilters {
    /// Meeting type tag.
    #[serde(default)]
    pub meeting_type: Option<String>,
    /// Specific meeting.
    #[serde(default)]
    pub bot_id: Option<String>,
    /// Speaker name fragment.
    #[serde(default)]
    pub speaker: Option<String>,
    /// Start of the recording window, in seconds.
    #[serde(default)]
    pub start_time: Option<f64>,
    /// End of the recording window, in seconds.
    #[serde(default)]
    pub end_time: Option<f64>,
    /// Calendar whose events are searched.
    #[serde(default)]
    pub calendar_id: Option<String>,
    /// Topic phrase.
    #[serde(default)]
    pub topic: Option<String>,
}

/// The outcome of planning one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    /// The chosen strategy with its constraints.
    pub strategy: SearchStrategy,
    /// Residual free text to search for.
    pub search_terms: String,
}

impl QueryPlan {
    /// Returns the topic if one was found, else the residual search terms.
    #[must_use]
    pub fn match_term(&self) -> &str {
        self.strategy
            .constraints()
            .topic
            .as_deref()
            .unwrap_or(&self.search_terms)
    }
}

// ============================================================================
// Strategy rules
// ============================================================================

/// Everything extracted from a query after explicit filters are applied.
#[derive(Debug, Clone, Default)]
struct Signals {
    meeting_id: Option<String>,
    meeting_type: Option<String>,
    calendar_id: Option<String>,
    has_recent_meetings: bool,
    constraints: SearchConstraints,
}

/// One entry in the strategy cascade.
struct Rule {
    name: &'static str,
    applies: fn(&Signals) -> bool,
    build: fn(Signals) -> SearchStrategy,
}

/// Strategy cascade, highest priority first. The last rule always applies.
const RULES: &[Rule] = &[
    Rule {
        name: "specific-meeting",
        applies: has_meeting_id,
        build: specific_meeting,
    },
    Rule {
        name: "meeting-type",
        applies: has_type_without_calendar,
        build: meeting_type,
    },
    Rule {
        name: "calendar",
        applies: has_calendar,
        build: calendar,
    },
    Rule {
        name: "recent-meetings",
        applies: has_recent_meetings,
        build: recent_meetings,
    },
    Rule {
        name: "general-fallback",
        applies: always,
        build: general_fallback,
    },
];

fn has_meeting_id(s: &Signals) -> bool {
    s.meeting_id.is_some()
}

/// A calendar id turns the type into a calendar event filter.
fn has_type_without_calendar(s: &Signals) -> bool {
    s.meeting_type.is_some() && s.calendar_id.is_none()
}

fn has_calendar(s: &Signals) -> bool {
    s.calendar_id.is_some()
}

fn has_recent_meetings(s: &Signals) -> bool {
    s.has_recent_meetings
}

const fn always(_: &Signals) -> bool {
    true
}

fn specific_meeting(s: Signals) -> SearchStrategy {
    SearchStrategy::SpecificMeeting {
        meeting_id: s.meeting_id.unwrap_or_default(),
        constraints: s.constraints,
    }
}

fn meeting_type(s: Signals) -> SearchStrategy {
    SearchStrategy::MeetingType {
        meeting_type: s.meeting_type.unwrap_or_default(),
        constraints: s.constraints,
    }
}

fn calendar(s: Signals) -> SearchStrategy {
    SearchStrategy::Calendar {
        calendar_id: s.calendar_id.unwrap_or_default(),
        meeting_type: s.meeting_type,
        constraints: s.constraints,
    }
}

fn recent_meetings(s: Signals) -> SearchStrategy {
    SearchStrategy::RecentMeetings {
        constraints: s.constraints,
    }
}

fn general_fallback(s: Signals) -> SearchStrategy {
    SearchStrategy::GeneralFallback {
        constraints: s.constraints,
    }
}

// ============================================================================
// Planner
// ============================================================================

/// Turns free-text queries into search plans.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPlanner;

impl QueryPlanner {
    /// Creates a planner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Names of the strategy rules in priority order.
    #[must_use]
    pub fn rule_names() -> Vec<&'static str> {
        RULES.iter().map(|r| r.name).collect()
    }

    /// Plans a query.
    ///
    /// `has_recent_meetings` reports whether the session's recent meeting
    /// cache is non-empty.
    #[instrument(
        skip(self, query, filters),
        fields(operation = "plan_query", query_length = query.len())
    )]
    pub fn plan(
        &self,
        query: &str,
        filters: &ExplicitFilters,
        has_recent_meetings: bool,
    ) -> QueryPlan {
        let signals = extract_signals(query, filters, has_recent_meetings);
        let search_terms = residual_terms(query);

        let strategy = RULES
            .iter()
            .find(|rule| (rule.applies)(&signals))
            .map_or_else(
                || general_fallback(signals.clone()),
                |rule| {
                    tracing::debug!(rule = rule.name, "Selected search strategy");
                    (rule.build)(signals.clone())
                },
            );

        QueryPlan {
            strategy,
            search_terms,
        }
    }
}

fn extract_signals(query: &str, filters: &ExplicitFilters, has_recent_meetings: bool) -> Signals {
    let mut time_range = extract_time_range(query).unwrap_or_default();
    if let Some(start) = filters.start_time {
        time_range.start = Some(start);
    }
    if let Some(end) = filters.end_time {
        time_range.end = Some(end);
    }

    let constraints = SearchConstraints {
        speaker: non_blank(filters.speaker.as_deref()).or_else(|| extract_speaker(query)),
        time_range: (!time_range.is_open()).then_some(time_range),
        topic: non_blank(filters.topic.as_deref()).or_else(|| extract_topic(query)),
        relative_date: extract_relative_date(query),
    };

    Signals {
        meeting_id: non_blank(filters.bot_id.as_deref()).or_else(|| extract_meeting_id(query)),
        meeting_type: non_blank(filters.meeting_type.as_deref())
            .map(|t| t.to_lowercase())
            .or_else(|| extract_meeting_type(query)),
        calendar_id: non_blank(filters.calendar_id.as_deref()),
        has_recent_meetings,
        constraints,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Extracts an explicit meeting or bot identifier.
#[must_use]
pub fn extract_meeting_id(query: &str) -> Option<String> {
    ID_PATTERN
        .captures(query)
        .and_then(|c| c.get(1))
        .or_else(|| UUID_PATTERN.find(query))
        .map(|m| m.as_str().to_lowercase())
}

/// Extracts a meeting type from the fixed vocabulary.
#[must_use]
pub fn extract_meeting_type(query: &str) -> Option<String> {
    TYPE_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(query))
        .map(|(_, name)| (*name).to_string())
}

/// Extracts a speaker name, keeping its original casing.
#[must_use]
pub fn extract_speaker(query: &str) -> Option<String> {
    SPEAKER_PATTERN
        .captures(query)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extracts a recording time range; minute values are converted to seconds.
#[must_use]
pub fn extract_time_range(query: &str) -> Option<TimeRange> {
    if let Some(c) = BETWEEN_PATTERN.captures(query) {
        return Some(TimeRange::between(
            minutes_to_secs(&c, 1, 2)?,
            minutes_to_secs(&c, 3, 4)?,
        ));
    }
    if let Some(c) = AFTER_PATTERN.captures(query) {
        return Some(TimeRange {
            start: Some(minutes_to_secs(&c, 1, 2)?),
            end: None,
        });
    }
    if let Some(c) = BEFORE_PATTERN.captures(query) {
        return Some(TimeRange {
            start: None,
            end: Some(minutes_to_secs(&c, 1, 2)?),
        });
    }
    let c = AROUND_PATTERN.captures(query)?;
    let centre = minutes_to_secs(&c, 1, 2)?;
    Some(TimeRange::between((centre - 60.0).max(0.0), centre + 60.0))
}

fn minutes_to_secs(c: &Captures<'_>, minutes: usize, seconds: usize) -> Option<f64> {
    let minutes: f64 = c.get(minutes)?.as_str().parse().ok()?;
    let seconds: f64 = c
        .get(seconds)
        .map_or(Some(0.0), |m| m.as_str().parse().ok())?;
    Some(minutes * 60.0 + seconds)
}

/// Extracts a topic phrase.
#[must_use]
pub fn extract_topic(query: &str) -> Option<String> {
    let raw = TOPIC_PATTERN.captures(query)?.get(1)?.as_str().trim();
    let topic = LEADING_ARTICLE.replace(raw, "");
    let topic = topic.trim();
    (topic.chars().count() >= 3).then(|| topic.to_string())
}

/// Extracts a relative date phrase.
#[must_use]
pub fn extract_relative_date(query: &str) -> Option<RelativeDate> {
    RELATIVE_DATE_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(query))
        .map(|(_, date)| *date)
}

/// Removes filter phrases from a query, leaving the free-text search terms.
///
/// Falls back to the whole query when nothing is left.
#[must_use]
pub fn residual_terms(query: &str) -> String {
    let patterns: [&Regex; 9] = [
        &*ID_PATTERN,
        &*UUID_PATTERN,
        &*TYPE_PHRASE_PATTERN,
        &*RELATIVE_DATE_PHRASE_PATTERN,
        &*SPEAKER_PATTERN,
        &*BETWEEN_PATTERN,
        &*AFTER_PATTERN,
        &*BEFORE_PATTERN,
        &*AROUND_PATTERN,
    ];
    let stripped = patterns
        .iter()
        .fold(query.to_string(), |acc, pattern| {
            pattern.replace_all(&acc, " ").into_owned()
        });

    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches(|c: char| c.is_whitespace() || "?.!,".contains(c));
    let residual = LEADING_CONNECTIVE.replace(trimmed, "");
    let residual = TRAILING_CONNECTIVE.replace(&residual, "");
    let residual = residual.trim();

    if residual.is_empty() {
        query.trim().to_string()
    } else {
        residual.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn plan(query: &str) -> QueryPlan {
        QueryPlanner::new().plan(query, &ExplicitFilters::default(), false)
    }

    #[test]
    fn test_speaker_time_and_topic() {
        let plan = plan("what did Alice say about pricing between 10 and 20");
        let constraints = plan.strategy.constraints();
        assert_eq!(constraints.speaker.as_deref(), Some("Alice"));
        assert_eq!(constraints.time_range, Some(TimeRange::between(600.0, 1200.0)));
        assert_eq!(constraints.topic.as_deref(), Some("pricing"));
        assert!(constraints.is_segment_filtered());
        assert!(plan.search_terms.contains("pricing"));
        assert_eq!(plan.strategy.name(), "general-fallback");
    }

    #[test_case("find meeting id: 3f2a9c1e-aaaa in notes", Some("3f2a9c1e-aaaa"); "labelled id")]
    #[test_case("bot uuid 0123abcd", Some("0123abcd"); "bot uuid")]
    #[test_case("search 123E4567-E89B-12D3-A456-426614174000 for pricing", Some("123e4567-e89b-12d3-a456-426614174000"); "bare uuid")]
    #[test_case("meeting id abc", None; "too short")]
    #[test_case("pricing discussion", None; "no id")]
    fn test_extract_meeting_id(query: &str, expected: Option<&str>) {
        assert_eq!(extract_meeting_id(query).as_deref(), expected);
    }

    #[test_case("pricing in sales meetings", Some("sales"); "sales")]
    #[test_case("therapy notes", Some("psychiatric"); "therapy")]
    #[test_case("what happened at the stand-up", Some("standup"); "hyphenated standup")]
    #[test_case("daily scrum blockers", Some("standup"); "scrum")]
    #[test_case("candidate interviews", Some("interview"); "interview plural")]
    #[test_case("last retro", Some("retrospective"); "retro")]
    #[test_case("my 1:1 with Bob", Some("one-on-one"); "one on one")]
    #[test_case("pricing discussion", None; "none")]
    fn test_extract_meeting_type(query: &str, expected: Option<&str>) {
        assert_eq!(extract_meeting_type(query).as_deref(), expected);
    }

    #[test_case("what did Alice say about pricing", Some("Alice"); "say")]
    #[test_case("when does Bob Smith mention the launch", Some("Bob"); "two word name")]
    #[test_case("where was the launch discussed", None; "no speech verb")]
    #[test_case("where did Dana speak", Some("Dana"); "speak")]
    fn test_extract_speaker(query: &str, expected: Option<&str>) {
        assert_eq!(extract_speaker(query).as_deref(), expected);
    }

    #[test_case("between 10 and 20", Some((Some(600.0), Some(1200.0))); "between")]
    #[test_case("between 1:30 to 2:15 minutes", Some((Some(90.0), Some(135.0))); "with seconds")]
    #[test_case("after 5 minutes", Some((Some(300.0), None)); "after")]
    #[test_case("before 3", Some((None, Some(180.0))); "before")]
    #[test_case("around 10", Some((Some(540.0), Some(660.0))); "around")]
    #[test_case("around 0", Some((Some(0.0), Some(60.0))); "around clamps")]
    #[test_case("sometime later", None; "none")]
    fn test_extract_time_range(query: &str, expected: Option<(Option<f64>, Option<f64>)>) {
        assert_eq!(
            extract_time_range(query).map(|r| (r.start, r.end)),
            expected
        );
    }

    #[test_case("did we discuss the budget in sales meetings", Some("budget"); "terminated by in")]
    #[test_case("talk about hiring plans?", Some("hiring plans"); "question mark")]
    #[test_case("what did Alice say about pricing between 10 and 20", Some("pricing"); "terminated by between")]
    #[test_case("mentioned the roadmap review", Some("roadmap review"); "mentioned")]
    #[test_case("about it", None; "too short")]
    fn test_extract_topic(query: &str, expected: Option<&str>) {
        assert_eq!(extract_topic(query).as_deref(), expected);
    }

    #[test_case("what happened yesterday", Some(RelativeDate::Yesterday); "yesterday")]
    #[test_case("pricing last month", Some(RelativeDate::LastMonth); "last month")]
    #[test_case("recently discussed", Some(RelativeDate::LastWeek); "recently")]
    #[test_case("pricing", None; "none")]
    fn test_extract_relative_date(query: &str, expected: Option<RelativeDate>) {
        assert_eq!(extract_relative_date(query), expected);
    }

    #[test_case("pricing objections in sales meetings", "pricing objections"; "type phrase")]
    #[test_case("about onboarding from yesterday", "onboarding"; "relative date and connective")]
    #[test_case("meeting id 3f2a9c1e-aaaa budget", "budget"; "identifier")]
    #[test_case("what did Alice say about pricing between 10 and 20", "pricing"; "speaker and time")]
    #[test_case("budget in meeting id 0123abcd", "budget"; "dangling connective")]
    #[test_case("between 10 and 20", "between 10 and 20"; "empty falls back to query")]
    fn test_residual_terms(query: &str, expected: &str) {
        assert_eq!(residual_terms(query), expected);
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(
            QueryPlanner::rule_names(),
            vec![
                "specific-meeting",
                "meeting-type",
                "calendar",
                "recent-meetings",
                "general-fallback"
            ]
        );
    }

    #[test]
    fn test_identifier_beats_type() {
        let plan = plan("sales meeting id 0123abcd pricing");
        assert_eq!(
            plan.strategy,
            SearchStrategy::SpecificMeeting {
                meeting_id: "0123abcd".to_string(),
                constraints: SearchConstraints::default(),
            }
        );
    }

    #[test]
    fn test_type_strategy() {
        let plan = plan("pricing objections in sales meetings");
        assert!(matches!(
            plan.strategy,
            SearchStrategy::MeetingType { ref meeting_type, .. } if meeting_type == "sales"
        ));
        assert_eq!(plan.search_terms, "pricing objections");
    }

    #[test]
    fn test_calendar_keeps_type_as_event_filter() {
        let filters = ExplicitFilters {
            calendar_id: Some("cal-1".to_string()),
            ..ExplicitFilters::default()
        };
        let plan = QueryPlanner::new().plan("standup blockers last week", &filters, true);
        match plan.strategy {
            SearchStrategy::Calendar {
                calendar_id,
                meeting_type,
                constraints,
            } => {
                assert_eq!(calendar_id, "cal-1");
                assert_eq!(meeting_type.as_deref(), Some("standup"));
                assert_eq!(constraints.relative_date, Some(RelativeDate::LastWeek));
            },
            other => panic!("unexpected strategy {other:?}"),
        }
    }

    #[test]
    fn test_recent_cache_selects_recent_strategy() {
        let plan = QueryPlanner::new().plan("pricing", &ExplicitFilters::default(), true);
        assert_eq!(plan.strategy.name(), "recent-meetings");
    }

    #[test]
    fn test_explicit_filters_override_extracted_values() {
        let filters = ExplicitFilters {
            speaker: Some("Bob".to_string()),
            start_time: Some(30.0),
            bot_id: Some("explicit-bot".to_string()),
            meeting_type: Some("Sales".to_string()),
            topic: Some("churn".to_string()),
            ..ExplicitFilters::default()
        };
        let plan = QueryPlanner::new().plan(
            "what did Alice say about pricing between 10 and 20 in the meeting id 0123abcd",
            &filters,
            false,
        );
        let SearchStrategy::SpecificMeeting {
            meeting_id,
            constraints,
        } = plan.strategy
        else {
            panic!("expected specific meeting");
        };
        assert_eq!(meeting_id, "explicit-bot");
        assert_eq!(constraints.speaker.as_deref(), Some("Bob"));
        assert_eq!(constraints.topic.as_deref(), Some("churn"));
        assert_eq!(constraints.time_range, Some(TimeRange::between(30.0, 1200.0)));
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let filters = ExplicitFilters {
            bot_id: Some("  ".to_string()),
            ..ExplicitFilters::default()
        };
        let plan = QueryPlanner::new().plan("pricing", &filters, false);
        assert_eq!(plan.strategy.name(), "general-fallback");
    }

    #[test]
    fn test_match_term_prefers_topic() {
        let with_topic = plan("did we discuss the budget");
        assert_eq!(with_topic.match_term(), "budget");
        let without_topic = plan("roadmap");
        assert_eq!(without_topic.match_term(), "roadmap");
    }

    #[test]
    fn test_filters_reject_unknown_fields() {
        let parsed: std::result::Result<ExplicitFilters, _> =
            serde_json::from_value(serde_json::json!({ "colour": "blue" }));
        assert!(parsed.is_err());
        let parsed: ExplicitFilters =
            serde_json::from_value(serde_json::json!({ "botId": "x", "startTime": 12.5 })).unwrap();
        assert_eq!(parsed.bot_id.as_deref(), Some("x"));
        assert_eq!(parsed.start_time, Some(12.5));
    }
}
