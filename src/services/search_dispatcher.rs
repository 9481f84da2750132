//! Search strategy execution.
//!
//! Runs a [`QueryPlan`] against one or many meetings fetched through a
//! [`MeetingGateway`]. Meetings are searched one at a time. A failure that
//! [`Error::is_skippable`] is logged and counted, and the scan continues; an
//! authentication failure aborts it. The call only fails when every attempted
//! meeting failed.

// Allow cast_precision_loss for timing metrics.
#![allow(clippy::cast_precision_loss)]

use super::QueryPlan;
use super::recent_meetings::RecentMeetingCache;
use super::segment_scorer::score_segment;
use super::topic_extraction::TopicExtractor;
use crate::config::SearchSettings;
use crate::gateway::MeetingGateway;
use crate::models::{
    HitSegment, Meeting, MeetingSummary, SearchConstraints, SearchHit, SearchStrategy,
    SegmentRole, SortBy, TimeRange, TranscriptSegment,
};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;
use tracing::instrument;

/// Topics stored per meeting in the recent cache.
const RECENT_TOPIC_COUNT: usize = 3;

/// Caller options for one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Attach neighboring segments to each hit.
    pub include_context: bool,
    /// Maximum hits returned.
    pub max_results: usize,
    /// Hit ordering.
    pub sort_by: SortBy,
    /// Overrides the configured meeting cap of the meeting-type strategy.
    pub meeting_limit: Option<usize>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            include_context: true,
            max_results: 20,
            sort_by: SortBy::Relevance,
            meeting_limit: None,
        }
    }
}

/// Why a search had nothing to look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptySearch {
    /// No listed meeting carries the requested type.
    NoMeetingsOfType(String),
    /// The account has no recordings at all.
    NoRecordings,
    /// The calendar has no events with an attached recording.
    NoCalendarRecordings,
}

impl fmt::Display for EmptySearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMeetingsOfType(t) => write!(f, "No meetings found with type \"{t}\""),
            Self::NoRecordings => f.write_str("No meeting recordings found to search."),
            Self::NoCalendarRecordings => {
                f.write_str("No recorded meetings found for this calendar.")
            },
        }
    }
}

/// Result of executing a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Name of the executed strategy.
    pub strategy: &'static str,
    /// Ranked hits, at most `max_results`.
    pub hits: Vec<SearchHit>,
    /// Meetings fetched and searched successfully.
    pub meetings_searched: usize,
    /// Meetings skipped after a lookup failure.
    pub meetings_failed: usize,
    /// Set when no meeting was eligible for the search.
    pub empty: Option<EmptySearch>,
}

impl SearchOutcome {
    fn empty(strategy: &'static str, reason: EmptySearch) -> Self {
        Self {
            strategy,
            hits: Vec::new(),
            meetings_searched: 0,
            meetings_failed: 0,
            empty: Some(reason),
        }
    }
}

/// A meeting to search, with listing metadata when it came from a listing.
struct Target {
    id: String,
    listing: Option<MeetingSummary>,
}

impl Target {
    fn bare(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            listing: None,
        }
    }

    fn listed(summary: MeetingSummary) -> Self {
        Self {
            id: summary.id.clone(),
            listing: Some(summary),
        }
    }
}

/// Executes search plans for one session.
pub struct SearchDispatcher<'a> {
    gateway: &'a dyn MeetingGateway,
    recent: &'a mut RecentMeetingCache,
    settings: &'a SearchSettings,
    extractor: TopicExtractor,
    now: Option<DateTime<Utc>>,
}

impl<'a> SearchDispatcher<'a> {
    /// Creates a dispatcher over a gateway and the session's recent cache.
    pub fn new(
        gateway: &'a dyn MeetingGateway,
        recent: &'a mut RecentMeetingCache,
        settings: &'a SearchSettings,
    ) -> Self {
        Self {
            gateway,
            recent,
            settings,
            extractor: TopicExtractor::new(),
            now: None,
        }
    }

    /// Pins the clock used to resolve relative dates.
    #[must_use]
    pub const fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Fetches one meeting and records it in the recent cache.
    pub async fn fetch_meeting(&mut self, meeting_id: &str) -> Result<Meeting> {
        let meeting = self.gateway.fetch_meeting(meeting_id).await?;
        let topics = self
            .extractor
            .extract_labels(&meeting.segments, RECENT_TOPIC_COUNT);
        self.recent.record(&meeting, topics);
        Ok(meeting)
    }

    /// Executes a plan.
    #[instrument(
        skip(self, plan, request),
        fields(
            operation = "search",
            strategy = plan.strategy.name(),
            max_results = request.max_results
        )
    )]
    pub async fn execute(
        &mut self,
        plan: &QueryPlan,
        request: &SearchRequest,
    ) -> Result<SearchOutcome> {
        let start = Instant::now();
        let name = plan.strategy.name();
        let constraints = plan.strategy.constraints();
        let term = plan.match_term();

        let result = match &plan.strategy {
            SearchStrategy::SpecificMeeting { meeting_id, .. } => {
                self.scan(name, vec![Target::bare(meeting_id)], constraints, term, request, false)
                    .await
            },
            SearchStrategy::MeetingType { meeting_type, .. } => {
                let limit = request
                    .meeting_limit
                    .unwrap_or(self.settings.type_search_limit);
                let targets: Vec<Target> = self
                    .gateway
                    .list_meetings()
                    .await?
                    .into_iter()
                    .filter(|m| m.has_type(meeting_type))
                    .take(limit)
                    .map(Target::listed)
                    .collect();
                if targets.is_empty() {
                    return Ok(SearchOutcome::empty(
                        name,
                        EmptySearch::NoMeetingsOfType(meeting_type.clone()),
                    ));
                }
                self.scan(name, targets, constraints, term, request, false).await
            },
            SearchStrategy::Calendar {
                calendar_id,
                meeting_type,
                ..
            } => {
                let now = self.now.unwrap_or_else(Utc::now);
                let window = constraints.relative_date.map(|d| d.resolve(now));
                let mut seen = BTreeSet::new();
                let targets: Vec<Target> = self
                    .gateway
                    .list_calendar_events(calendar_id, window.as_ref())
                    .await?
                    .into_iter()
                    .filter(|e| {
                        meeting_type.as_deref().is_none_or(|t| {
                            e.meeting_type
                                .as_deref()
                                .is_some_and(|et| et.eq_ignore_ascii_case(t))
                        })
                    })
                    .filter_map(|e| e.meeting_id)
                    .filter(|id| seen.insert(id.clone()))
                    .take(self.settings.calendar_event_limit)
                    .map(Target::bare)
                    .collect();
                if targets.is_empty() {
                    return Ok(SearchOutcome::empty(name, EmptySearch::NoCalendarRecordings));
                }
                self.scan(name, targets, constraints, term, request, false).await
            },
            SearchStrategy::RecentMeetings { .. } => {
                let targets = self.recent.ids().into_iter().map(Target::bare).collect();
                self.scan(name, targets, constraints, term, request, true).await
            },
            SearchStrategy::GeneralFallback { .. } => {
                let targets: Vec<Target> = self
                    .gateway
                    .list_meetings()
                    .await?
                    .into_iter()
                    .take(self.settings.fallback_meeting_limit)
                    .map(Target::listed)
                    .collect();
                if targets.is_empty() {
                    return Ok(SearchOutcome::empty(name, EmptySearch::NoRecordings));
                }
                self.scan(name, targets, constraints, term, request, true).await
            },
        };

        metrics::histogram!("search_duration_ms", "strategy" => name)
            .record(start.elapsed().as_secs_f64() * 1000.0);
        result
    }

    /// Searches targets in order, skipping meetings whose lookup fails.
    async fn scan(
        &mut self,
        strategy: &'static str,
        targets: Vec<Target>,
        constraints: &SearchConstraints,
        term: &str,
        request: &SearchRequest,
        stop_early: bool,
    ) -> Result<SearchOutcome> {
        let mut hits = Vec::new();
        let mut searched = 0;
        let mut failed = 0;
        let mut last_error = None;

        for target in targets {
            match self.fetch_meeting(&target.id).await {
                Ok(meeting) => {
                    searched += 1;
                    let summary = merge_summary(&meeting.summary, target.listing.as_ref());
                    hits.extend(
                        search_meeting(&meeting, constraints, term)
                            .into_iter()
                            .map(|(index, score)| {
                                build_hit(
                                    &meeting,
                                    &summary,
                                    index,
                                    score,
                                    request
                                        .include_context
                                        .then_some(self.settings.context_segments),
                                )
                            }),
                    );
                },
                Err(e) if !e.is_skippable() => return Err(e),
                Err(e) => {
                    failed += 1;
                    tracing::warn!(
                        meeting_id = %target.id,
                        error = %e,
                        strategy,
                        "Skipping meeting after lookup failure"
                    );
                    metrics::counter!("search_meetings_skipped_total", "strategy" => strategy)
                        .increment(1);
                    last_error = Some(e);
                },
            }
            if stop_early && hits.len() >= request.max_results {
                break;
            }
        }

        if searched == 0 {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        sort_hits(&mut hits, request.sort_by);
        hits.truncate(request.max_results);
        tracing::debug!(hits = hits.len(), searched, failed, "Search complete");

        Ok(SearchOutcome {
            strategy,
            hits,
            meetings_searched: searched,
            meetings_failed: failed,
            empty: None,
        })
    }
}

/// Fills metadata missing from a fetched meeting with its listing entry.
fn merge_summary(fetched: &MeetingSummary, listing: Option<&MeetingSummary>) -> MeetingSummary {
    let Some(listing) = listing else {
        return fetched.clone();
    };
    MeetingSummary {
        id: fetched.id.clone(),
        title: if fetched.title.is_empty() {
            listing.title.clone()
        } else {
            fetched.title.clone()
        },
        meeting_url: fetched.meeting_url.clone().or_else(|| listing.meeting_url.clone()),
        meeting_type: fetched.meeting_type.clone().or_else(|| listing.meeting_type.clone()),
        created_at: fetched.created_at.or(listing.created_at),
        creator_email: fetched
            .creator_email
            .clone()
            .or_else(|| listing.creator_email.clone()),
        participants: if fetched.participants.is_empty() {
            listing.participants.clone()
        } else {
            fetched.participants.clone()
        },
    }
}

fn build_hit(
    meeting: &Meeting,
    summary: &MeetingSummary,
    index: usize,
    score: f64,
    context: Option<usize>,
) -> SearchHit {
    let segment = meeting.segments[index].clone();
    let context = context
        .map(|n| {
            let from = index.saturating_sub(n);
            let to = (index + n).min(meeting.segments.len().saturating_sub(1));
            (from..=to)
                .map(|i| HitSegment {
                    segment: meeting.segments[i].clone(),
                    role: if i == index {
                        SegmentRole::Match
                    } else {
                        SegmentRole::Context
                    },
                })
                .collect()
        })
        .unwrap_or_default();

    SearchHit {
        meeting: summary.clone(),
        recording_url: meeting.recording_url.clone(),
        segment,
        score,
        context,
    }
}

fn sort_hits(hits: &mut [SearchHit], sort_by: SortBy) {
    let by_time =
        |a: &SearchHit, b: &SearchHit| a.segment.start_time.total_cmp(&b.segment.start_time);
    match sort_by {
        SortBy::Relevance => hits.sort_by(|a, b| b.score.total_cmp(&a.score)),
        SortBy::Date => hits.sort_by(|a, b| {
            newest_first(a.meeting.created_at, b.meeting.created_at).then_with(|| by_time(a, b))
        }),
        SortBy::Speaker => hits.sort_by(|a, b| {
            a.segment
                .speaker
                .to_lowercase()
                .cmp(&b.segment.speaker.to_lowercase())
                .then_with(|| by_time(a, b))
        }),
    }
}

/// Orders known creation dates newest first, unknown dates last.
fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Returns `(segment index, score)` for every matching segment, in time order.
///
/// With a time or speaker constraint every segment passing the filter is
/// returned, scored against `term` (zero if it does not occur). Otherwise a
/// segment matches when it contains `term`.
#[must_use]
pub fn search_meeting(
    meeting: &Meeting,
    constraints: &SearchConstraints,
    term: &str,
) -> Vec<(usize, f64)> {
    if constraints.is_segment_filtered() {
        let range = constraints.time_range.unwrap_or_default();
        return segments_in_window(meeting, &range, constraints.speaker.as_deref())
            .into_iter()
            .map(|i| (i, score_segment(&meeting.segments[i], term).unwrap_or(0.0)))
            .collect();
    }
    meeting
        .segments
        .iter()
        .enumerate()
        .filter_map(|(i, s)| score_segment(s, term).map(|score| (i, score)))
        .collect()
}

/// Indices of segments inside `range` whose speaker contains `speaker`
/// (case-insensitive).
#[must_use]
pub fn segments_in_window(
    meeting: &Meeting,
    range: &TimeRange,
    speaker: Option<&str>,
) -> Vec<usize> {
    let speaker = speaker
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    meeting
        .segments
        .iter()
        .enumerate()
        .filter(|(_, s)| range.contains(s))
        .filter(|(_, s)| {
            speaker
                .as_deref()
                .is_none_or(|name| s.speaker.to_lowercase().contains(name))
        })
        .map(|(i, _)| i)
        .collect()
}

/// Segments whose text contains `query` (case-insensitive).
#[must_use]
pub fn transcript_matches<'m>(meeting: &'m Meeting, query: &str) -> Vec<&'m TranscriptSegment> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    meeting
        .segments
        .iter()
        .filter(|s| s.text().to_lowercase().contains(&needle))
        .collect()
}

/// Segments mentioning `topic` plus up to `context` neighbors on each side,
/// deduplicated and in time order.
#[must_use]
pub fn topic_with_context<'m>(
    meeting: &'m Meeting,
    topic: &str,
    context: usize,
) -> Vec<&'m TranscriptSegment> {
    let last = meeting.segments.len().saturating_sub(1);
    let indices: BTreeSet<usize> = meeting
        .segments
        .iter()
        .enumerate()
        .filter(|(_, s)| score_segment(s, topic).is_some())
        .flat_map(|(i, _)| i.saturating_sub(context)..=(i + context).min(last))
        .collect();
    indices.into_iter().map(|i| &meeting.segments[i]).collect()
}
