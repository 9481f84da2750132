//! Transcript search tools.
//!
//! Single-meeting tools fetch one recording and filter its transcript.
//! `searchTranscriptByType` and `intelligentSearch` go through the planner and
//! the dispatcher, which may touch many meetings.

use crate::gateway::MeetingGateway;
use crate::mcp::session::SessionContext;
use crate::mcp::tool_types::{
    FindMeetingTopicArgs, IntelligentSearchArgs, MAX_ID_LENGTH, MAX_QUERY_LENGTH,
    MAX_RESULT_LIMIT, MAX_TEXT_LENGTH, SearchByTypeArgs, SearchTranscriptArgs,
    SearchVideoSegmentArgs, parse_args, require_text, truncate, validate_limit, validate_seconds,
};
use crate::models::{
    SearchConstraints, SearchHit, SearchStrategy, SegmentRole, SortBy,
    TimeRange,
};
use crate::services::formatting::{
    format_time, highlight, shareable_link, transcript_line, video_url_at,
};
use crate::services::{
    QueryPlan, QueryPlanner, SearchOutcome, SearchRequest, segments_in_window,
    topic_with_context, transcript_matches,
};
use crate::Result;
use serde_json::Value;
use std::fmt::Write as _;

use super::super::ToolResult;

/// Longest segment text shown in a multi-meeting result.
const MAX_HIT_TEXT: usize = 500;

const NO_RELEVANT_RESULTS: &str = "No relevant results found across any meetings. Try refining your search terms or specifying a particular meeting.";

/// Executes `searchTranscript`.
pub async fn execute_search_transcript(
    arguments: Value,
    gateway: &dyn MeetingGateway,
    session: &mut SessionContext,
) -> Result<ToolResult> {
    let args: SearchTranscriptArgs = parse_args(arguments)?;
    let bot_id = require_text(&args.bot_id, "botId", MAX_ID_LENGTH)?;
    let query = require_text(&args.query, "query", MAX_QUERY_LENGTH)?;

    let meeting = session.dispatcher(gateway).fetch_meeting(&bot_id).await?;
    let matches = transcript_matches(&meeting, &query);
    if matches.is_empty() {
        return Ok(ToolResult::text(format!("No results found for \"{query}\"")));
    }

    let lines: Vec<String> = matches.iter().map(|s| transcript_line(s)).collect();
    Ok(ToolResult::text(format!(
        "Found {} results for \"{query}\":\n\n{}",
        matches.len(),
        lines.join("\n")
    )))
}

/// Executes `searchTranscriptByType`.
pub async fn execute_search_by_type(
    arguments: Value,
    gateway: &dyn MeetingGateway,
    session: &mut SessionContext,
) -> Result<ToolResult> {
    let args: SearchByTypeArgs = parse_args(arguments)?;
    let meeting_type = require_text(&args.meeting_type, "meetingType", MAX_TEXT_LENGTH)?;
    let query = require_text(&args.query, "query", MAX_QUERY_LENGTH)?;
    let limit = validate_limit(args.limit, "limit", MAX_RESULT_LIMIT)?;

    let plan = QueryPlan {
        strategy: SearchStrategy::MeetingType {
            meeting_type: meeting_type.to_lowercase(),
            constraints: SearchConstraints::default(),
        },
        search_terms: query.clone(),
    };
    let request = SearchRequest {
        include_context: false,
        max_results: limit,
        sort_by: SortBy::Date,
        meeting_limit: Some(limit),
    };
    let outcome = session.dispatcher(gateway).execute(&plan, &request).await?;

    if let Some(empty) = &outcome.empty {
        return Ok(ToolResult::text(empty.to_string()));
    }
    if outcome.hits.is_empty() {
        return Ok(ToolResult::text(format!(
            "No results found for \"{query}\" in \"{meeting_type}\" meetings{}",
            coverage_suffix(&outcome)
        )));
    }

    let viewer = session.viewer_base_url();
    let entries: Vec<String> = outcome
        .hits
        .iter()
        .map(|hit| {
            format!(
                "Bot: {}\n{}\nView full meeting: {}",
                hit.meeting.title,
                transcript_line(&hit.segment),
                shareable_link(viewer, &hit.meeting.id, None)
            )
        })
        .collect();
    Ok(ToolResult::text(format!(
        "Found {} results for \"{query}\" in \"{meeting_type}\" meetings:\n\n{}{}",
        outcome.hits.len(),
        entries.join("\n\n"),
        coverage_suffix(&outcome)
    )))
}

/// Executes `findMeetingTopic`.
pub async fn execute_find_meeting_topic(
    arguments: Value,
    gateway: &dyn MeetingGateway,
    session: &mut SessionContext,
) -> Result<ToolResult> {
    let args: FindMeetingTopicArgs = parse_args(arguments)?;
    let bot_id = require_text(&args.bot_id, "botId", MAX_ID_LENGTH)?;
    let topic = require_text(&args.topic, "topic", MAX_TEXT_LENGTH)?;

    let context = session.settings().context_segments;
    let meeting = session.dispatcher(gateway).fetch_meeting(&bot_id).await?;
    let segments = topic_with_context(&meeting, &topic, context);
    if segments.is_empty() {
        return Ok(ToolResult::text(format!(
            "Topic \"{topic}\" was not discussed in this meeting."
        )));
    }

    let lines: Vec<String> = segments
        .iter()
        .map(|s| {
            format!(
                "[{}] {}: {}",
                format_time(s.start_time),
                s.speaker,
                highlight(&s.text(), &topic)
            )
        })
        .collect();
    Ok(ToolResult::text(format!(
        "Found topic \"{topic}\" in the meeting with context:\n\n{}\n\nVideo URL: {}",
        lines.join("\n"),
        meeting.recording_url
    )))
}

/// Executes `searchVideoSegment`.
pub async fn execute_search_video_segment(
    arguments: Value,
    gateway: &dyn MeetingGateway,
    session: &mut SessionContext,
) -> Result<ToolResult> {
    let args: SearchVideoSegmentArgs = parse_args(arguments)?;
    let bot_id = require_text(&args.bot_id, "botId", MAX_ID_LENGTH)?;
    let start = validate_seconds(args.start_time, "startTime")?;
    let end = validate_seconds(args.end_time, "endTime")?;
    let range = TimeRange { start, end };

    let meeting = session.dispatcher(gateway).fetch_meeting(&bot_id).await?;
    let indices = segments_in_window(&meeting, &range, args.speaker.as_deref());
    let (Some(&first), Some(&last)) = (indices.first(), indices.last()) else {
        return Ok(ToolResult::text(
            "No matching video segments found based on your criteria.",
        ));
    };

    let first = &meeting.segments[first];
    let last = &meeting.segments[last];
    let summary = format!(
        "Found {} segments from {} to {} in meeting \"{}\".",
        indices.len(),
        format_time(first.start_time),
        format_time(last.end()),
        meeting.title()
    );
    let watch = format!(
        "Watch from beginning of segment: {}",
        video_url_at(&meeting.recording_url, first.start_time)
    );
    let details: Vec<String> = indices
        .iter()
        .map(|&i| {
            let segment = &meeting.segments[i];
            format!(
                "{}\nSegment link: {}",
                transcript_line(segment),
                video_url_at(&meeting.recording_url, segment.start_time)
            )
        })
        .collect();

    Ok(ToolResult::blocks(vec![
        summary,
        watch,
        format!("Individual segments:\n\n{}", details.join("\n\n")),
    ]))
}

/// Executes `intelligentSearch`.
pub async fn execute_intelligent_search(
    arguments: Value,
    gateway: &dyn MeetingGateway,
    session: &mut SessionContext,
) -> Result<ToolResult> {
    let args: IntelligentSearchArgs = parse_args(arguments)?;
    let query = require_text(&args.query, "query", MAX_QUERY_LENGTH)?;
    let max_results = validate_limit(
        args.max_results
            .unwrap_or(session.settings().default_max_results),
        "maxResults",
        MAX_RESULT_LIMIT,
    )?;
    validate_seconds(args.filters.start_time, "filters.startTime")?;
    validate_seconds(args.filters.end_time, "filters.endTime")?;

    let plan = QueryPlanner::new().plan(&query, &args.filters, !session.recent().is_empty());
    tracing::info!(
        strategy = plan.strategy.name(),
        search_terms = %plan.search_terms,
        "Planned intelligent search"
    );
    let request = SearchRequest {
        include_context: args.include_context,
        max_results,
        sort_by: args.sort_by(),
        meeting_limit: None,
    };
    let outcome = session.dispatcher(gateway).execute(&plan, &request).await?;

    if let Some(empty) = &outcome.empty {
        return Ok(ToolResult::text(empty.to_string()));
    }
    if outcome.hits.is_empty() {
        return Ok(ToolResult::text(format!(
            "{NO_RELEVANT_RESULTS}{}",
            coverage_suffix(&outcome)
        )));
    }

    Ok(ToolResult::text(render_outcome(
        session.viewer_base_url(),
        &plan,
        &outcome,
    )))
}

/// Notes skipped meetings, if any.
fn coverage_suffix(outcome: &SearchOutcome) -> String {
    if outcome.meetings_failed == 0 {
        String::new()
    } else {
        format!(
            "\n\n(Searched {} meetings; {} could not be retrieved.)",
            outcome.meetings_searched, outcome.meetings_failed
        )
    }
}

fn render_outcome(viewer: &str, plan: &QueryPlan, outcome: &SearchOutcome) -> String {
    let mut out = format!(
        "Search strategy: {}\nSearch terms: {}\nMeetings searched: {}",
        outcome.strategy,
        plan.match_term(),
        outcome.meetings_searched
    );
    if outcome.meetings_failed > 0 {
        let _ = write!(out, " ({} unavailable)", outcome.meetings_failed);
    }
    let _ = write!(out, "\nResults: {}\n", outcome.hits.len());

    let term = plan.match_term();
    if matches!(plan.strategy, SearchStrategy::GeneralFallback { .. }) {
        // Group by meeting in order of first appearance.
        let mut order: Vec<&str> = Vec::new();
        for hit in &outcome.hits {
            if !order.contains(&hit.meeting.id.as_str()) {
                order.push(&hit.meeting.id);
            }
        }
        let mut rank = 0;
        for id in order {
            let group: Vec<&SearchHit> =
                outcome.hits.iter().filter(|h| h.meeting.id == id).collect();
            if let Some(first) = group.first() {
                out.push('\n');
                out.push_str(&meeting_info(first));
                out.push_str("\nSEARCH RESULTS:\n");
            }
            for hit in group {
                rank += 1;
                out.push('\n');
                out.push_str(&render_hit(viewer, rank, hit, term));
            }
        }
    } else {
        for (i, hit) in outcome.hits.iter().enumerate() {
            out.push('\n');
            out.push_str(&render_hit(viewer, i + 1, hit, term));
        }
    }
    out
}

fn meeting_info(hit: &SearchHit) -> String {
    let meeting = &hit.meeting;
    let or_unknown = |v: Option<&str>| v.unwrap_or("Unknown").to_string();
    format!(
        "MEETING INFO:\nBot Name: {}\nMeeting URL: {}\nMeeting Type: {}\nDate: {}\nCreator: {}\n",
        meeting.title,
        or_unknown(meeting.meeting_url.as_deref()),
        or_unknown(meeting.meeting_type.as_deref()),
        meeting
            .created_at
            .map_or_else(|| "Unknown".to_string(), |d| d.format("%Y-%m-%d %H:%M UTC").to_string()),
        or_unknown(meeting.creator_email.as_deref()),
    )
}

fn render_hit(viewer: &str, rank: usize, hit: &SearchHit, term: &str) -> String {
    let mut out = format!(
        "{rank}. \"{}\" at {} ({}, score {:.1})\n",
        hit.meeting.title,
        format_time(hit.segment.start_time),
        hit.segment.speaker,
        hit.score
    );
    if hit.context.is_empty() {
        let _ = writeln!(
            out,
            "   {}",
            highlight(&truncate(&hit.segment.text(), MAX_HIT_TEXT), term)
        );
    } else {
        for item in &hit.context {
            let text = truncate(&item.segment.text(), MAX_HIT_TEXT);
            let (marker, text) = match item.role {
                SegmentRole::Match => (">", highlight(&text, term)),
                SegmentRole::Context => (" ", text),
            };
            let _ = writeln!(
                out,
                " {marker} [{}] {}: {text}",
                format_time(item.segment.start_time),
                item.segment.speaker
            );
        }
    }
    let _ = writeln!(
        out,
        "   Watch: {}",
        shareable_link(viewer, &hit.meeting.id, Some(hit.segment.start_time))
    );
    out
}
