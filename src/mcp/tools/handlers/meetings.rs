//! Meeting metadata, calendar and session-history tools.

use crate::gateway::MeetingGateway;
use crate::mcp::session::SessionContext;
use crate::mcp::tool_types::{
    BotIdArgs, MAX_ID_LENGTH, NoArgs, UpcomingMeetingsArgs, parse_args, require_text,
};
use crate::models::CalendarEvent;
use crate::services::RecentMeeting;
use crate::services::formatting::format_duration;
use crate::Result;
use serde_json::Value;
use std::fmt::Write as _;

use super::super::ToolResult;

/// Executes `getMeetingData`.
pub async fn execute_get_meeting_data(
    arguments: Value,
    gateway: &dyn MeetingGateway,
    session: &mut SessionContext,
) -> Result<ToolResult> {
    let args: BotIdArgs = parse_args(arguments)?;
    let bot_id = require_text(&args.bot_id, "botId", MAX_ID_LENGTH)?;

    let meeting = session.dispatcher(gateway).fetch_meeting(&bot_id).await?;
    Ok(ToolResult::text(format!(
        "Meeting recording is available. Duration: {}. Contains {} transcript segments.\n\nVideo URL: {}",
        format_duration(meeting.duration()),
        meeting.segments.len(),
        meeting.recording_url
    )))
}

/// Executes `listUpcomingMeetings`.
pub async fn execute_list_upcoming(
    arguments: Value,
    gateway: &dyn MeetingGateway,
    session: &mut SessionContext,
) -> Result<ToolResult> {
    let args: UpcomingMeetingsArgs = parse_args(arguments)?;
    let calendar_id = require_text(&args.calendar_id, "calendarId", MAX_ID_LENGTH)?;

    let now = session.now();
    let mut upcoming: Vec<CalendarEvent> = gateway
        .list_calendar_events(&calendar_id, None)
        .await?
        .into_iter()
        .filter(|e| e.start_time > now)
        .collect();
    upcoming.sort_by_key(|e| e.start_time);

    if upcoming.is_empty() {
        return Ok(ToolResult::text("No upcoming meetings found in this calendar."));
    }

    let mut out = format!("Upcoming meetings ({}):\n", upcoming.len());
    for event in &upcoming {
        let _ = write!(
            out,
            "\n- {} at {}",
            event.name,
            event.start_time.format("%Y-%m-%d %H:%M UTC")
        );
        if event.meeting_id.is_some() {
            out.push_str(" (bot scheduled)");
        }
    }
    Ok(ToolResult::text(out))
}

/// Executes `listRecentMeetings`.
pub fn execute_list_recent(arguments: Value, session: &SessionContext) -> Result<ToolResult> {
    let _: NoArgs = parse_args(arguments)?;

    let recent = session.recent();
    if recent.is_empty() {
        return Ok(ToolResult::text(
            "No meetings have been accessed in this session yet.",
        ));
    }

    let entries: Vec<String> = recent
        .iter()
        .enumerate()
        .map(|(i, meeting)| render_recent(i + 1, meeting))
        .collect();
    Ok(ToolResult::text(format!(
        "Recently accessed meetings (most recent first):\n\n{}",
        entries.join("\n\n")
    )))
}

fn render_recent(rank: usize, meeting: &RecentMeeting) -> String {
    let mut out = format!("{rank}. {} ({})", meeting.title, meeting.id);
    if let Some(kind) = &meeting.meeting_type {
        let _ = write!(out, "\n   Type: {kind}");
    }
    if !meeting.topics.is_empty() {
        let _ = write!(out, "\n   Topics: {}", meeting.topics.join(", "));
    }
    if !meeting.participants.is_empty() {
        let _ = write!(out, "\n   Participants: {}", meeting.participants.join(", "));
    }
    out
}
