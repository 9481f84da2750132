//! Bot lifecycle and calendar connection tools.
//!
//! These are thin wrappers over single gateway calls. Transient API failures
//! become error-flagged results; argument errors, rejected keys and unknown
//! ids propagate to the registry like every other tool.

use crate::gateway::MeetingGateway;
use crate::mcp::tool_types::{
    BotIdArgs, JoinMeetingArgs, MAX_ID_LENGTH, MAX_TEXT_LENGTH, NoArgs, RetranscribeArgs,
    ScheduleRecordingArgs, parse_args, require_text, require_url, require_uuid,
};
use crate::models::{
    BotRequest, Calendar, RecordingSettings, RetranscribeRequest, RetranscribeStatus,
};
use crate::{Error, Result};
use secrecy::SecretString;
use serde_json::Value;

use super::super::ToolResult;

/// Answer when `delete_data` hits its per-key quota.
pub const DELETE_RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded: This endpoint is limited to 5 requests per minute per API key. Please try again later.";

/// Executes `joinMeeting`.
pub async fn execute_join_meeting(
    arguments: Value,
    gateway: &dyn MeetingGateway,
) -> Result<ToolResult> {
    let args: JoinMeetingArgs = parse_args(arguments)?;
    if args.start_time.is_some_and(|t| t < 0) {
        return Err(Error::InvalidInput(
            "startTime must be a non-negative unix timestamp".to_string(),
        ));
    }
    let request = BotRequest {
        meeting_url: require_url(&args.meeting_url, "meetingUrl")?,
        bot_name: require_text(&args.bot_name, "botName", MAX_TEXT_LENGTH)?,
        reserved: args.reserved,
        recording_mode: args.recording_mode,
        start_time: args.start_time,
    };

    tracing::info!(
        recording_mode = %request.recording_mode,
        reserved = request.reserved,
        scheduled = request.start_time.is_some(),
        "Sending bot into meeting"
    );
    match gateway.join_meeting(&request).await {
        Ok(bot_id) => Ok(ToolResult::text(format!(
            "Bot joined meeting successfully. Bot ID: {bot_id}"
        ))),
        Err(e) => failure("join meeting", e),
    }
}

/// Executes `leaveMeeting`.
pub async fn execute_leave_meeting(
    arguments: Value,
    gateway: &dyn MeetingGateway,
) -> Result<ToolResult> {
    let args: BotIdArgs = parse_args(arguments)?;
    let bot_id = require_text(&args.bot_id, "botId", MAX_ID_LENGTH)?;

    tracing::info!(bot_id = %bot_id, "Removing bot from meeting");
    match gateway.leave_meeting(&bot_id).await {
        Ok(()) => Ok(ToolResult::text("Bot left the meeting successfully")),
        Err(e) => failure("leave meeting", e),
    }
}

/// Executes `listCalendars`.
pub async fn execute_list_calendars(
    arguments: Value,
    gateway: &dyn MeetingGateway,
) -> Result<ToolResult> {
    let _: NoArgs = parse_args(arguments)?;

    let calendars = match gateway.list_calendars().await {
        Ok(calendars) => calendars,
        Err(e) => return failure("list calendars", e),
    };
    if calendars.is_empty() {
        return Ok(ToolResult::text(
            "No calendars found. Connect a calendar to your MeetingBaaS account first.",
        ));
    }
    Ok(ToolResult::text(render_calendars(&calendars)))
}

/// Executes `scheduleRecording`.
pub async fn execute_schedule_recording(
    arguments: Value,
    gateway: &dyn MeetingGateway,
) -> Result<ToolResult> {
    let args: ScheduleRecordingArgs = parse_args(arguments)?;
    let event_id = require_uuid(&args.event_id, "eventId")?;
    let settings = RecordingSettings {
        bot_name: require_text(&args.bot_name, "botName", MAX_TEXT_LENGTH)?,
        recording_mode: args.recording_mode,
    };

    tracing::info!(event_id = %event_id, "Scheduling event recording");
    match gateway.schedule_recording(&event_id, &settings).await {
        Ok(()) => Ok(ToolResult::text("Recording has been scheduled successfully.")),
        Err(e) => failure("schedule recording", e),
    }
}

/// Executes `deleteData`.
pub async fn execute_delete_data(
    arguments: Value,
    gateway: &dyn MeetingGateway,
) -> Result<ToolResult> {
    let args: BotIdArgs = parse_args(arguments)?;
    let bot_id = require_text(&args.bot_id, "botId", MAX_ID_LENGTH)?;

    tracing::info!(bot_id = %bot_id, "Deleting meeting data");
    match gateway.delete_data(&bot_id).await {
        Ok(status) => Ok(ToolResult::text(format!(
            "Successfully {status}. The meeting metadata (URL, timestamps, etc.) has been preserved, but all content (recordings, transcriptions, and logs) has been deleted."
        ))),
        Err(Error::RateLimited(_)) => {
            tracing::warn!(bot_id = %bot_id, "Data deletion rate limited");
            Ok(ToolResult::error(DELETE_RATE_LIMIT_MESSAGE))
        },
        Err(e) => failure("delete data", e),
    }
}

/// Executes `retranscribeBot`.
pub async fn execute_retranscribe(
    arguments: Value,
    gateway: &dyn MeetingGateway,
) -> Result<ToolResult> {
    let args: RetranscribeArgs = parse_args(arguments)?;
    let request = RetranscribeRequest {
        bot_id: require_text(&args.bot_id, "botId", MAX_ID_LENGTH)?,
        provider: args.speech_to_text_provider,
        provider_api_key: args
            .speech_to_text_api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(SecretString::from),
        webhook_url: args
            .webhook_url
            .as_deref()
            .map(|url| require_url(url, "webhookUrl"))
            .transpose()?,
    };

    tracing::info!(
        bot_id = %request.bot_id,
        provider = ?request.provider,
        has_api_key = request.provider_api_key.is_some(),
        has_webhook = request.webhook_url.is_some(),
        "Requesting retranscription"
    );
    match gateway.retranscribe(&request).await {
        Ok(RetranscribeStatus::Queued) => Ok(ToolResult::text(
            "Retranscription request accepted. The transcription will be processed asynchronously.",
        )),
        Ok(RetranscribeStatus::Processing) => Ok(ToolResult::text(
            "Retranscription request accepted and is being processed.",
        )),
        Err(e) => failure("retranscribe bot", e),
    }
}

fn render_calendars(calendars: &[Calendar]) -> String {
    let lines: Vec<String> = calendars
        .iter()
        .map(|c| format!("- {} ({}) [ID: {}]", c.name, c.email, c.id))
        .collect();
    format!("Found {} calendars:\n\n{}", calendars.len(), lines.join("\n"))
}

/// Turns a transient gateway failure into an error result.
fn failure(action: &str, err: Error) -> Result<ToolResult> {
    match err {
        Error::InvalidInput(_) | Error::Unauthorized(_) | Error::NotFound(_) => Err(err),
        other => {
            tracing::warn!(action, error = %other, "Bot operation failed");
            Ok(ToolResult::error(format!("Failed to {action}: {other}")))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayCall, InMemoryGateway};
    use crate::models::{CalendarEvent, Meeting, MeetingSummary};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    const EVENT_ID: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    fn gateway() -> InMemoryGateway {
        let recorded = Meeting::new(
            MeetingSummary {
                id: "bot-1".to_string(),
                title: "Kickoff".to_string(),
                ..MeetingSummary::default()
            },
            "https://cdn.test/bot-1.mp4",
            Vec::new(),
        );
        let event = CalendarEvent {
            id: EVENT_ID.to_string(),
            name: "Design review".to_string(),
            start_time: Utc.with_ymd_and_hms(2026, 10, 20, 15, 0, 0).unwrap(),
            meeting_id: None,
            meeting_type: None,
        };
        InMemoryGateway::new(vec![recorded])
            .with_calendar("cal-1", vec![event])
            .with_unreachable("bot-down")
    }

    #[tokio::test]
    async fn test_join_meeting_reports_bot_id() {
        let gw = gateway();
        let result = execute_join_meeting(
            json!({ "meetingUrl": "https://meet.google.com/abc", "botName": "Recorder" }),
            &gw,
        )
        .await
        .unwrap();
        assert_eq!(
            result.joined_text(),
            "Bot joined meeting successfully. Bot ID: memory-bot-1"
        );
        assert_eq!(
            gw.calls(),
            vec![GatewayCall::JoinMeeting("https://meet.google.com/abc".to_string())]
        );
    }

    #[tokio::test]
    async fn test_join_meeting_rejects_bad_url_before_gateway() {
        let gw = gateway();
        let result = execute_join_meeting(
            json!({ "meetingUrl": "not a url", "botName": "Recorder" }),
            &gw,
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(gw.calls().is_empty());
    }

    #[tokio::test]
    async fn test_leave_unknown_bot_propagates_not_found() {
        let gw = gateway();
        let result = execute_leave_meeting(json!({ "botId": "ghost" }), &gw).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_calendars() {
        let empty = execute_list_calendars(json!({}), &gateway()).await.unwrap();
        assert!(empty.joined_text().starts_with("No calendars found."));

        let gw = gateway()
            .with_connected_calendar(Calendar {
                id: "cal-1".to_string(),
                name: "Work".to_string(),
                email: "ana@example.com".to_string(),
            })
            .with_connected_calendar(Calendar {
                id: "cal-2".to_string(),
                name: "Personal".to_string(),
                email: "ana@home.example".to_string(),
            });
        let listed = execute_list_calendars(Value::Null, &gw).await.unwrap();
        assert_eq!(
            listed.joined_text(),
            "Found 2 calendars:\n\n- Work (ana@example.com) [ID: cal-1]\n- Personal (ana@home.example) [ID: cal-2]"
        );
    }

    #[tokio::test]
    async fn test_schedule_recording_requires_uuid() {
        let gw = gateway();
        let bad = execute_schedule_recording(
            json!({ "eventId": "tomorrow", "botName": "Recorder" }),
            &gw,
        )
        .await;
        assert!(matches!(bad, Err(Error::InvalidInput(_))));

        let ok = execute_schedule_recording(
            json!({ "eventId": EVENT_ID.to_uppercase(), "botName": "Recorder" }),
            &gw,
        )
        .await
        .unwrap();
        assert_eq!(ok.joined_text(), "Recording has been scheduled successfully.");
        assert_eq!(
            gw.calls(),
            vec![GatewayCall::ScheduleRecording(EVENT_ID.to_string())]
        );
    }

    #[tokio::test]
    async fn test_delete_data_outcomes() {
        let gw = gateway();
        let done = execute_delete_data(json!({ "botId": "bot-1" }), &gw).await.unwrap();
        assert!(!done.is_error);
        assert!(done.joined_text().starts_with("Successfully deleted. The meeting metadata"));

        let down = execute_delete_data(json!({ "botId": "bot-down" }), &gw).await.unwrap();
        assert!(down.is_error);
        assert!(down.joined_text().starts_with("Failed to delete data:"));
    }

    #[tokio::test]
    async fn test_retranscribe_validates_webhook() {
        let gw = gateway();
        let bad = execute_retranscribe(
            json!({ "botId": "bot-1", "webhookUrl": "hooks/done" }),
            &gw,
        )
        .await;
        assert!(matches!(bad, Err(Error::InvalidInput(_))));

        let ok = execute_retranscribe(
            json!({
                "botId": "bot-1",
                "speechToTextProvider": "Gladia",
                "webhookUrl": "https://hooks.example.com/done"
            }),
            &gw,
        )
        .await
        .unwrap();
        assert_eq!(
            ok.joined_text(),
            "Retranscription request accepted. The transcription will be processed asynchronously."
        );
    }

    #[test]
    fn test_failure_keeps_taxonomy_errors() {
        assert!(failure("leave meeting", Error::NotFound("bot x".to_string())).is_err());
        let transient = failure(
            "leave meeting",
            Error::GatewayUnavailable {
                operation: "leave_meeting".to_string(),
                cause: "timeout".to_string(),
            },
        )
        .unwrap();
        assert!(transient.is_error);
        assert_eq!(
            transient.joined_text(),
            "Failed to leave meeting: gateway call 'leave_meeting' failed: timeout"
        );
    }
}
