//! Shareable viewer links.
//!
//! Both tools confirm the meeting exists before rendering anything, so a
//! mistyped id never produces a dead link.

use crate::gateway::MeetingGateway;
use crate::mcp::session::SessionContext;
use crate::mcp::tool_types::{
    MAX_ID_LENGTH, MAX_SHARED_SEGMENTS, MAX_TEXT_LENGTH, ShareSegmentsArgs, ShareableLinkArgs,
    parse_args, require_text, validate_input_length, validate_seconds,
};
use crate::services::formatting::{LinkDetails, link_block, segments_list};
use crate::{Error, Result};
use serde_json::Value;

use super::super::ToolResult;

/// Executes `shareableMeetingLink`.
pub async fn execute_shareable_link(
    arguments: Value,
    gateway: &dyn MeetingGateway,
    session: &mut SessionContext,
) -> Result<ToolResult> {
    let args: ShareableLinkArgs = parse_args(arguments)?;
    let bot_id = require_text(&args.bot_id, "botId", MAX_ID_LENGTH)?;
    let timestamp = validate_seconds(args.timestamp, "timestamp")?;
    for (field, value) in [
        ("title", &args.title),
        ("speakerName", &args.speaker_name),
        ("description", &args.description),
    ] {
        if let Some(value) = value {
            validate_input_length(value, field, MAX_TEXT_LENGTH)?;
        }
    }

    let meeting = match session.dispatcher(gateway).fetch_meeting(&bot_id).await {
        Ok(meeting) => meeting,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            return Ok(ToolResult::error(format!(
                "Error generating shareable link: {}. Please check that the bot ID is correct.",
                cause(&e)
            )));
        },
    };

    let title = args.title.as_deref().unwrap_or_else(|| meeting.title());
    Ok(ToolResult::text(link_block(
        session.viewer_base_url(),
        &bot_id,
        &LinkDetails {
            timestamp,
            title: Some(title),
            speaker: args.speaker_name.as_deref(),
            description: args.description.as_deref(),
        },
    )))
}

/// Executes `shareMeetingSegments`.
pub async fn execute_share_segments(
    arguments: Value,
    gateway: &dyn MeetingGateway,
    session: &mut SessionContext,
) -> Result<ToolResult> {
    let args: ShareSegmentsArgs = parse_args(arguments)?;
    let bot_id = require_text(&args.bot_id, "botId", MAX_ID_LENGTH)?;
    if args.segments.is_empty() {
        return Err(Error::InvalidInput(
            "segments must contain at least one entry".to_string(),
        ));
    }
    if args.segments.len() > MAX_SHARED_SEGMENTS {
        return Err(Error::InvalidInput(format!(
            "segments must contain at most {MAX_SHARED_SEGMENTS} entries"
        )));
    }
    for segment in &args.segments {
        validate_seconds(Some(segment.timestamp), "segments.timestamp")?;
        validate_input_length(&segment.description, "segments.description", MAX_TEXT_LENGTH)?;
    }

    if let Err(e) = session.dispatcher(gateway).fetch_meeting(&bot_id).await {
        if e.is_fatal() {
            return Err(e);
        }
        return Ok(ToolResult::error(format!(
            "Error generating shareable segments: {}. Please check that the bot ID is correct.",
            cause(&e)
        )));
    }

    Ok(ToolResult::text(segments_list(
        session.viewer_base_url(),
        &bot_id,
        &args.segments,
    )))
}

/// The message of an error without its variant prefix.
fn cause(e: &Error) -> String {
    match e {
        Error::NotFound(msg) | Error::InvalidInput(msg) | Error::Unauthorized(msg) => msg.clone(),
        Error::RateLimited(operation) => format!("rate limit exceeded on {operation}"),
        Error::GatewayUnavailable { cause, .. }
        | Error::MalformedResponse { cause, .. }
        | Error::OperationFailed { cause, .. } => cause.clone(),
    }
}
