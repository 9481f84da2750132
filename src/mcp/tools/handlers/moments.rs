//! Key moment extraction for a single meeting.

use crate::gateway::MeetingGateway;
use crate::mcp::session::SessionContext;
use crate::mcp::tool_types::{
    FindKeyMomentsArgs, MAX_ID_LENGTH, MAX_MOMENTS, MAX_TEXT_LENGTH, parse_args, require_text,
    validate_input_length, validate_limit,
};
use crate::models::KeyMoment;
use crate::services::formatting::{LinkDetails, SharedSegment, link_block, segments_list};
use crate::services::{MomentOptions, MomentSelector, TopicExtractor};
use crate::Result;
use serde_json::Value;
use std::fmt::Write as _;

use super::super::ToolResult;

/// Executes `findKeyMoments`.
pub async fn execute_find_key_moments(
    arguments: Value,
    gateway: &dyn MeetingGateway,
    session: &mut SessionContext,
) -> Result<ToolResult> {
    let args: FindKeyMomentsArgs = parse_args(arguments)?;
    let bot_id = require_text(&args.bot_id, "botId", MAX_ID_LENGTH)?;
    let max_moments = validate_limit(args.max_moments, "maxMoments", MAX_MOMENTS)?;
    let supplied: Vec<String> = args
        .topics
        .unwrap_or_default()
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    for topic in &supplied {
        validate_input_length(topic, "topics", MAX_TEXT_LENGTH)?;
    }

    let meeting = session.dispatcher(gateway).fetch_meeting(&bot_id).await?;
    let title = args
        .meeting_title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| meeting.title().to_string());
    let viewer = session.viewer_base_url();
    let recording_link = link_block(
        viewer,
        &bot_id,
        &LinkDetails {
            title: Some(&title),
            ..LinkDetails::default()
        },
    );

    if meeting.segments.is_empty() {
        return Ok(ToolResult::text(format!(
            "No transcript found for meeting \"{title}\". You can still view the recording:\n\n{recording_link}"
        )));
    }

    let detected = if args.auto_detect_topics || supplied.is_empty() {
        TopicExtractor::new().extract_labels(&meeting.segments, args.granularity.topic_count())
    } else {
        Vec::new()
    };
    let topics = merge_topics(&supplied, &detected);

    let options = MomentOptions::for_granularity(args.granularity, max_moments)
        .with_proximity_window(session.settings().proximity_window_secs);
    let moments = MomentSelector::new(options).select(&meeting.segments, &topics);
    tracing::debug!(
        meeting_id = %bot_id,
        topics = topics.len(),
        moments = moments.len(),
        "Selected key moments"
    );

    if moments.is_empty() {
        return Ok(ToolResult::text(format!(
            "No key moments found in meeting \"{title}\". You can view the full recording:\n\n{recording_link}"
        )));
    }

    Ok(ToolResult::text(render_moments(
        viewer, &bot_id, &title, &detected, &moments,
    )))
}

/// Supplied topics first, then detected ones not already present.
fn merge_topics(supplied: &[String], detected: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(supplied.len() + detected.len());
    for topic in supplied.iter().chain(detected) {
        if !merged.iter().any(|t| t.eq_ignore_ascii_case(topic)) {
            merged.push(topic.clone());
        }
    }
    merged
}

fn render_moments(
    viewer: &str,
    bot_id: &str,
    title: &str,
    detected: &[String],
    moments: &[KeyMoment],
) -> String {
    let mut out = format!("# Key Moments from {title}\n\n");
    if !detected.is_empty() {
        out.push_str("## Main Topics Discussed\n");
        for topic in detected {
            let _ = writeln!(out, "- {topic}");
        }
        out.push('\n');
    }
    let shared: Vec<SharedSegment> = moments
        .iter()
        .map(|m| SharedSegment {
            timestamp: m.start_time,
            speaker: Some(m.speaker.clone()),
            description: m.description.clone(),
        })
        .collect();
    out.push_str(&segments_list(viewer, bot_id, &shared));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_topics_dedups_case_insensitively() {
        let merged = merge_topics(
            &["Budget".to_string(), "hiring".to_string()],
            &["budget".to_string(), "roadmap".to_string()],
        );
        assert_eq!(merged, vec!["Budget", "hiring", "roadmap"]);
    }
}
