//! MCP tool implementations.
//!
//! # Module Structure
//!
//! - [`definitions`]: Tool schema definitions (JSON Schema for input validation)
//! - [`handlers`]: Tool execution logic
//!   - `moments`: key moment extraction
//!   - `search`: single-meeting, by-type and intelligent search
//!   - `links`: shareable viewer links
//!   - `meetings`: metadata, calendar and session history
//!   - `bots`: bot lifecycle, calendar connections and data deletion

mod definitions;
mod handlers;

use super::session::{AUTH_REQUIRED_MESSAGE, SessionContext};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Registry of MCP tools.
pub struct ToolRegistry {
    /// Available tools.
    tools: HashMap<String, ToolDefinition>,
}

impl ToolRegistry {
    /// Creates a new tool registry with all MeetingBaaS tools.
    #[must_use]
    pub fn new() -> Self {
        let tools = [
            definitions::find_key_moments_tool(),
            definitions::search_transcript_tool(),
            definitions::search_by_type_tool(),
            definitions::find_meeting_topic_tool(),
            definitions::search_video_segment_tool(),
            definitions::intelligent_search_tool(),
            definitions::shareable_link_tool(),
            definitions::share_segments_tool(),
            definitions::get_meeting_data_tool(),
            definitions::list_upcoming_tool(),
            definitions::list_recent_tool(),
            definitions::join_meeting_tool(),
            definitions::leave_meeting_tool(),
            definitions::list_calendars_tool(),
            definitions::schedule_recording_tool(),
            definitions::delete_data_tool(),
            definitions::retranscribe_tool(),
        ]
        .into_iter()
        .map(|tool| (tool.name.clone(), tool))
        .collect();

        Self { tools }
    }

    /// Returns all tool definitions, sorted by name.
    #[must_use]
    pub fn list_tools(&self) -> Vec<&ToolDefinition> {
        let mut tools: Vec<&ToolDefinition> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Gets a tool definition by name.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Executes a tool with the given arguments.
    ///
    /// `meta` is the request's `_meta` object, consulted for API key headers.
    /// When no key resolves, the call returns an error result without
    /// touching the gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool is unknown or its execution fails.
    pub async fn execute(
        &self,
        name: &str,
        arguments: Value,
        session: &mut SessionContext,
        meta: Option<&Value>,
    ) -> Result<ToolResult> {
        if !self.tools.contains_key(name) {
            return Err(Error::InvalidInput(format!("Unknown tool: {name}")));
        }
        let Some(gateway) = session.gateway(meta) else {
            tracing::warn!(tool = name, "No API key resolved for tool call");
            metrics::counter!("mcp_auth_failures_total", "tool" => name.to_string()).increment(1);
            return Ok(ToolResult::error(AUTH_REQUIRED_MESSAGE));
        };
        let gateway = gateway.as_ref();
        let not_found = not_found_message(&arguments);

        let result = match name {
            "findKeyMoments" => {
                handlers::execute_find_key_moments(arguments, gateway, session).await
            },
            "searchTranscript" => {
                handlers::execute_search_transcript(arguments, gateway, session).await
            },
            "searchTranscriptByType" => {
                handlers::execute_search_by_type(arguments, gateway, session).await
            },
            "findMeetingTopic" => {
                handlers::execute_find_meeting_topic(arguments, gateway, session).await
            },
            "searchVideoSegment" => {
                handlers::execute_search_video_segment(arguments, gateway, session).await
            },
            "intelligentSearch" => {
                handlers::execute_intelligent_search(arguments, gateway, session).await
            },
            "shareableMeetingLink" => {
                handlers::execute_shareable_link(arguments, gateway, session).await
            },
            "shareMeetingSegments" => {
                handlers::execute_share_segments(arguments, gateway, session).await
            },
            "getMeetingData" => {
                handlers::execute_get_meeting_data(arguments, gateway, session).await
            },
            "listUpcomingMeetings" => {
                handlers::execute_list_upcoming(arguments, gateway, session).await
            },
            "listRecentMeetings" => handlers::execute_list_recent(arguments, session),
            "joinMeeting" => handlers::execute_join_meeting(arguments, gateway).await,
            "leaveMeeting" => handlers::execute_leave_meeting(arguments, gateway).await,
            "listCalendars" => handlers::execute_list_calendars(arguments, gateway).await,
            "scheduleRecording" => {
                handlers::execute_schedule_recording(arguments, gateway).await
            },
            "deleteData" => handlers::execute_delete_data(arguments, gateway).await,
            "retranscribeBot" => handlers::execute_retranscribe(arguments, gateway).await,
            _ => Err(Error::InvalidInput(format!("Unknown tool: {name}"))),
        };

        match result {
            Err(Error::NotFound(cause)) => {
                tracing::info!(tool = name, cause = %cause, "Tool target not found");
                Ok(ToolResult::text(not_found))
            },
            other => other,
        }
    }
}

/// Plain-text answer for a tool whose meeting, calendar or event does not exist.
fn not_found_message(arguments: &Value) -> String {
    let lookup = |key: &str| {
        arguments
            .get(key)
            .or_else(|| arguments.get("filters").and_then(|f| f.get(key)))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    if let Some(id) = lookup("botId") {
        format!("Meeting \"{id}\" was not found. Please check that the bot ID is correct.")
    } else if let Some(id) = lookup("calendarId") {
        format!("Calendar \"{id}\" was not found. Please check that the calendar ID is correct.")
    } else if let Some(id) = lookup("eventId") {
        format!("Calendar event \"{id}\" was not found. Please check that the event ID is correct.")
    } else {
        "No matching meeting data was found.".to_string()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Definition of an MCP tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema for input validation.
    pub input_schema: Value,
}

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the result represents an error.
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    /// A successful single-block text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::blocks(vec![text.into()])
    }

    /// A successful result with several text blocks.
    #[must_use]
    pub fn blocks(blocks: Vec<String>) -> Self {
        Self {
            content: blocks
                .into_iter()
                .map(|text| ToolContent::Text { text })
                .collect(),
            is_error: false,
        }
    }

    /// An error-flagged text result.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }

    /// Joins all text blocks with blank lines.
    #[must_use]
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                ToolContent::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Content types that can be returned by tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}
