//! MCP resource handlers.
//!
//! Meeting resources are addressed by URI template:
//!
//! | Template | MIME type | Content |
//! |----------|-----------|---------|
//! | `meetingbaas://meeting/{botId}/transcript` | `text/plain` | `[mm:ss] speaker: text` lines |
//! | `meetingbaas://meeting/{botId}/metadata` | `application/json` | Recording metadata |

use crate::gateway::MeetingGateway;
use crate::mcp::session::SessionContext;
use crate::mcp::tool_types::MAX_ID_LENGTH;
use crate::models::Meeting;
use crate::services::formatting::transcript_text;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// URI scheme of meeting resources.
const SCHEME: &str = "meetingbaas://";

/// Which view of a meeting a resource URI asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingView {
    /// The transcript as plain text.
    Transcript,
    /// Recording metadata as JSON.
    Metadata,
}

impl MeetingView {
    const fn mime_type(self) -> &'static str {
        match self {
            Self::Transcript => "text/plain",
            Self::Metadata => "application/json",
        }
    }
}

/// Parses `meetingbaas://meeting/{botId}/{view}`.
///
/// # Errors
///
/// Returns `Error::InvalidInput` for other schemes, paths or empty ids.
pub fn parse_meeting_uri(uri: &str) -> Result<(String, MeetingView)> {
    let uri = uri.trim();
    let path = uri
        .strip_prefix(SCHEME)
        .ok_or_else(|| Error::InvalidInput(format!("Invalid URI scheme: {uri}")))?;

    match path.split('/').collect::<Vec<_>>().as_slice() {
        ["meeting", id, view] if !id.is_empty() && id.len() <= MAX_ID_LENGTH => {
            let view = match *view {
                "transcript" => MeetingView::Transcript,
                "metadata" => MeetingView::Metadata,
                other => {
                    return Err(Error::InvalidInput(format!(
                        "Unknown meeting resource: {other}"
                    )));
                },
            };
            Ok(((*id).to_string(), view))
        },
        _ => Err(Error::InvalidInput(format!("Unknown resource path: {path}"))),
    }
}

/// Handler for MCP resources.
#[derive(Debug, Default)]
pub struct ResourceHandler;

impl ResourceHandler {
    /// Creates a new resource handler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Lists resources; meeting resources are only reachable by template, so
    /// the templates are listed as descriptive entries.
    #[must_use]
    pub fn list_resources(&self) -> Vec<ResourceDefinition> {
        self.list_templates()
            .into_iter()
            .map(|t| ResourceDefinition {
                uri: t.uri_template,
                name: t.name,
                description: t.description,
                mime_type: t.mime_type,
            })
            .collect()
    }

    /// Lists URI templates.
    #[must_use]
    pub fn list_templates(&self) -> Vec<ResourceTemplate> {
        vec![
            ResourceTemplate {
                uri_template: format!("{SCHEME}meeting/{{botId}}/transcript"),
                name: "Meeting transcript".to_string(),
                description: Some(
                    "Full transcript of a recorded meeting, one line per segment".to_string(),
                ),
                mime_type: Some(MeetingView::Transcript.mime_type().to_string()),
            },
            ResourceTemplate {
                uri_template: format!("{SCHEME}meeting/{{botId}}/metadata"),
                name: "Meeting metadata".to_string(),
                description: Some(
                    "Title, URLs, duration, type and participants of a recorded meeting"
                        .to_string(),
                ),
                mime_type: Some(MeetingView::Metadata.mime_type().to_string()),
            },
        ]
    }

    /// Reads a resource by URI.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is malformed or the meeting lookup fails.
    pub async fn get_resource(
        &self,
        uri: &str,
        gateway: &dyn MeetingGateway,
        session: &mut SessionContext,
    ) -> Result<ResourceContent> {
        let (bot_id, view) = parse_meeting_uri(uri)?;
        let meeting = session.dispatcher(gateway).fetch_meeting(&bot_id).await?;
        let text = match view {
            MeetingView::Transcript => transcript_text(&meeting.segments),
            MeetingView::Metadata => metadata_json(&meeting)?,
        };
        Ok(ResourceContent {
            uri: uri.trim().to_string(),
            mime_type: Some(view.mime_type().to_string()),
            text: Some(text),
        })
    }
}

/// Metadata document of one meeting.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeetingMetadata<'a> {
    id: &'a str,
    title: &'a str,
    meeting_url: Option<&'a str>,
    recording_url: &'a str,
    duration_secs: f64,
    meeting_type: Option<&'a str>,
    participants: Vec<String>,
    segment_count: usize,
}

fn metadata_json(meeting: &Meeting) -> Result<String> {
    let metadata = MeetingMetadata {
        id: meeting.id(),
        title: meeting.title(),
        meeting_url: meeting.summary.meeting_url.as_deref(),
        recording_url: &meeting.recording_url,
        duration_secs: meeting.duration(),
        meeting_type: meeting.summary.meeting_type.as_deref(),
        participants: meeting.participants(),
        segment_count: meeting.segments.len(),
    };
    serde_json::to_string_pretty(&metadata).map_err(|e| Error::OperationFailed {
        operation: "serialize_metadata".to_string(),
        cause: e.to_string(),
    })
}

/// Definition of an MCP resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Resource URI.
    pub uri: String,
    /// Human-readable name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional MIME type.
    pub mime_type: Option<String>,
}

/// URI template of a parameterized resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceTemplate {
    /// RFC 6570 URI template.
    pub uri_template: String,
    /// Human-readable name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional MIME type.
    pub mime_type: Option<String>,
}

/// Content of an MCP resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceContent {
    /// Resource URI.
    pub uri: String,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Text content.
    pub text: Option<String>,
}
