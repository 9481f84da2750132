//! Tool definitions for MCP tools.
//!
//! Contains the JSON Schema definitions for all MeetingBaaS tools.

use super::ToolDefinition;
use serde_json::json;

fn bot_id_property() -> serde_json::Value {
    json!({
        "type": "string",
        "description": "ID of the bot that recorded the meeting"
    })
}

/// Defines the key moments tool.
pub fn find_key_moments_tool() -> ToolDefinition {
    ToolDefinition {
        name: "findKeyMoments".to_string(),
        description: "Automatically find and share key moments and topics from a meeting recording with direct links".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "botId": bot_id_property(),
                "meetingTitle": {
                    "type": "string",
                    "description": "Title of the meeting (defaults to the recorded bot name)"
                },
                "topics": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Topics to look for in the transcript"
                },
                "maxMoments": {
                    "type": "integer",
                    "description": "Maximum number of key moments to return (default: 5)",
                    "minimum": 1,
                    "maximum": 50
                },
                "granularity": {
                    "type": "string",
                    "description": "Level of detail: low, medium (default), high",
                    "enum": ["low", "medium", "high"]
                },
                "autoDetectTopics": {
                    "type": "boolean",
                    "description": "Detect topics from the transcript in addition to the supplied ones (default: false)"
                }
            },
            "required": ["botId"]
        }),
    }
}

/// Defines the single-meeting transcript search tool.
pub fn search_transcript_tool() -> ToolDefinition {
    ToolDefinition {
        name: "searchTranscript".to_string(),
        description: "Search a meeting transcript for specific content".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "botId": bot_id_property(),
                "query": {
                    "type": "string",
                    "description": "Text to search for (case-insensitive)"
                }
            },
            "required": ["botId", "query"]
        }),
    }
}

/// Defines the meeting-type search tool.
pub fn search_by_type_tool() -> ToolDefinition {
    ToolDefinition {
        name: "searchTranscriptByType".to_string(),
        description: "Search transcripts across all meetings of a given type (sales, standup, interview, ...)".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "meetingType": {
                    "type": "string",
                    "description": "Meeting type tag, e.g. sales, psychiatric, standup"
                },
                "query": {
                    "type": "string",
                    "description": "Text to search for"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum meetings searched and results returned (default: 10)",
                    "minimum": 1,
                    "maximum": 50
                }
            },
            "required": ["meetingType", "query"]
        }),
    }
}

/// Defines the topic lookup tool.
pub fn find_meeting_topic_tool() -> ToolDefinition {
    ToolDefinition {
        name: "findMeetingTopic".to_string(),
        description: "Find where a topic was discussed in a meeting, with surrounding context".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "botId": bot_id_property(),
                "topic": {
                    "type": "string",
                    "description": "Topic to look for"
                }
            },
            "required": ["botId", "topic"]
        }),
    }
}

/// Defines the video segment tool.
pub fn search_video_segment_tool() -> ToolDefinition {
    ToolDefinition {
        name: "searchVideoSegment".to_string(),
        description: "Find transcript segments by time range and speaker, with timestamped video links".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "botId": bot_id_property(),
                "startTime": {
                    "type": "number",
                    "description": "Start of the window in seconds",
                    "minimum": 0
                },
                "endTime": {
                    "type": "number",
                    "description": "End of the window in seconds (default: open-ended)",
                    "minimum": 0
                },
                "speaker": {
                    "type": "string",
                    "description": "Speaker name (partial, case-insensitive)"
                }
            },
            "required": ["botId"]
        }),
    }
}

/// Defines the intelligent search tool.
pub fn intelligent_search_tool() -> ToolDefinition {
    ToolDefinition {
        name: "intelligentSearch".to_string(),
        description: "Search meetings with a natural-language query. Picks a specific meeting, a meeting type, a calendar, recently viewed meetings or a general scan based on the query and filters.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Natural-language query, e.g. \"what did Alice say about pricing in sales meetings\""
                },
                "filters": {
                    "type": "object",
                    "description": "Explicit filters; each overrides the value parsed from the query",
                    "properties": {
                        "meetingType": { "type": "string" },
                        "botId": { "type": "string" },
                        "speaker": { "type": "string" },
                        "startTime": { "type": "number", "minimum": 0 },
                        "endTime": { "type": "number", "minimum": 0 },
                        "calendarId": { "type": "string" },
                        "topic": { "type": "string" }
                    },
                    "additionalProperties": false
                },
                "includeContext": {
                    "type": "boolean",
                    "description": "Include neighboring segments around each match (default: true)"
                },
                "maxResults": {
                    "type": "integer",
                    "description": "Maximum number of results (default: 20)",
                    "minimum": 1,
                    "maximum": 50
                },
                "sortBy": {
                    "type": "string",
                    "description": "Result ordering: relevance (default), date, speaker",
                    "enum": ["relevance", "date", "speaker"]
                }
            },
            "required": ["query"]
        }),
    }
}

/// Defines the shareable link tool.
pub fn shareable_link_tool() -> ToolDefinition {
    ToolDefinition {
        name: "shareableMeetingLink".to_string(),
        description: "Generate a shareable link to a meeting recording, optionally at a timestamp".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "botId": bot_id_property(),
                "timestamp": {
                    "type": "number",
                    "description": "Offset in seconds to jump to",
                    "minimum": 0
                },
                "title": { "type": "string", "description": "Heading for the link" },
                "speakerName": { "type": "string", "description": "Speaker at the timestamp" },
                "description": { "type": "string", "description": "What happens at the timestamp" }
            },
            "required": ["botId"]
        }),
    }
}

/// Defines the segment list tool.
pub fn share_segments_tool() -> ToolDefinition {
    ToolDefinition {
        name: "shareMeetingSegments".to_string(),
        description: "Generate a list of shareable links to several moments of one recording".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "botId": bot_id_property(),
                "segments": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "timestamp": { "type": "number", "minimum": 0 },
                            "speaker": { "type": "string" },
                            "description": { "type": "string" }
                        },
                        "required": ["timestamp", "description"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["botId", "segments"]
        }),
    }
}

/// Defines the meeting data tool.
pub fn get_meeting_data_tool() -> ToolDefinition {
    ToolDefinition {
        name: "getMeetingData".to_string(),
        description: "Get recording availability, duration and transcript size for a meeting".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": { "botId": bot_id_property() },
            "required": ["botId"]
        }),
    }
}

/// Defines the upcoming meetings tool.
pub fn list_upcoming_tool() -> ToolDefinition {
    ToolDefinition {
        name: "listUpcomingMeetings".to_string(),
        description: "List upcoming events of a calendar, marking those with a recording bot scheduled".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "calendarId": {
                    "type": "string",
                    "description": "ID of the connected calendar"
                }
            },
            "required": ["calendarId"]
        }),
    }
}

/// Defines the recent meetings tool.
pub fn list_recent_tool() -> ToolDefinition {
    ToolDefinition {
        name: "listRecentMeetings".to_string(),
        description: "List meetings accessed earlier in this session, most recent first".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

fn recording_mode_property() -> serde_json::Value {
    json!({
        "type": "string",
        "description": "Recording layout (default: speaker_view)",
        "enum": ["speaker_view", "gallery_view", "audio_only"]
    })
}

/// Defines the join meeting tool.
pub fn join_meeting_tool() -> ToolDefinition {
    ToolDefinition {
        name: "joinMeeting".to_string(),
        description: "Send a recording bot into a Zoom, Google Meet or Teams meeting".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "meetingUrl": {
                    "type": "string",
                    "format": "uri",
                    "description": "Link of the meeting to join"
                },
                "botName": {
                    "type": "string",
                    "description": "Name shown for the bot in the meeting"
                },
                "reserved": {
                    "type": "boolean",
                    "description": "Reserve a bot ahead of time instead of joining now (default: false)"
                },
                "startTime": {
                    "type": "integer",
                    "description": "Unix timestamp at which the bot joins",
                    "minimum": 0
                },
                "recordingMode": recording_mode_property()
            },
            "required": ["meetingUrl", "botName"]
        }),
    }
}

/// Defines the leave meeting tool.
pub fn leave_meeting_tool() -> ToolDefinition {
    ToolDefinition {
        name: "leaveMeeting".to_string(),
        description: "Remove a bot from the meeting it is recording".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": { "botId": bot_id_property() },
            "required": ["botId"]
        }),
    }
}

/// Defines the calendar listing tool.
pub fn list_calendars_tool() -> ToolDefinition {
    ToolDefinition {
        name: "listCalendars".to_string(),
        description: "List the calendars connected to the account".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

/// Defines the recording scheduler tool.
pub fn schedule_recording_tool() -> ToolDefinition {
    ToolDefinition {
        name: "scheduleRecording".to_string(),
        description: "Schedule a bot to record an upcoming calendar event".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "eventId": {
                    "type": "string",
                    "format": "uuid",
                    "description": "UUID of the calendar event to record"
                },
                "botName": {
                    "type": "string",
                    "description": "Name shown for the bot in the meeting"
                },
                "recordingMode": recording_mode_property()
            },
            "required": ["eventId", "botName"]
        }),
    }
}

/// Defines the data deletion tool.
pub fn delete_data_tool() -> ToolDefinition {
    ToolDefinition {
        name: "deleteData".to_string(),
        description: "Delete the recording, transcript and logs of a bot while keeping its metadata. Limited to 5 requests per minute per API key.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": { "botId": bot_id_property() },
            "required": ["botId"]
        }),
    }
}

/// Defines the retranscription tool.
pub fn retranscribe_tool() -> ToolDefinition {
    ToolDefinition {
        name: "retranscribeBot".to_string(),
        description: "Transcribe a recording again, optionally with another speech-to-text provider".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "botId": bot_id_property(),
                "speechToTextProvider": {
                    "type": "string",
                    "description": "Speech-to-text provider (default: the account default)",
                    "enum": ["Gladia", "Runpod", "Default"]
                },
                "speechToTextApiKey": {
                    "type": "string",
                    "description": "API key for the provider, if it needs one"
                },
                "webhookUrl": {
                    "type": "string",
                    "format": "uri",
                    "description": "Called when the new transcript is ready"
                }
            },
            "required": ["botId"]
        }),
    }
}
