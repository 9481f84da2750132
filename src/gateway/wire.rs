//! Wire shapes of the MeetingBaaS REST API and their conversion to models.
//!
//! Transcript fields are validated strictly; optional metadata (the free-form
//! `extra` and `bot_param` objects) is read leniently so an unrelated field
//! cannot make a whole meeting unreadable.

use crate::models::{
    BotRequest, Calendar, CalendarEvent, Meeting, MeetingSummary, RecordingMode,
    RecordingSettings, RetranscribeRequest, TranscriptSegment, TranscriptionProvider,
    UNKNOWN_SPEAKER,
};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /bots/meeting_data` response.
#[derive(Debug, Deserialize)]
pub struct MeetingDataResponse {
    /// Bot metadata and transcript.
    pub bot_data: BotData,
    /// Recording URL.
    #[serde(default)]
    pub mp4: Option<String>,
    /// Recording length in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
}

/// `bot_data` object.
#[derive(Debug, Deserialize)]
pub struct BotData {
    /// Bot metadata.
    pub bot: WireBotInfo,
    /// Transcript segments.
    #[serde(default)]
    pub transcripts: Vec<WireTranscript>,
}

/// Bot metadata inside meeting data.
#[derive(Debug, Deserialize)]
pub struct WireBotInfo {
    /// Bot display name.
    #[serde(default)]
    pub bot_name: Option<String>,
    /// Meeting URL.
    #[serde(default)]
    pub meeting_url: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Creator email.
    #[serde(default)]
    pub creator_email: Option<String>,
    /// Free-form extra metadata.
    #[serde(default)]
    pub extra: Option<Value>,
}

/// One transcript segment.
#[derive(Debug, Deserialize)]
pub struct WireTranscript {
    /// Speaker name.
    #[serde(default)]
    pub speaker: Option<String>,
    /// Start offset in seconds.
    pub start_time: f64,
    /// End offset in seconds.
    #[serde(default)]
    pub end_time: Option<f64>,
    /// Word tokens.
    #[serde(default)]
    pub words: Vec<WireWord>,
}

/// One word token.
#[derive(Debug, Deserialize)]
pub struct WireWord {
    /// Token text.
    pub text: String,
}

/// `GET /bots/` response: either a bare array or wrapped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BotListResponse {
    /// `[ ... ]`
    Bare(Vec<WireBot>),
    /// `{ "bots": [ ... ] }`
    Wrapped {
        /// Bot entries.
        bots: Vec<WireBot>,
    },
}

/// One entry of the bot listing.
#[derive(Debug, Deserialize)]
pub struct WireBot {
    /// Bot identifier.
    #[serde(alias = "bot_id", alias = "id")]
    pub uuid: String,
    /// Bot display name.
    #[serde(default)]
    pub bot_name: Option<String>,
    /// Meeting URL.
    #[serde(default)]
    pub meeting_url: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Creator email.
    #[serde(default)]
    pub creator_email: Option<String>,
    /// Free-form extra metadata.
    #[serde(default)]
    pub extra: Option<Value>,
}

/// `GET /calendar_events/` response.
#[derive(Debug, Deserialize)]
pub struct CalendarEventsResponse {
    /// Events on this page.
    pub data: Vec<WireCalendarEvent>,
}

/// One calendar event.
#[derive(Debug, Deserialize)]
pub struct WireCalendarEvent {
    /// Event identifier.
    pub uuid: String,
    /// Event title.
    #[serde(default)]
    pub name: String,
    /// Scheduled start, RFC 3339.
    pub start_time: String,
    /// Soft-delete flag.
    #[serde(default)]
    pub deleted: bool,
    /// Attached bot identifier.
    #[serde(default)]
    pub bot_id: Option<String>,
    /// Bot parameters when a recording is scheduled.
    #[serde(default)]
    pub bot_param: Option<Value>,
}

/// One entry of `GET /calendars/`.
#[derive(Debug, Deserialize)]
pub struct WireCalendar {
    /// Calendar identifier.
    pub uuid: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Owner email.
    #[serde(default)]
    pub email: String,
}

impl From<WireCalendar> for Calendar {
    fn from(wire: WireCalendar) -> Self {
        Self {
            id: wire.uuid,
            name: wire.name,
            email: wire.email,
        }
    }
}

/// `POST /bots/` request body.
#[derive(Debug, Serialize)]
pub struct JoinBotBody<'a> {
    meeting_url: &'a str,
    bot_name: &'a str,
    reserved: bool,
    recording_mode: RecordingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time: Option<i64>,
    extra: Value,
}

impl<'a> From<&'a BotRequest> for JoinBotBody<'a> {
    fn from(request: &'a BotRequest) -> Self {
        Self {
            meeting_url: &request.meeting_url,
            bot_name: &request.bot_name,
            reserved: request.reserved,
            recording_mode: request.recording_mode,
            start_time: request.start_time,
            extra: Value::Object(serde_json::Map::new()),
        }
    }
}

/// `POST /bots/` response.
#[derive(Debug, Deserialize)]
pub struct JoinBotResponse {
    /// Identifier of the new bot.
    pub bot_id: String,
}

/// `POST /calendar_events/{id}/bot` request body.
#[derive(Debug, Serialize)]
pub struct ScheduleBotBody<'a> {
    bot_name: &'a str,
    recording_mode: RecordingMode,
    extra: Value,
}

impl<'a> From<&'a RecordingSettings> for ScheduleBotBody<'a> {
    fn from(settings: &'a RecordingSettings) -> Self {
        Self {
            bot_name: &settings.bot_name,
            recording_mode: settings.recording_mode,
            extra: Value::Object(serde_json::Map::new()),
        }
    }
}

/// `POST /bots/{id}/delete_data` response.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteDataResponse {
    /// Outcome reported by the API, e.g. `deleted`.
    #[serde(default)]
    pub status: Option<String>,
}

/// `POST /bots/retranscribe` request body.
#[derive(Debug, Serialize)]
pub struct RetranscribeBody<'a> {
    bot_uuid: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_to_text: Option<SpeechToTextBody<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    webhook_url: Option<&'a str>,
}

/// Engine selection inside [`RetranscribeBody`].
#[derive(Debug, Serialize)]
pub struct SpeechToTextBody<'a> {
    provider: TranscriptionProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

impl<'a> From<&'a RetranscribeRequest> for RetranscribeBody<'a> {
    fn from(request: &'a RetranscribeRequest) -> Self {
        // The engine key is only meaningful next to an explicit engine.
        let speech_to_text = request.provider.map(|provider| SpeechToTextBody {
            provider,
            api_key: request.provider_api_key.as_ref().map(ExposeSecret::expose_secret),
        });
        Self {
            bot_uuid: &request.bot_id,
            speech_to_text,
            webhook_url: request.webhook_url.as_deref(),
        }
    }
}

impl MeetingDataResponse {
    /// Converts to a [`Meeting`], validating segment timestamps.
    pub fn into_meeting(self, meeting_id: &str) -> Result<Meeting> {
        let bot = self.bot_data.bot;
        let segments = self
            .bot_data
            .transcripts
            .into_iter()
            .map(WireTranscript::into_segment)
            .collect::<Result<Vec<_>>>()?;

        let summary = MeetingSummary {
            id: meeting_id.to_string(),
            title: bot.bot_name.unwrap_or_else(|| meeting_id.to_string()),
            meeting_url: bot.meeting_url,
            meeting_type: extra_meeting_type(bot.extra.as_ref()),
            created_at: bot.created_at.as_deref().and_then(parse_timestamp),
            creator_email: bot.creator_email,
            participants: extra_participants(bot.extra.as_ref()),
        };

        let meeting = Meeting::new(summary, self.mp4.unwrap_or_default(), segments);
        Ok(match self.duration.filter(|d| d.is_finite() && *d >= 0.0) {
            Some(duration) => meeting.with_duration(duration),
            None => meeting,
        })
    }
}

impl WireTranscript {
    fn into_segment(self) -> Result<TranscriptSegment> {
        if !self.start_time.is_finite() || self.start_time < 0.0 {
            return Err(Error::MalformedResponse {
                operation: "fetch_meeting".to_string(),
                cause: format!("invalid segment start_time {}", self.start_time),
            });
        }
        let speaker = self
            .speaker
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_SPEAKER.to_string());

        Ok(TranscriptSegment {
            speaker,
            start_time: self.start_time,
            end_time: self.end_time.filter(|e| e.is_finite() && *e >= self.start_time),
            words: self.words.into_iter().map(|w| w.text).collect(),
        })
    }
}

impl BotListResponse {
    /// Converts to meeting summaries in API order.
    pub fn into_summaries(self) -> Vec<MeetingSummary> {
        let bots = match self {
            Self::Bare(bots) | Self::Wrapped { bots } => bots,
        };
        bots.into_iter().map(WireBot::into_summary).collect()
    }
}

impl WireBot {
    fn into_summary(self) -> MeetingSummary {
        MeetingSummary {
            title: self.bot_name.unwrap_or_else(|| self.uuid.clone()),
            id: self.uuid,
            meeting_url: self.meeting_url,
            meeting_type: extra_meeting_type(self.extra.as_ref()),
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
            creator_email: self.creator_email,
            participants: extra_participants(self.extra.as_ref()),
        }
    }
}

impl CalendarEventsResponse {
    /// Converts to calendar events, dropping deleted ones.
    pub fn into_events(self) -> Result<Vec<CalendarEvent>> {
        self.data
            .into_iter()
            .filter(|e| !e.deleted)
            .map(WireCalendarEvent::into_event)
            .collect()
    }
}

impl WireCalendarEvent {
    fn into_event(self) -> Result<CalendarEvent> {
        let start_time =
            parse_timestamp(&self.start_time).ok_or_else(|| Error::MalformedResponse {
                operation: "list_calendar_events".to_string(),
                cause: format!("invalid start_time '{}'", self.start_time),
            })?;

        let bot_param = self.bot_param.as_ref();
        let meeting_id = self.bot_id.or_else(|| {
            bot_param
                .and_then(|p| p.get("bot_id"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });

        Ok(CalendarEvent {
            id: self.uuid,
            name: self.name,
            start_time,
            meeting_id,
            meeting_type: extra_meeting_type(bot_param.and_then(|p| p.get("extra"))),
        })
    }
}

/// Parses RFC 3339 or naive ISO timestamps (assumed UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn extra_meeting_type(extra: Option<&Value>) -> Option<String> {
    extra
        .and_then(|e| e.get("meetingType").or_else(|| e.get("meeting_type")))
        .and_then(Value::as_str)
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
}

fn extra_participants(extra: Option<&Value>) -> Vec<String> {
    extra
        .and_then(|e| e.get("participants"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
