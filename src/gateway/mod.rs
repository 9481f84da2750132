//! Meeting-data gateway.
//!
//! The analysis services only ever see typed models; this module owns the
//! boundary to the MeetingBaaS REST API.
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`HttpGateway`] | Live API over HTTPS |
//! | [`InMemoryGateway`] | Fixed data, failure injection, call recording |

mod http;
mod memory;
pub mod wire;

pub use http::{API_KEY_HEADER, HttpConnector, HttpGateway, REQUEST_ID_HEADER};
pub use memory::{GatewayCall, InMemoryGateway};

use crate::Result;
use crate::models::{
    BotRequest, Calendar, CalendarEvent, DateWindow, Meeting, MeetingSummary, RecordingSettings,
    RetranscribeRequest, RetranscribeStatus,
};
use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::Arc;

/// Access to meetings, transcripts, calendars and bot lifecycle.
///
/// Failures use the crate error taxonomy: `Unauthorized` for rejected keys,
/// `NotFound` for unknown ids, `RateLimited` for exhausted quotas,
/// `GatewayUnavailable` for transport problems and `MalformedResponse` for
/// payloads that fail validation.
#[async_trait]
pub trait MeetingGateway: Send + Sync {
    /// Fetches one meeting with its full transcript.
    async fn fetch_meeting(&self, meeting_id: &str) -> Result<Meeting>;

    /// Lists all meetings (metadata only).
    async fn list_meetings(&self) -> Result<Vec<MeetingSummary>>;

    /// Lists non-deleted events of a calendar, optionally within a window.
    async fn list_calendar_events(
        &self,
        calendar_id: &str,
        range: Option<&DateWindow>,
    ) -> Result<Vec<CalendarEvent>>;

    /// Lists the calendars connected to the account.
    async fn list_calendars(&self) -> Result<Vec<Calendar>>;

    /// Sends a bot into a meeting and returns the new bot's id.
    async fn join_meeting(&self, request: &BotRequest) -> Result<String>;

    /// Removes a bot from its meeting.
    async fn leave_meeting(&self, bot_id: &str) -> Result<()>;

    /// Attaches a recording bot to a calendar event.
    async fn schedule_recording(
        &self,
        event_id: &str,
        settings: &RecordingSettings,
    ) -> Result<()>;

    /// Deletes the recording, transcript and logs of a bot, keeping its
    /// metadata. Returns the status reported by the API.
    async fn delete_data(&self, bot_id: &str) -> Result<String>;

    /// Requests a new transcription of an existing recording.
    async fn retranscribe(&self, request: &RetranscribeRequest) -> Result<RetranscribeStatus>;
}

/// Creates a gateway bound to one API key.
pub trait GatewayConnector: Send + Sync {
    /// Returns a gateway that authenticates with `api_key`.
    fn connect(&self, api_key: &SecretString) -> Arc<dyn MeetingGateway>;
}
