//! In-memory meeting gateway.
//!
//! Serves a fixed set of meetings and calendar events. Individual meetings
//! can be marked unreachable to exercise partial-failure handling, and every
//! call is recorded for inspection. Bots sent into meetings get sequential
//! ids (`memory-bot-1`, `memory-bot-2`, ...).

use super::{GatewayConnector, MeetingGateway};
use crate::models::{
    BotRequest, Calendar, CalendarEvent, DateWindow, Meeting, MeetingSummary, RecordingSettings,
    RetranscribeRequest, RetranscribeStatus,
};
use crate::{Error, Result};
use async_trait::async_trait;
use secrecy::SecretString;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// A gateway call as seen by [`InMemoryGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    /// `fetch_meeting(id)`
    FetchMeeting(String),
    /// `list_meetings()`
    ListMeetings,
    /// `list_calendar_events(calendar_id, ..)`
    ListCalendarEvents(String),
    /// `list_calendars()`
    ListCalendars,
    /// `join_meeting(request)`, by meeting URL.
    JoinMeeting(String),
    /// `leave_meeting(bot_id)`
    LeaveMeeting(String),
    /// `schedule_recording(event_id, ..)`
    ScheduleRecording(String),
    /// `delete_data(bot_id)`
    DeleteData(String),
    /// `retranscribe(request)`, by bot id.
    Retranscribe(String),
}

#[derive(Default)]
struct Inner {
    meetings: HashMap<String, Meeting>,
    order: Vec<MeetingSummary>,
    calendars: HashMap<String, Vec<CalendarEvent>>,
    connected: Vec<Calendar>,
    unreachable: HashSet<String>,
    calls: Mutex<Vec<GatewayCall>>,
    active_bots: Mutex<HashSet<String>>,
}

/// Gateway backed by in-process data.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    inner: Arc<Inner>,
}

impl InMemoryGateway {
    /// Creates a gateway listing the meetings in the given order.
    #[must_use]
    pub fn new(meetings: Vec<Meeting>) -> Self {
        let order = meetings.iter().map(|m| m.summary.clone()).collect();
        let meetings = meetings
            .into_iter()
            .map(|m| (m.id().to_string(), m))
            .collect();
        Self {
            inner: Arc::new(Inner {
                meetings,
                order,
                ..Inner::default()
            }),
        }
    }

    /// Adds calendar events under a calendar id.
    #[must_use]
    pub fn with_calendar(self, calendar_id: impl Into<String>, events: Vec<CalendarEvent>) -> Self {
        self.rebuild(|inner| {
            inner.calendars.insert(calendar_id.into(), events);
        })
    }

    /// Adds a connected calendar returned by `list_calendars`.
    #[must_use]
    pub fn with_connected_calendar(self, calendar: Calendar) -> Self {
        self.rebuild(|inner| inner.connected.push(calendar))
    }

    /// Makes calls on the given meeting fail transiently.
    #[must_use]
    pub fn with_unreachable(self, meeting_id: impl Into<String>) -> Self {
        self.rebuild(|inner| {
            inner.unreachable.insert(meeting_id.into());
        })
    }

    /// Returns every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.inner
            .calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Returns the ids of bots currently sent into meetings.
    #[must_use]
    pub fn active_bots(&self) -> HashSet<String> {
        self.inner
            .active_bots
            .lock()
            .map(|bots| bots.clone())
            .unwrap_or_default()
    }

    /// Fails like the API does for unknown or unreachable recordings.
    fn check_recording(&self, operation: &str, bot_id: &str) -> Result<()> {
        if self.inner.unreachable.contains(bot_id) {
            return Err(Error::GatewayUnavailable {
                operation: operation.to_string(),
                cause: format!("meeting {bot_id} unreachable"),
            });
        }
        if self.inner.meetings.contains_key(bot_id) {
            Ok(())
        } else {
            Err(Error::NotFound(format!("meeting {bot_id}")))
        }
    }

    fn lock_bots(&self, operation: &str) -> Result<MutexGuard<'_, HashSet<String>>> {
        self.inner
            .active_bots
            .lock()
            .map_err(|e| Error::OperationFailed {
                operation: operation.to_string(),
                cause: e.to_string(),
            })
    }

    fn record(&self, call: GatewayCall) {
        if let Ok(mut calls) = self.inner.calls.lock() {
            calls.push(call);
        }
    }

    fn rebuild(self, edit: impl FnOnce(&mut Inner)) -> Self {
        let mut inner = Inner {
            meetings: self.inner.meetings.clone(),
            order: self.inner.order.clone(),
            calendars: self.inner.calendars.clone(),
            connected: self.inner.connected.clone(),
            unreachable: self.inner.unreachable.clone(),
            calls: Mutex::new(self.calls()),
            active_bots: Mutex::new(self.active_bots()),
        };
        edit(&mut inner);
        Self {
            inner: Arc::new(inner),
        }
    }
}

#[async_trait]
impl MeetingGateway for InMemoryGateway {
    async fn fetch_meeting(&self, meeting_id: &str) -> Result<Meeting> {
        self.record(GatewayCall::FetchMeeting(meeting_id.to_string()));
        self.check_recording("fetch_meeting", meeting_id)?;
        self.inner
            .meetings
            .get(meeting_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("meeting {meeting_id}")))
    }

    async fn list_meetings(&self) -> Result<Vec<MeetingSummary>> {
        self.record(GatewayCall::ListMeetings);
        Ok(self.inner.order.clone())
    }

    async fn list_calendar_events(
        &self,
        calendar_id: &str,
        range: Option<&DateWindow>,
    ) -> Result<Vec<CalendarEvent>> {
        self.record(GatewayCall::ListCalendarEvents(calendar_id.to_string()));
        let events = self
            .inner
            .calendars
            .get(calendar_id)
            .ok_or_else(|| Error::NotFound(format!("calendar {calendar_id}")))?;
        Ok(events
            .iter()
            .filter(|e| range.is_none_or(|r| e.start_time >= r.start && e.start_time < r.end))
            .cloned()
            .collect())
    }

    async fn list_calendars(&self) -> Result<Vec<Calendar>> {
        self.record(GatewayCall::ListCalendars);
        Ok(self.inner.connected.clone())
    }

    async fn join_meeting(&self, request: &BotRequest) -> Result<String> {
        self.record(GatewayCall::JoinMeeting(request.meeting_url.clone()));
        let joins = self
            .calls()
            .iter()
            .filter(|c| matches!(c, GatewayCall::JoinMeeting(_)))
            .count();
        let bot_id = format!("memory-bot-{joins}");
        self.lock_bots("join_meeting")?.insert(bot_id.clone());
        Ok(bot_id)
    }

    async fn leave_meeting(&self, bot_id: &str) -> Result<()> {
        self.record(GatewayCall::LeaveMeeting(bot_id.to_string()));
        if self.lock_bots("leave_meeting")?.remove(bot_id) {
            Ok(())
        } else {
            Err(Error::NotFound(format!("bot {bot_id}")))
        }
    }

    async fn schedule_recording(
        &self,
        event_id: &str,
        _settings: &RecordingSettings,
    ) -> Result<()> {
        self.record(GatewayCall::ScheduleRecording(event_id.to_string()));
        let known = self
            .inner
            .calendars
            .values()
            .flatten()
            .any(|e| e.id == event_id);
        if known {
            Ok(())
        } else {
            Err(Error::NotFound(format!("calendar event {event_id}")))
        }
    }

    async fn delete_data(&self, bot_id: &str) -> Result<String> {
        self.record(GatewayCall::DeleteData(bot_id.to_string()));
        self.check_recording("delete_data", bot_id)?;
        Ok("deleted".to_string())
    }

    async fn retranscribe(&self, request: &RetranscribeRequest) -> Result<RetranscribeStatus> {
        self.record(GatewayCall::Retranscribe(request.bot_id.clone()));
        self.check_recording("retranscribe", &request.bot_id)?;
        Ok(RetranscribeStatus::Queued)
    }
}

impl GatewayConnector for InMemoryGateway {
    fn connect(&self, _api_key: &SecretString) -> Arc<dyn MeetingGateway> {
        Arc::new(self.clone())
    }
}
