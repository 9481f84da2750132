//! Per-session cache of recently searched meetings.
//!
//! Bounded LRU keyed by meeting id. Recording an entry that is already
//! present refreshes it; once the bound is exceeded the least recently
//! touched entry is evicted. There is no expiry.

use crate::models::Meeting;
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use tracing::instrument;

/// Upper bound on meetings remembered per session.
pub const MAX_RECENT_MEETINGS: usize = 5;

/// Default number of meetings remembered per session.
pub const DEFAULT_RECENT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(MAX_RECENT_MEETINGS) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Lightweight metadata kept for a recently searched meeting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentMeeting {
    /// Bot / recording identifier.
    pub id: String,
    /// Meeting title.
    pub title: String,
    /// Type tag, if known.
    pub meeting_type: Option<String>,
    /// Topics detected when the meeting was recorded.
    pub topics: Vec<String>,
    /// Participant names.
    pub participants: Vec<String>,
}

/// Most-recently-used list of meetings owned by one session.
#[derive(Debug)]
pub struct RecentMeetingCache {
    entries: LruCache<String, RecentMeeting>,
}

impl Default for RecentMeetingCache {
    fn default() -> Self {
        Self {
            entries: LruCache::new(DEFAULT_RECENT_CAPACITY),
        }
    }
}

impl RecentMeetingCache {
    /// Creates a cache holding `capacity` meetings, clamped to
    /// `1..=MAX_RECENT_MEETINGS`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity =
            NonZeroUsize::new(capacity.min(MAX_RECENT_MEETINGS)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Records a successful lookup, making the meeting the most recent entry.
    #[instrument(
        skip(self, meeting, topics),
        fields(operation = "recent_meeting_record", meeting_id = %meeting.id())
    )]
    pub fn record(&mut self, meeting: &Meeting, topics: Vec<String>) {
        let entry = RecentMeeting {
            id: meeting.id().to_string(),
            title: meeting.title().to_string(),
            meeting_type: meeting.summary.meeting_type.clone(),
            topics,
            participants: meeting.participants(),
        };
        if let Some((evicted, _)) = self.entries.push(entry.id.clone(), entry) {
            if evicted != meeting.id() {
                tracing::debug!(evicted = %evicted, "Evicted oldest recent meeting");
            }
        }
    }

    /// Forgets every cached meeting.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns true if the meeting is cached, without touching its recency.
    #[must_use]
    pub fn contains(&self, meeting_id: &str) -> bool {
        self.entries.contains(meeting_id)
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &RecentMeeting> {
        self.entries.iter().map(|(_, entry)| entry)
    }

    /// Returns the cached meeting ids, most recent first.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Number of cached meetings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no meeting has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached meetings.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}
