//! Data models for meetingbaas-mcp.
//!
//! Request-scoped value objects shared by the gateway, the analysis services
//! and the MCP layer.

mod bots;
mod moments;
mod search;
mod transcript;

pub use bots::{
    BotRequest, Calendar, RecordingMode, RecordingSettings, RetranscribeRequest,
    RetranscribeStatus, TranscriptionProvider,
};
pub use moments::{Granularity, KeyMoment, MomentKind};
pub use search::{
    DateWindow, HitSegment, RelativeDate, SearchConstraints, SearchHit, SearchStrategy,
    SegmentRole, SortBy, TimeRange,
};
pub use transcript::{
    CalendarEvent, DEFAULT_SEGMENT_SECS, Meeting, MeetingSummary, TranscriptSegment,
    UNKNOWN_SPEAKER,
};
