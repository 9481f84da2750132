//! Tool execution handlers, grouped by concern.

mod bots;
mod links;
mod meetings;
mod moments;
mod search;

pub use bots::{
    execute_delete_data, execute_join_meeting, execute_leave_meeting, execute_list_calendars,
    execute_retranscribe, execute_schedule_recording,
};
pub use links::{execute_share_segments, execute_shareable_link};
pub use meetings::{execute_get_meeting_data, execute_list_recent, execute_list_upcoming};
pub use moments::execute_find_key_moments;
pub use search::{
    execute_find_meeting_topic, execute_intelligent_search, execute_search_by_type,
    execute_search_transcript, execute_search_video_segment,
};
