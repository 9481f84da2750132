//! Transcript analysis and search services.
//!
//! | Service | Role |
//! |---------|------|
//! | [`TopicExtractor`] | Candidate topics from word and phrase frequency |
//! | [`segment_scorer`] | Topic-match and structural scores |
//! | [`MomentSelector`] | Deduplicated, time-ordered key moments |
//! | [`QueryPlanner`] | Free text to [`SearchStrategy`](crate::models::SearchStrategy) |
//! | [`SearchDispatcher`] | Runs a plan against the gateway |
//! | [`RecentMeetingCache`] | Per-session recency list |

pub mod formatting;
mod moment_selector;
mod query_planner;
mod recent_meetings;
mod search_dispatcher;
pub mod segment_scorer;
mod topic_extraction;

pub use moment_selector::{MomentOptions, MomentSelector};
pub use query_planner::{
    ExplicitFilters, QueryPlan, QueryPlanner, extract_meeting_id, extract_meeting_type,
    extract_relative_date, extract_speaker, extract_time_range, extract_topic, residual_terms,
};
pub use recent_meetings::{
    DEFAULT_RECENT_CAPACITY, MAX_RECENT_MEETINGS, RecentMeeting, RecentMeetingCache,
};
pub use search_dispatcher::{
    EmptySearch, SearchDispatcher, SearchOutcome, SearchRequest, search_meeting,
    segments_in_window, topic_with_context, transcript_matches,
};
pub use topic_extraction::{
    STOP_WORDS, Topic, TopicExtractor, TopicExtractorConfig, is_stop_word, tokenize,
};
