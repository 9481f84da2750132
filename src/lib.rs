//! # meetingbaas-mcp
//!
//! Model Context Protocol server for MeetingBaaS meeting recordings.
//!
//! Besides thin access to recordings and transcripts, the crate carries a
//! heuristic transcript-analysis engine:
//!
//! - Topic extraction from transcript text (word and n-gram frequency)
//! - Segment scoring against topics and structural heuristics
//! - Key-moment selection with temporal deduplication
//! - A natural-language query planner choosing a search strategy
//! - A search dispatcher that runs the strategy across one or many meetings
//!
//! ## Example
//!
//! ```rust,ignore
//! use meetingbaas_mcp::services::{MomentSelector, MomentOptions};
//!
//! let moments = MomentSelector::new(MomentOptions::default())
//!     .select(&meeting.segments, &["budget".to_string()]);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod gateway;
pub mod mcp;
pub mod models;
pub mod observability;
pub mod services;

// Re-exports for convenience
pub use config::{Environment, MeetingBaasConfig, SearchSettings};
pub use gateway::{GatewayConnector, HttpConnector, InMemoryGateway, MeetingGateway};
pub use models::{
    CalendarEvent, KeyMoment, Meeting, MeetingSummary, MomentKind, SearchStrategy, SortBy,
    TimeRange, TranscriptSegment,
};
pub use services::{
    MomentSelector, QueryPlan, QueryPlanner, RecentMeetingCache, SearchDispatcher, TopicExtractor,
};

/// Error type for meetingbaas-mcp operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed tool arguments, unknown tool, bad resource URI |
/// | `Unauthorized` | No API key resolved, or the API answered 401/403 |
/// | `NotFound` | The API answered 404 for a meeting or calendar |
/// | `RateLimited` | The API answered 429 |
/// | `GatewayUnavailable` | Network failure, timeout, 5xx or unexpected status |
/// | `MalformedResponse` | The API answered with a body that fails validation |
/// | `OperationFailed` | Local I/O, config parsing, observability setup |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - JSON deserialization fails in MCP tool handlers
    /// - A required field is blank or out of range
    /// - A resource URI does not match a known template
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Authentication failed.
    ///
    /// Fatal: aborts multi-meeting scans immediately.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The requested meeting, calendar or topic does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The API rejected the call because the key exceeded its request quota.
    #[error("rate limit exceeded on '{0}'")]
    RateLimited(String),

    /// The meeting-data API could not be reached or failed transiently.
    #[error("gateway call '{operation}' failed: {cause}")]
    GatewayUnavailable {
        /// The gateway operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The meeting-data API returned an unexpected payload shape.
    #[error("malformed response from '{operation}': {cause}")]
    MalformedResponse {
        /// The gateway operation whose response was rejected.
        operation: String,
        /// What failed validation.
        cause: String,
    },

    /// A local operation failed.
    ///
    /// Raised when:
    /// - Filesystem I/O errors occur (config, log file)
    /// - Config TOML fails to parse
    /// - Observability components fail to initialize
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Returns true if the error must abort a whole tool call.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Returns true if a multi-meeting scan may log this error and move on.
    #[must_use]
    pub const fn is_skippable(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::RateLimited(_)
                | Self::GatewayUnavailable { .. }
                | Self::MalformedResponse { .. }
        )
    }
}

/// Result type alias for meetingbaas-mcp operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::GatewayUnavailable {
            operation: "fetch_meeting".to_string(),
            cause: "503".to_string(),
        };
        assert_eq!(err.to_string(), "gateway call 'fetch_meeting' failed: 503");

        let err = Error::NotFound("meeting abc".to_string());
        assert_eq!(err.to_string(), "not found: meeting abc");
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::Unauthorized("bad key".to_string()).is_fatal());
        assert!(!Error::Unauthorized("bad key".to_string()).is_skippable());
        assert!(Error::NotFound("x".to_string()).is_skippable());
        assert!(Error::RateLimited("delete_data".to_string()).is_skippable());
        assert!(
            Error::MalformedResponse {
                operation: "list_meetings".to_string(),
                cause: "missing field".to_string(),
            }
            .is_skippable()
        );
        assert!(
            !Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: "io".to_string(),
            }
            .is_skippable()
        );
    }
}
