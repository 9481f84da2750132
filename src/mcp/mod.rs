//! MCP server implementation.
//!
//! Exposes MeetingBaaS recordings to assistant hosts over the Model Context
//! Protocol.
//!
//! ## Features
//!
//! - **Tools**: key moments, transcript search, intelligent cross-meeting
//!   search, shareable links, calendar and session history
//! - **Resources**: transcripts and metadata via
//!   `meetingbaas://meeting/{botId}/{transcript|metadata}`
//!
//! ## Usage
//!
//! ### Stdio Transport (Claude Desktop)
//!
//! ```bash
//! meetingbaas-mcp serve
//! ```
//!
//! ### Claude Desktop Configuration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "meetingbaas": {
//!       "command": "meetingbaas-mcp",
//!       "args": ["serve"],
//!       "env": { "MEETING_BAAS_API_KEY": "<your key>" }
//!     }
//!   }
//! }
//! ```
//!
//! Hosts that forward headers may instead pass `x-api-key` (or
//! `x-meeting-baas-api-key`) in the request's `_meta`.

// Allow unused_self for methods kept for API consistency.
#![allow(clippy::unused_self)]
// Allow unnecessary wraps for methods that return Result for API consistency.
#![allow(clippy::unnecessary_wraps)]
// Allow ok_or with function calls - the error path is uncommon.
#![allow(clippy::or_fun_call)]
// Allow format_push_string - we prefer readability over micro-optimization here.
#![allow(clippy::format_push_string)]
// Allow option_if_let_else for clearer match statements.
#![allow(clippy::option_if_let_else)]
// Allow match_same_arms for explicit enum handling with default fallback.
#![allow(clippy::match_same_arms)]

mod resources;
mod server;
mod session;
mod tool_types;
mod tools;

pub use resources::{
    MeetingView, ResourceContent, ResourceDefinition, ResourceHandler, ResourceTemplate,
    parse_meeting_uri,
};
pub use server::{McpServer, RateLimitConfig};
pub use session::{AUTH_REQUIRED_MESSAGE, ApiKeyResolver, SessionContext, key_from_headers};
pub use tool_types::{MAX_QUERY_LENGTH, MAX_RESULT_LIMIT};
pub use tools::{ToolContent, ToolDefinition, ToolRegistry, ToolResult};
