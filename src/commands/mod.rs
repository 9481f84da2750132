//! Command handlers module.
//!
//! - `serve.rs`: the MCP stdio server
//! - `query.rs`: one-shot moments and search commands
//! - `config.rs`: configuration display

mod config;
mod query;
mod serve;

use meetingbaas_mcp::mcp::SessionContext;
use meetingbaas_mcp::{HttpConnector, MeetingBaasConfig};
use std::sync::Arc;

pub use config::cmd_config;
pub use query::{MomentsArgs, SearchArgs, cmd_moments, cmd_search};
pub use serve::cmd_serve;

/// Builds a session backed by the HTTP API.
fn http_session(config: &MeetingBaasConfig) -> SessionContext {
    SessionContext::from_config(config, Arc::new(HttpConnector::from_config(config)))
}
