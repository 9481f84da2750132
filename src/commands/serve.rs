//! Serve command handler.

use meetingbaas_mcp::MeetingBaasConfig;
use meetingbaas_mcp::mcp::{McpServer, RateLimitConfig};

/// Serve command.
///
/// CLI flags override `MEETING_BAAS_MCP_RATE_LIMIT_*`.
pub async fn cmd_serve(
    config: &MeetingBaasConfig,
    rate_limit_max: Option<usize>,
    rate_limit_window: Option<u64>,
) -> anyhow::Result<()> {
    let mut rate_limit = RateLimitConfig::from_env();
    if let Some(max) = rate_limit_max {
        rate_limit = rate_limit.with_max_requests(max);
    }
    if let Some(secs) = rate_limit_window {
        rate_limit = rate_limit.with_window_secs(secs);
    }

    if config.api_key.is_none() {
        tracing::warn!(
            "No API key configured; tool calls must supply one in request headers"
        );
    }

    let mut server = McpServer::new(super::http_session(config)).with_rate_limit(rate_limit);
    server.run_stdio().await?;
    Ok(())
}
