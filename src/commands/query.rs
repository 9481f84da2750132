//! One-shot analysis commands.
//!
//! Both commands run the same tool handlers the MCP server exposes, against
//! the HTTP API with the configured key.

use meetingbaas_mcp::mcp::{ToolRegistry, ToolResult};
use meetingbaas_mcp::models::{Granularity, SortBy};
use meetingbaas_mcp::MeetingBaasConfig;
use serde_json::{Map, Value, json};

/// Arguments of the `moments` command.
pub struct MomentsArgs {
    pub bot_id: String,
    pub topics: Vec<String>,
    pub max: usize,
    pub granularity: String,
    pub auto_detect: bool,
}

/// Arguments of the `search` command.
pub struct SearchArgs {
    pub query: String,
    pub bot_id: Option<String>,
    pub meeting_type: Option<String>,
    pub speaker: Option<String>,
    pub calendar_id: Option<String>,
    pub max: Option<usize>,
    pub sort: String,
    pub include_context: bool,
}

/// Moments command.
pub async fn cmd_moments(config: &MeetingBaasConfig, args: MomentsArgs) -> anyhow::Result<()> {
    let arguments = json!({
        "botId": args.bot_id,
        "topics": args.topics,
        "maxMoments": args.max,
        "granularity": Granularity::parse(&args.granularity),
        "autoDetectTopics": args.auto_detect,
    });
    run_tool(config, "findKeyMoments", arguments).await
}

/// Search command.
pub async fn cmd_search(config: &MeetingBaasConfig, args: SearchArgs) -> anyhow::Result<()> {
    let mut filters = Map::new();
    for (key, value) in [
        ("botId", args.bot_id),
        ("meetingType", args.meeting_type),
        ("speaker", args.speaker),
        ("calendarId", args.calendar_id),
    ] {
        if let Some(value) = value {
            filters.insert(key.to_string(), Value::String(value));
        }
    }

    let mut arguments = json!({
        "query": args.query,
        "filters": filters,
        "includeContext": args.include_context,
        "sortBy": SortBy::parse(&args.sort),
    });
    if let Some(max) = args.max {
        arguments["maxResults"] = json!(max);
    }
    run_tool(config, "intelligentSearch", arguments).await
}

async fn run_tool(config: &MeetingBaasConfig, name: &str, arguments: Value) -> anyhow::Result<()> {
    let mut session = super::http_session(config);
    let result = ToolRegistry::new()
        .execute(name, arguments, &mut session, None)
        .await?;
    print_result(&result)
}

fn print_result(result: &ToolResult) -> anyhow::Result<()> {
    if result.is_error {
        anyhow::bail!("{}", result.joined_text());
    }
    println!("{}", result.joined_text());
    Ok(())
}
