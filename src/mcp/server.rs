//! MCP server setup and lifecycle.
//!
//! Implements a JSON-RPC 2.0 MCP server over stdio. One request per line in,
//! one response per line out. The process is a trusted local child of the
//! assistant host; API keys arrive per request in `_meta` or from the
//! environment and config.

// Allow cast_precision_loss for timing metrics.
#![allow(clippy::cast_precision_loss)]

use crate::mcp::session::SessionContext;
use crate::mcp::{ResourceHandler, ToolRegistry};
use crate::observability::{RequestContext, scope_request_context};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{Instrument, info_span};

/// Default maximum requests per rate limit window.
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: usize = 1000;

/// Default rate limit window duration (1 minute).
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Maximum request size (1 MiB).
const MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024;

/// MCP rate limit configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: usize,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
        }
    }
}

impl RateLimitConfig {
    /// Creates config from environment variables.
    ///
    /// Reads `MEETING_BAAS_MCP_RATE_LIMIT_MAX_REQUESTS` and
    /// `MEETING_BAAS_MCP_RATE_LIMIT_WINDOW_SECS` from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let max_requests = std::env::var("MEETING_BAAS_MCP_RATE_LIMIT_MAX_REQUESTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_MAX_REQUESTS);

        let window_secs = std::env::var("MEETING_BAAS_MCP_RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS);

        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Sets maximum requests per window.
    #[must_use]
    pub const fn with_max_requests(mut self, max: usize) -> Self {
        self.max_requests = max;
        self
    }

    /// Sets window duration in seconds.
    #[must_use]
    pub const fn with_window_secs(mut self, secs: u64) -> Self {
        self.window = Duration::from_secs(secs);
        self
    }
}

/// MCP protocol version.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name.
const SERVER_NAME: &str = "meetingbaas-mcp";

/// Fixed-window request counter.
#[derive(Debug)]
struct RateLimiter {
    config: RateLimitConfig,
    count: usize,
    window_start: Instant,
}

impl RateLimiter {
    fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            count: 0,
            window_start: Instant::now(),
        }
    }

    /// Counts one request; returns false if it exceeds the limit.
    fn admit(&mut self) -> bool {
        if self.window_start.elapsed() > self.config.window {
            self.count = 0;
            self.window_start = Instant::now();
        }
        if self.count >= self.config.max_requests {
            return false;
        }
        self.count += 1;
        true
    }
}

/// MCP server for MeetingBaaS.
pub struct McpServer {
    /// Tool registry.
    tools: ToolRegistry,
    /// Resource handler.
    resources: ResourceHandler,
    /// Per-connection state.
    session: SessionContext,
    /// Request rate limiting.
    limiter: RateLimiter,
}

impl McpServer {
    /// Creates a new MCP server around a session.
    #[must_use]
    pub fn new(session: SessionContext) -> Self {
        Self {
            tools: ToolRegistry::new(),
            resources: ResourceHandler::new(),
            session,
            limiter: RateLimiter::new(RateLimitConfig::from_env()),
        }
    }

    /// Sets the rate limit configuration.
    #[must_use]
    pub fn with_rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.limiter = RateLimiter::new(config);
        self
    }

    /// Returns the session state.
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Runs the server over the process's stdin and stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if reading stdin or writing stdout fails.
    pub async fn run_stdio(&mut self) -> Result<()> {
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting MCP server on stdio");
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serves line-delimited JSON-RPC from `reader`, answering on `writer`.
    ///
    /// Returns when `reader` reaches end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails.
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await.map_err(|e| Error::OperationFailed {
            operation: "read_stdin".to_string(),
            cause: e.to_string(),
        })? {
            if line.trim().is_empty() {
                continue;
            }

            let response = if self.limiter.admit() {
                self.handle_request(&line).await
            } else {
                let max_requests = self.limiter.config.max_requests;
                let window = self.limiter.config.window;
                tracing::warn!("Rate limit exceeded: {max_requests} requests in {window:?}");
                metrics::counter!("mcp_rate_limit_exceeded_total").increment(1);
                Some(format_error(
                    None,
                    -32000,
                    &format!("Rate limit exceeded: max {max_requests} requests per {window:?}"),
                ))
            };

            // Notifications get no response.
            let Some(response) = response else {
                continue;
            };
            writer
                .write_all(format!("{response}\n").as_bytes())
                .await
                .map_err(|e| Error::OperationFailed {
                    operation: "write_stdout".to_string(),
                    cause: e.to_string(),
                })?;
            writer.flush().await.map_err(|e| Error::OperationFailed {
                operation: "flush_stdout".to_string(),
                cause: e.to_string(),
            })?;
        }

        tracing::info!("stdin closed, shutting down MCP server");
        Ok(())
    }

    /// Handles a JSON-RPC request.
    ///
    /// Returns `None` for notifications (requests without an id).
    pub async fn handle_request(&mut self, request: &str) -> Option<String> {
        if request.len() > MAX_REQUEST_BODY_SIZE {
            tracing::warn!(
                request_size = request.len(),
                max_size = MAX_REQUEST_BODY_SIZE,
                "Request exceeds maximum size limit"
            );
            return Some(format_error(
                None,
                -32600,
                &format!(
                    "Request too large: {} bytes (max: {} bytes)",
                    request.len(),
                    MAX_REQUEST_BODY_SIZE
                ),
            ));
        }

        let start = Instant::now();
        let context = RequestContext::new();
        let span = info_span!(
            "mcp.request",
            request_id = context.request_id(),
            rpc.method = tracing::field::Empty,
            rpc.id = tracing::field::Empty,
            status = tracing::field::Empty
        );

        let parsed: std::result::Result<JsonRpcRequest, _> = serde_json::from_str(request);
        let mut method_label = "parse_error".to_string();
        let mut status_label = "error";

        let response = match parsed {
            Ok(req) => {
                method_label.clone_from(&req.method);
                span.record("rpc.method", method_label.as_str());
                if let Some(id) = &req.id {
                    let id_str = id.to_string();
                    span.record("rpc.id", id_str.as_str());
                }

                let is_notification = req.id.is_none();
                let result = scope_request_context(
                    context,
                    self.dispatch_method(&req.method, req.params)
                        .instrument(span.clone()),
                )
                .await;
                status_label = if result.is_ok() { "success" } else { "error" };
                span.record("status", status_label);
                (!is_notification).then(|| format_response(req.id, result))
            },
            Err(e) => {
                span.record("status", "parse_error");
                Some(format_error(None, -32700, &format!("Parse error: {e}")))
            },
        };

        metrics::counter!(
            "mcp_requests_total",
            "method" => method_label.clone(),
            "status" => status_label
        )
        .increment(1);
        metrics::histogram!("mcp_request_duration_ms", "method" => method_label)
            .record(start.elapsed().as_secs_f64() * 1000.0);

        response
    }

    /// Dispatches a method call by its protocol name.
    async fn dispatch_method(&mut self, method: &str, params: Option<Value>) -> DispatchResult {
        tracing::info!(method, "Processing MCP request");
        match method {
            "initialize" => Ok(handle_initialize()),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => Ok(self.handle_list_tools()),
            "tools/call" => self.handle_call_tool(params).await,
            "resources/list" => Ok(self.handle_list_resources()),
            "resources/templates/list" => Ok(self.handle_list_templates()),
            "resources/read" => self.handle_read_resource(params).await,
            name if name.starts_with("notifications/") => Ok(Value::Null),
            name => Err((-32601, format!("Method not found: {name}"))),
        }
    }

    /// Handles tools/list.
    fn handle_list_tools(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .list_tools()
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect();

        serde_json::json!({ "tools": tools })
    }

    /// Handles tools/call.
    async fn handle_call_tool(&mut self, params: Option<Value>) -> DispatchResult {
        let params = params.ok_or((-32602, "Missing params".to_string()))?;

        let tool_name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or((-32602, "Missing tool name".to_string()))?
            .to_string();
        let span = info_span!("mcp.tool.call", tool.name = tool_name.as_str());
        let start = Instant::now();

        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({}));
        let meta = params.get("_meta");

        let outcome = self
            .tools
            .execute(&tool_name, arguments, &mut self.session, meta)
            .instrument(span)
            .await;
        let (result, status_label) = match outcome {
            Ok(result) => {
                let status_label = if result.is_error { "error" } else { "success" };
                (
                    serde_json::json!({
                        "content": result.content,
                        "isError": result.is_error
                    }),
                    status_label,
                )
            },
            Err(e) => {
                tracing::warn!(tool = %tool_name, error = %e, "Tool call failed");
                (
                    serde_json::json!({
                        "content": [{ "type": "text", "text": e.to_string() }],
                        "isError": true
                    }),
                    "error",
                )
            },
        };
        metrics::counter!(
            "mcp_tool_calls_total",
            "tool" => tool_name.clone(),
            "status" => status_label
        )
        .increment(1);
        if status_label == "error" {
            metrics::counter!("mcp_tool_errors_total", "tool" => tool_name.clone()).increment(1);
        }
        metrics::histogram!(
            "mcp_tool_duration_ms",
            "tool" => tool_name,
            "status" => status_label
        )
        .record(start.elapsed().as_secs_f64() * 1000.0);

        Ok(result)
    }

    /// Handles resources/list.
    fn handle_list_resources(&self) -> Value {
        let resources: Vec<Value> = self
            .resources
            .list_resources()
            .iter()
            .map(|r| {
                serde_json::json!({
                    "uri": r.uri,
                    "name": r.name,
                    "description": r.description,
                    "mimeType": r.mime_type
                })
            })
            .collect();

        serde_json::json!({ "resources": resources })
    }

    /// Handles resources/templates/list.
    fn handle_list_templates(&self) -> Value {
        let templates: Vec<Value> = self
            .resources
            .list_templates()
            .iter()
            .map(|t| {
                serde_json::json!({
                    "uriTemplate": t.uri_template,
                    "name": t.name,
                    "description": t.description,
                    "mimeType": t.mime_type
                })
            })
            .collect();

        serde_json::json!({ "resourceTemplates": templates })
    }

    /// Handles resources/read.
    async fn handle_read_resource(&mut self, params: Option<Value>) -> DispatchResult {
        let params = params.ok_or((-32602, "Missing params".to_string()))?;

        let uri = params
            .get("uri")
            .and_then(|v| v.as_str())
            .ok_or((-32602, "Missing resource URI".to_string()))?
            .to_string();
        let span = info_span!(
            "mcp.resource.read",
            resource.uri = uri.as_str(),
            status = tracing::field::Empty
        );
        let start = Instant::now();

        let result = match self.session.gateway(params.get("_meta")) {
            None => Err((-32603, super::session::AUTH_REQUIRED_MESSAGE.to_string())),
            Some(gateway) => self
                .resources
                .get_resource(&uri, gateway.as_ref(), &mut self.session)
                .instrument(span.clone())
                .await
                .map(|content| {
                    serde_json::json!({
                        "contents": [{
                            "uri": content.uri,
                            "mimeType": content.mime_type,
                            "text": content.text
                        }]
                    })
                })
                .map_err(|e| match e {
                    Error::InvalidInput(msg) => (-32602, msg),
                    other => (-32603, other.to_string()),
                }),
        };

        let status_label = if result.is_ok() { "success" } else { "error" };
        span.record("status", status_label);
        metrics::counter!("mcp_resource_reads_total", "status" => status_label).increment(1);
        metrics::histogram!("mcp_resource_read_duration_ms", "status" => status_label)
            .record(start.elapsed().as_secs_f64() * 1000.0);

        result
    }
}

/// Handles the initialize method.
fn handle_initialize() -> Value {
    serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {},
            "resources": {}
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

/// Formats a response from a dispatch result.
fn format_response(id: Option<Value>, result: DispatchResult) -> String {
    match result {
        Ok(value) => {
            let response = JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id,
                result: Some(value),
                error: None,
            };
            serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
        },
        Err((code, message)) => format_error(id, code, &message),
    }
}

/// Formats an error response.
fn format_error(id: Option<Value>, code: i32, message: &str) -> String {
    let response = JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message: message.to_string(),
            data: None,
        }),
    };
    serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
}

/// Result type for method dispatch.
type DispatchResult = std::result::Result<Value, (i32, String)>;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC version (required by protocol but not used in code).
    #[serde(rename = "jsonrpc")]
    _jsonrpc: String,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryGateway;
    use crate::mcp::session::ApiKeyResolver;
    use crate::models::{Meeting, MeetingSummary, TranscriptSegment};
    use std::sync::Arc;

    fn server() -> McpServer {
        let meeting = Meeting::new(
            MeetingSummary {
                id: "bot-1".to_string(),
                title: "Roadmap review".to_string(),
                ..MeetingSummary::default()
            },
            "https://cdn.test/bot-1.mp4",
            vec![
                TranscriptSegment::new("Alice", 0.0, "let us review the roadmap"),
                TranscriptSegment::new("Bob", 20.0, "the roadmap slips a week"),
            ],
        );
        let session = SessionContext::new(
            Arc::new(InMemoryGateway::new(vec![meeting])),
            ApiKeyResolver::new(Some("test-key".to_string()), None),
        );
        McpServer::new(session).with_rate_limit(RateLimitConfig::default())
    }

    async fn call(server: &mut McpServer, request: &str) -> String {
        server.handle_request(request).await.unwrap_or_default()
    }

    #[tokio::test]
    async fn test_handle_initialize() {
        let mut server = server();
        let response = call(
            &mut server,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        )
        .await;

        assert!(response.contains("protocolVersion"));
        assert!(response.contains(PROTOCOL_VERSION));
        assert!(response.contains(SERVER_NAME));
    }

    #[tokio::test]
    async fn test_handle_list_tools() {
        let mut server = server();
        let response = call(&mut server, r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).await;

        assert!(response.contains("findKeyMoments"));
        assert!(response.contains("intelligentSearch"));
        assert!(response.contains("inputSchema"));
    }

    #[tokio::test]
    async fn test_handle_list_templates() {
        let mut server = server();
        let response = call(
            &mut server,
            r#"{"jsonrpc":"2.0","id":1,"method":"resources/templates/list"}"#,
        )
        .await;

        assert!(response.contains("resourceTemplates"));
        assert!(response.contains("meetingbaas://meeting/{botId}/metadata"));
    }

    #[tokio::test]
    async fn test_handle_call_tool() {
        let mut server = server();
        let request = r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"searchTranscript","arguments":{"botId":"bot-1","query":"roadmap"}}}"#;
        let response: Value = serde_json::from_str(&call(&mut server, request).await).unwrap();

        assert_eq!(response["id"], 7);
        assert_eq!(response["result"]["isError"], false);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Found 2 results for \"roadmap\":"));
    }

    #[tokio::test]
    async fn test_tool_error_is_flagged_not_rpc_error() {
        let mut server = server();
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"getMeetingData","arguments":{"botId":"missing"}}}"#;
        let response: Value = serde_json::from_str(&call(&mut server, request).await).unwrap();

        assert!(response.get("error").is_none());
        assert_eq!(response["result"]["isError"], true);
    }

    #[tokio::test]
    async fn test_handle_read_resource() {
        let mut server = server();
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"resources/read","params":{"uri":"meetingbaas://meeting/bot-1/transcript"}}"#;
        let response = call(&mut server, request).await;

        assert!(response.contains("contents"));
        assert!(response.contains("[00:20] Bob: the roadmap slips a week"));
    }

    #[tokio::test]
    async fn test_read_resource_bad_uri() {
        let mut server = server();
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"resources/read","params":{"uri":"meetingbaas://nope"}}"#;
        let response = call(&mut server, request).await;

        assert!(response.contains("-32602"));
    }

    #[tokio::test]
    async fn test_handle_ping() {
        let mut server = server();
        let response = call(&mut server, r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).await;

        assert!(response.contains("result"));
    }

    #[tokio::test]
    async fn test_handle_unknown_method() {
        let mut server = server();
        let response =
            call(&mut server, r#"{"jsonrpc":"2.0","id":1,"method":"prompts/list"}"#).await;

        assert!(response.contains("-32601"));
    }

    #[tokio::test]
    async fn test_handle_parse_error() {
        let mut server = server();
        let response = call(&mut server, "not valid json").await;

        assert!(response.contains("-32700"));
    }

    #[tokio::test]
    async fn test_handle_missing_params() {
        let mut server = server();
        let response = call(&mut server, r#"{"jsonrpc":"2.0","id":1,"method":"tools/call"}"#).await;

        assert!(response.contains("-32602"));
    }

    #[tokio::test]
    async fn test_request_too_large() {
        let mut server = server();
        let request = format!(
            r#"{{"jsonrpc":"2.0","id":1,"method":"ping","params":{{"pad":"{}"}}}}"#,
            "x".repeat(MAX_REQUEST_BODY_SIZE)
        );
        let response = call(&mut server, &request).await;

        assert!(response.contains("-32600"));
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let mut server = server();
        let response = server
            .handle_request(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;

        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_serve_applies_rate_limit() {
        let mut server = server().with_rate_limit(RateLimitConfig::default().with_max_requests(2));
        let input = [
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
            r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#,
        ]
        .join("\n");
        let mut output = Vec::new();
        server
            .serve(BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();

        let lines: Vec<&str> = std::str::from_utf8(&output).unwrap().lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains(r#""id":1"#));
        assert!(lines[2].contains("-32000"));
    }
}
