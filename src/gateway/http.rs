//! MeetingBaaS REST client.

use super::wire::{
    BotListResponse, CalendarEventsResponse, DeleteDataResponse, JoinBotBody, JoinBotResponse,
    MeetingDataResponse, RetranscribeBody, ScheduleBotBody, WireCalendar,
};
use super::{GatewayConnector, MeetingGateway};
use crate::config::MeetingBaasConfig;
use crate::models::{
    BotRequest, Calendar, CalendarEvent, DateWindow, Meeting, MeetingSummary, RecordingSettings,
    RetranscribeRequest, RetranscribeStatus,
};
use crate::observability::current_request_id;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "x-meeting-baas-api-key";

/// Header correlating API calls with the MCP request that caused them.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Message used when the API rejects the key.
const AUTH_FAILED: &str = "Authentication failed: Invalid API key or insufficient permissions";

/// HTTP implementation of [`MeetingGateway`].
pub struct HttpGateway {
    /// API key sent in [`API_KEY_HEADER`].
    api_key: SecretString,
    /// Base URL without trailing slash.
    base_url: String,
    /// HTTP client.
    client: reqwest::Client,
}

impl HttpGateway {
    /// Default API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.meetingbaas.com";

    /// Creates a client for the production API.
    #[must_use]
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            client: build_http_client(Duration::from_secs(30)),
        }
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Reuses an existing HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Builds the URL for a path given as unescaped segments.
    fn endpoint(&self, operation: &'static str, segments: &[&str]) -> Result<Url> {
        let invalid = |cause: String| Error::OperationFailed {
            operation: operation.to_string(),
            cause,
        };
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| invalid(format!("invalid base URL '{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| invalid(format!("base URL '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends one request and returns the status and body of a 2xx answer.
    async fn send(
        &self,
        operation: &'static str,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<(StatusCode, String)> {
        let start = Instant::now();
        let url = self.endpoint(operation, segments)?;
        let path = url.path().to_string();
        let request_id = current_request_id();
        tracing::debug!(
            operation,
            method = %method,
            path = %path,
            request_id = ?request_id,
            "Calling MeetingBaaS API"
        );

        let mut request = self
            .client
            .request(method, url)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .query(query);
        if let Some(body) = body {
            request = request.json(&body);
        }
        if let Some(request_id) = request_id {
            request = request.header(REQUEST_ID_HEADER, request_id);
        }

        let response = request
            .send()
            .await
            .map_err(|e| {
                let error_kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connect"
                } else if e.is_request() {
                    "request"
                } else {
                    "unknown"
                };
                tracing::warn!(operation, error = %e, error_kind, "MeetingBaaS request failed");
                record_request(operation, "transport_error", start);
                Error::GatewayUnavailable {
                    operation: operation.to_string(),
                    cause: format!("{error_kind} error: {e}"),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                operation,
                status = %status,
                body = %body,
                "MeetingBaaS API returned error status"
            );
            record_request(operation, status.as_str(), start);
            return Err(status_error(operation, status, &path));
        }

        let body = response.text().await.map_err(|e| Error::GatewayUnavailable {
            operation: operation.to_string(),
            cause: e.to_string(),
        })?;
        record_request(operation, "success", start);
        Ok((status, body))
    }

    /// Issues a GET and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let (_, body) = self.send(operation, Method::GET, segments, query, None).await?;
        decode(operation, &body)
    }

    /// Issues a POST with an optional JSON body.
    async fn post<B: Serialize>(
        &self,
        operation: &'static str,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<(StatusCode, String)> {
        let body = body.map(|b| encode(operation, b)).transpose()?;
        self.send(operation, Method::POST, segments, &[], body).await
    }
}

#[async_trait]
impl MeetingGateway for HttpGateway {
    async fn fetch_meeting(&self, meeting_id: &str) -> Result<Meeting> {
        let response: MeetingDataResponse = self
            .get_json(
                "fetch_meeting",
                &["bots", "meeting_data"],
                &[("bot_id", meeting_id.to_string())],
            )
            .await?;
        response.into_meeting(meeting_id)
    }

    async fn list_meetings(&self) -> Result<Vec<MeetingSummary>> {
        let response: BotListResponse = self.get_json("list_meetings", &["bots", ""], &[]).await?;
        Ok(response.into_summaries())
    }

    async fn list_calendar_events(
        &self,
        calendar_id: &str,
        range: Option<&DateWindow>,
    ) -> Result<Vec<CalendarEvent>> {
        let mut query = vec![("calendar_id", calendar_id.to_string())];
        if let Some(range) = range {
            query.push(("start_date_gte", range.start.to_rfc3339()));
            query.push(("start_date_lte", range.end.to_rfc3339()));
        }
        let response: CalendarEventsResponse = self
            .get_json("list_calendar_events", &["calendar_events", ""], &query)
            .await?;
        response.into_events()
    }

    async fn list_calendars(&self) -> Result<Vec<Calendar>> {
        let calendars: Vec<WireCalendar> =
            self.get_json("list_calendars", &["calendars", ""], &[]).await?;
        Ok(calendars.into_iter().map(Calendar::from).collect())
    }

    async fn join_meeting(&self, request: &BotRequest) -> Result<String> {
        let operation = "join_meeting";
        let (_, body) = self
            .post(operation, &["bots", ""], Some(&JoinBotBody::from(request)))
            .await?;
        let response: JoinBotResponse = decode(operation, &body)?;
        Ok(response.bot_id)
    }

    async fn leave_meeting(&self, bot_id: &str) -> Result<()> {
        self.send("leave_meeting", Method::DELETE, &["bots", bot_id], &[], None).await?;
        Ok(())
    }

    async fn schedule_recording(
        &self,
        event_id: &str,
        settings: &RecordingSettings,
    ) -> Result<()> {
        self.post(
            "schedule_recording",
            &["calendar_events", event_id, "bot"],
            Some(&ScheduleBotBody::from(settings)),
        )
        .await?;
        Ok(())
    }

    async fn delete_data(&self, bot_id: &str) -> Result<String> {
        let operation = "delete_data";
        let (_, body) = self
            .post::<Value>(operation, &["bots", bot_id, "delete_data"], None)
            .await?;
        // An empty body still means the deletion went through.
        let response: DeleteDataResponse = if body.trim().is_empty() {
            DeleteDataResponse::default()
        } else {
            decode(operation, &body)?
        };
        Ok(response.status.unwrap_or_else(|| "deleted".to_string()))
    }

    async fn retranscribe(&self, request: &RetranscribeRequest) -> Result<RetranscribeStatus> {
        let (status, _) = self
            .post(
                "retranscribe",
                &["bots", "retranscribe"],
                Some(&RetranscribeBody::from(request)),
            )
            .await?;
        Ok(if status == StatusCode::ACCEPTED {
            RetranscribeStatus::Processing
        } else {
            RetranscribeStatus::Queued
        })
    }
}

/// Builds [`HttpGateway`]s sharing one connection pool.
#[derive(Clone)]
pub struct HttpConnector {
    base_url: String,
    client: reqwest::Client,
}

impl HttpConnector {
    /// Creates a connector from the application config.
    #[must_use]
    pub fn from_config(config: &MeetingBaasConfig) -> Self {
        Self {
            base_url: config.base_url(),
            client: build_http_client(config.api.timeout),
        }
    }

    /// Returns the base URL new gateways will use.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl GatewayConnector for HttpConnector {
    fn connect(&self, api_key: &SecretString) -> Arc<dyn MeetingGateway> {
        Arc::new(
            HttpGateway::new(api_key.clone())
                .with_base_url(self.base_url.clone())
                .with_client(self.client.clone()),
        )
    }
}

/// Builds the HTTP client with a request timeout.
fn build_http_client(timeout: Duration) -> reqwest::Client {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("meetingbaas-mcp/", env!("CARGO_PKG_VERSION")));
    if !timeout.is_zero() {
        builder = builder.timeout(timeout);
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build MeetingBaaS HTTP client: {err}");
        reqwest::Client::new()
    })
}

/// Decodes a JSON body, reporting shape mismatches as malformed responses.
fn decode<T: DeserializeOwned>(operation: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        tracing::warn!(operation, error = %e, "Unexpected MeetingBaaS response shape");
        Error::MalformedResponse {
            operation: operation.to_string(),
            cause: e.to_string(),
        }
    })
}

fn encode<B: Serialize>(operation: &'static str, body: &B) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| Error::OperationFailed {
        operation: operation.to_string(),
        cause: format!("request body: {e}"),
    })
}

/// Maps a non-success status onto the error taxonomy.
fn status_error(operation: &str, status: StatusCode, path: &str) -> Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::Unauthorized(AUTH_FAILED.to_string())
        },
        StatusCode::NOT_FOUND => Error::NotFound(format!("{operation}: {path}")),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited(operation.to_string()),
        _ => Error::GatewayUnavailable {
            operation: operation.to_string(),
            cause: format!("API returned status: {status}"),
        },
    }
}

fn record_request(operation: &'static str, status: &str, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_ms", "operation" => operation)
        .record(start.elapsed().as_secs_f64() * 1000.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error("fetch_meeting", StatusCode::FORBIDDEN, "/bots/meeting_data"),
            Error::Unauthorized(_)
        ));
        assert!(matches!(
            status_error("fetch_meeting", StatusCode::NOT_FOUND, "/bots/meeting_data"),
            Error::NotFound(_)
        ));
        assert!(matches!(
            status_error("list_meetings", StatusCode::BAD_GATEWAY, "/bots/"),
            Error::GatewayUnavailable { .. }
        ));
        assert!(matches!(
            status_error("delete_data", StatusCode::TOO_MANY_REQUESTS, "/bots/b1/delete_data"),
            Error::RateLimited(_)
        ));
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let gateway = HttpGateway::new(SecretString::from("k".to_string()))
            .with_base_url("http://localhost:9000/v1/");
        let url = gateway.endpoint("leave_meeting", &["bots", "a/b?c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/v1/bots/a%2Fb%3Fc");

        let listing = gateway.endpoint("list_meetings", &["bots", ""]).unwrap();
        assert_eq!(listing.path(), "/v1/bots/");
    }

    #[test]
    fn test_connector_uses_config_base_url() {
        let config = MeetingBaasConfig::new().with_base_url("http://localhost:9000/");
        let connector = HttpConnector::from_config(&config);
        assert_eq!(connector.base_url(), "http://localhost:9000");
    }
}
