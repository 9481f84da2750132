//! HTTP gateway integration tests.
//!
//! Runs `HttpGateway` against a wiremock server to verify:
//! - Request paths, query parameters and the API key header
//! - Wire payload conversion into meetings and calendar events
//! - Status code mapping onto the error taxonomy
//! - Bot lifecycle writes (methods, paths and JSON bodies)
//! - End-to-end tool calls through the HTTP connector

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use meetingbaas_mcp::gateway::{API_KEY_HEADER, HttpGateway};
use meetingbaas_mcp::{Error, MeetingGateway};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer) -> HttpGateway {
    HttpGateway::new(SecretString::from("test-key".to_string())).with_base_url(server.uri())
}

fn meeting_body() -> serde_json::Value {
    json!({
        "bot_data": {
            "bot": {
                "bot_name": "Quarterly Planning",
                "meeting_url": "https://meet.example.com/abc",
                "created_at": "2026-10-01T09:00:00Z",
                "creator_email": "lead@example.com",
                "extra": { "meetingType": "Planning", "participants": ["Alice", "Bob"] }
            },
            "transcripts": [
                { "speaker": "Alice", "start_time": 0.0, "end_time": 4.5,
                  "words": [{ "text": "budget" }, { "text": "review" }] },
                { "speaker": "  ", "start_time": 5.0,
                  "words": [{ "text": "agreed" }] }
            ]
        },
        "mp4": "https://cdn.example.com/rec.mp4",
        "duration": 120.0
    })
}

// ============================================================================
// Meeting Data
// ============================================================================

mod meeting_data {
    use super::*;

    #[tokio::test]
    async fn test_fetch_meeting_sends_key_and_converts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bots/meeting_data"))
            .and(query_param("bot_id", "bot-42"))
            .and(header(API_KEY_HEADER, "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(meeting_body()))
            .expect(1)
            .mount(&server)
            .await;

        let meeting = gateway(&server).fetch_meeting("bot-42").await.unwrap();

        assert_eq!(meeting.id(), "bot-42");
        assert_eq!(meeting.title(), "Quarterly Planning");
        assert_eq!(meeting.summary.meeting_type.as_deref(), Some("planning"));
        assert_eq!(meeting.summary.participants, vec!["Alice", "Bob"]);
        assert_eq!(meeting.recording_url, "https://cdn.example.com/rec.mp4");
        assert!((meeting.duration() - 120.0).abs() < f64::EPSILON);
        assert_eq!(meeting.segments.len(), 2);
        assert_eq!(meeting.segments[0].text(), "budget review");
        assert_eq!(meeting.segments[1].speaker, "Unknown Speaker");
    }

    #[tokio::test]
    async fn test_request_id_is_forwarded() {
        use meetingbaas_mcp::gateway::REQUEST_ID_HEADER;
        use meetingbaas_mcp::observability::{RequestContext, scope_request_context};

        let server = MockServer::start().await;
        Mock::given(path("/bots/meeting_data"))
            .and(header(REQUEST_ID_HEADER, "req-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(meeting_body()))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway(&server);
        let meeting = scope_request_context(
            RequestContext::from_id("req-123"),
            gateway.fetch_meeting("bot-42"),
        )
        .await
        .unwrap();
        assert_eq!(meeting.id(), "bot-42");
    }

    #[tokio::test]
    async fn test_negative_start_time_is_malformed() {
        let server = MockServer::start().await;
        let mut body = meeting_body();
        body["bot_data"]["transcripts"][0]["start_time"] = json!(-3.0);
        Mock::given(path("/bots/meeting_data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let err = gateway(&server).fetch_meeting("bot-42").await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_missing_bot_data_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(path("/bots/meeting_data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mp4": "x" })))
            .mount(&server)
            .await;

        let err = gateway(&server).fetch_meeting("bot-42").await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }
}

// ============================================================================
// Status Mapping
// ============================================================================

mod status_mapping {
    use super::*;

    async fn fetch_with_status(status: u16) -> Error {
        let server = MockServer::start().await;
        Mock::given(path("/bots/meeting_data"))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&server)
            .await;
        gateway(&server).fetch_meeting("bot-42").await.unwrap_err()
    }

    #[tokio::test]
    async fn test_unauthorized_statuses_are_fatal() {
        for status in [401, 403] {
            let err = fetch_with_status(status).await;
            assert!(matches!(err, Error::Unauthorized(_)), "status {status}");
            assert!(err.is_fatal());
        }
    }

    #[tokio::test]
    async fn test_not_found_is_skippable() {
        let err = fetch_with_status(404).await;
        assert!(matches!(err, Error::NotFound(_)));
        assert!(err.is_skippable());
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let err = fetch_with_status(503).await;
        assert!(matches!(err, Error::GatewayUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let gateway = HttpGateway::new(SecretString::from("k".to_string()))
            .with_base_url("http://127.0.0.1:9");
        let err = gateway.list_meetings().await.unwrap_err();
        assert!(matches!(err, Error::GatewayUnavailable { .. }));
    }
}

// ============================================================================
// Listings
// ============================================================================

mod listings {
    use super::*;

    #[tokio::test]
    async fn test_list_meetings_accepts_bare_and_wrapped() {
        let bots = json!([
            { "uuid": "b1", "bot_name": "Standup", "extra": { "meeting_type": "standup" } },
            { "bot_id": "b2" }
        ]);
        for body in [bots.clone(), json!({ "bots": bots })] {
            let server = MockServer::start().await;
            Mock::given(path("/bots/"))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(&server)
                .await;

            let summaries = gateway(&server).list_meetings().await.unwrap();
            assert_eq!(summaries.len(), 2);
            assert_eq!(summaries[0].meeting_type.as_deref(), Some("standup"));
            assert_eq!(summaries[1].title, "b2");
        }
    }

    #[tokio::test]
    async fn test_calendar_events_skip_deleted() {
        let server = MockServer::start().await;
        Mock::given(path("/calendar_events/"))
            .and(query_param("calendar_id", "cal-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "uuid": "e1", "name": "Design review", "start_time": "2026-10-20T15:00:00Z",
                      "bot_param": { "bot_id": "b9", "extra": { "meetingType": "design" } } },
                    { "uuid": "e2", "name": "Cancelled", "start_time": "2026-10-21T15:00:00Z",
                      "deleted": true }
                ]
            })))
            .mount(&server)
            .await;

        let events = gateway(&server)
            .list_calendar_events("cal-1", None)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].meeting_id.as_deref(), Some("b9"));
        assert_eq!(events[0].meeting_type.as_deref(), Some("design"));
    }
}

// ============================================================================
// Bot Lifecycle
// ============================================================================

mod bot_lifecycle {
    use super::*;
    use meetingbaas_mcp::models::{
        BotRequest, RecordingMode, RecordingSettings, RetranscribeRequest, RetranscribeStatus,
        TranscriptionProvider,
    };

    #[tokio::test]
    async fn test_join_meeting_posts_bot() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bots/"))
            .and(header(API_KEY_HEADER, "test-key"))
            .and(body_json(json!({
                "meeting_url": "https://meet.google.com/abc",
                "bot_name": "Scribe",
                "reserved": true,
                "recording_mode": "audio_only",
                "start_time": 1_792_000_000,
                "extra": {}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "bot_id": "bot-new" })))
            .expect(1)
            .mount(&server)
            .await;

        let request = BotRequest {
            meeting_url: "https://meet.google.com/abc".to_string(),
            bot_name: "Scribe".to_string(),
            reserved: true,
            recording_mode: RecordingMode::AudioOnly,
            start_time: Some(1_792_000_000),
        };
        let bot_id = gateway(&server).join_meeting(&request).await.unwrap();
        assert_eq!(bot_id, "bot-new");
    }

    #[tokio::test]
    async fn test_leave_meeting_deletes_bot() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/bots/bot-7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        gateway(&server).leave_meeting("bot-7").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_calendars() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "uuid": "cal-1", "name": "Work", "email": "ana@example.com" }
            ])))
            .mount(&server)
            .await;

        let calendars = gateway(&server).list_calendars().await.unwrap();
        assert_eq!(calendars.len(), 1);
        assert_eq!(calendars[0].id, "cal-1");
        assert_eq!(calendars[0].email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_schedule_recording_posts_to_event() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendar_events/evt-9/bot"))
            .and(body_json(json!({
                "bot_name": "Scribe",
                "recording_mode": "speaker_view",
                "extra": {}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let settings = RecordingSettings {
            bot_name: "Scribe".to_string(),
            recording_mode: RecordingMode::default(),
        };
        gateway(&server).schedule_recording("evt-9", &settings).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_data_reads_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bots/bot-7/delete_data"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": true, "status": "partially deleted" })),
            )
            .mount(&server)
            .await;

        let status = gateway(&server).delete_data("bot-7").await.unwrap();
        assert_eq!(status, "partially deleted");
    }

    #[tokio::test]
    async fn test_delete_data_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(path("/bots/bot-7/delete_data"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = gateway(&server).delete_data("bot-7").await.unwrap_err();
        assert!(matches!(err, Error::RateLimited(_)));
    }

    #[tokio::test]
    async fn test_retranscribe_distinguishes_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bots/retranscribe"))
            .and(body_json(json!({
                "bot_uuid": "bot-7",
                "speech_to_text": { "provider": "Gladia" }
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let request = RetranscribeRequest {
            bot_id: "bot-7".to_string(),
            provider: Some(TranscriptionProvider::Gladia),
            provider_api_key: None,
            webhook_url: None,
        };
        let status = gateway(&server).retranscribe(&request).await.unwrap();
        assert_eq!(status, RetranscribeStatus::Processing);
    }
}

// ============================================================================
// Tool Calls Over HTTP
// ============================================================================

mod tool_calls {
    use super::*;
    use meetingbaas_mcp::mcp::{ApiKeyResolver, SessionContext, ToolRegistry};
    use meetingbaas_mcp::{HttpConnector, MeetingBaasConfig};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_header_key_reaches_api() {
        let server = MockServer::start().await;
        Mock::given(path("/bots/meeting_data"))
            .and(header(API_KEY_HEADER, "from-header"))
            .respond_with(ResponseTemplate::new(200).set_body_json(meeting_body()))
            .expect(1)
            .mount(&server)
            .await;

        let config = MeetingBaasConfig::new().with_base_url(server.uri());
        let mut session = SessionContext::new(
            Arc::new(HttpConnector::from_config(&config)),
            ApiKeyResolver::default(),
        );
        let meta = json!({ "headers": { "X-Api-Key": "from-header" } });

        let result = ToolRegistry::new()
            .execute("getMeetingData", json!({ "botId": "bot-42" }), &mut session, Some(&meta))
            .await
            .unwrap();

        assert!(!result.is_error);
        assert!(result.joined_text().contains("Duration: 2m"));
    }

    #[tokio::test]
    async fn test_delete_rate_limit_is_explained() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bots/bot-42/delete_data"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let config = MeetingBaasConfig::new()
            .with_base_url(server.uri())
            .with_api_key("k");
        let mut session = SessionContext::new(
            Arc::new(HttpConnector::from_config(&config)),
            ApiKeyResolver::new(None, config.api_key.clone()),
        );

        let result = ToolRegistry::new()
            .execute("deleteData", json!({ "botId": "bot-42" }), &mut session, None)
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result.joined_text().starts_with("Rate limit exceeded:"));
    }

    #[tokio::test]
    async fn test_rejected_key_surfaces_as_error() {
        let server = MockServer::start().await;
        Mock::given(path("/bots/meeting_data"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let config = MeetingBaasConfig::new()
            .with_base_url(server.uri())
            .with_api_key("stale");
        let mut session = SessionContext::new(
            Arc::new(HttpConnector::from_config(&config)),
            ApiKeyResolver::new(None, config.api_key.clone()),
        );

        let err = ToolRegistry::new()
            .execute("getMeetingData", json!({ "botId": "bot-42" }), &mut session, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }
}
