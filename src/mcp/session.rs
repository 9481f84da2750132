//! Per-connection session state and API key resolution.
//!
//! One stdio connection is one session. The session owns the recent-meeting
//! cache, so there is no cross-session sharing and no lock around it.

use crate::config::{API_KEY_ENV, MeetingBaasConfig, SearchSettings};
use crate::gateway::{GatewayConnector, MeetingGateway};
use crate::services::{RecentMeetingCache, SearchDispatcher};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::sync::Arc;

/// Text returned when no API key can be resolved for a call.
pub const AUTH_REQUIRED_MESSAGE: &str = "Authentication failed. Please configure your API key in Claude Desktop settings or provide it directly.";

/// Header names carrying the key, checked in order.
const KEY_HEADERS: [&str; 2] = ["x-api-key", "x-meeting-baas-api-key"];

/// Resolves the API key for a call.
///
/// Precedence: request headers, then `MEETING_BAAS_API_KEY`, then the config
/// file. Blank values are ignored at every level.
#[derive(Clone, Default)]
pub struct ApiKeyResolver {
    env_key: Option<SecretString>,
    config_key: Option<SecretString>,
}

impl std::fmt::Debug for ApiKeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyResolver")
            .field("env_key", &self.env_key.is_some())
            .field("config_key", &self.config_key.is_some())
            .finish()
    }
}

impl ApiKeyResolver {
    /// Creates a resolver from explicit fallback keys.
    #[must_use]
    pub fn new(env_key: Option<String>, config_key: Option<SecretString>) -> Self {
        Self {
            env_key: non_blank(env_key).map(SecretString::from),
            config_key,
        }
    }

    /// Creates a resolver reading the process environment and the config.
    #[must_use]
    pub fn from_config(config: &MeetingBaasConfig) -> Self {
        Self::new(std::env::var(API_KEY_ENV).ok(), config.api_key.clone())
    }

    /// Returns the key for a request, given its `_meta` object.
    #[must_use]
    pub fn resolve(&self, meta: Option<&Value>) -> Option<SecretString> {
        meta.and_then(key_from_headers)
            .or_else(|| self.env_key.clone())
            .or_else(|| self.config_key.clone())
    }
}

/// Extracts an API key from request headers.
///
/// Accepts the headers directly in `meta` or nested under `meta.headers`.
/// Header names match case-insensitively.
#[must_use]
pub fn key_from_headers(meta: &Value) -> Option<SecretString> {
    let sources = [Some(meta), meta.get("headers")];
    sources
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .find_map(|headers| {
            let header = |name: &str| {
                headers
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .and_then(|(_, v)| v.as_str())
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
            };
            KEY_HEADERS
                .iter()
                .find_map(|name| header(name))
                .or_else(|| {
                    header("authorization")
                        .and_then(|v| {
                            v.strip_prefix("Bearer ")
                                .or_else(|| v.strip_prefix("bearer "))
                        })
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                })
                .map(|v| SecretString::from(v.to_string()))
        })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// State shared by all calls of one MCP connection.
///
/// The recent-meeting cache belongs to the API key that filled it. When a
/// call resolves a different key, the cache is cleared first.
pub struct SessionContext {
    resolver: ApiKeyResolver,
    connector: Arc<dyn GatewayConnector>,
    active_key: Option<SecretString>,
    recent: RecentMeetingCache,
    settings: SearchSettings,
    viewer_base_url: String,
    now: Option<DateTime<Utc>>,
}

impl SessionContext {
    /// Creates a session with default search settings.
    #[must_use]
    pub fn new(connector: Arc<dyn GatewayConnector>, resolver: ApiKeyResolver) -> Self {
        let settings = SearchSettings::default();
        Self {
            resolver,
            connector,
            active_key: None,
            recent: RecentMeetingCache::new(settings.recent_cache_capacity),
            settings,
            viewer_base_url: crate::config::ApiSettings::default().viewer_base_url,
            now: None,
        }
    }

    /// Creates a session from the application config.
    #[must_use]
    pub fn from_config(config: &MeetingBaasConfig, connector: Arc<dyn GatewayConnector>) -> Self {
        Self::new(connector, ApiKeyResolver::from_config(config))
            .with_settings(config.search.clone())
            .with_viewer_base_url(config.api.viewer_base_url.clone())
    }

    /// Replaces the search settings and resizes the recent cache to match.
    #[must_use]
    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.recent = RecentMeetingCache::new(settings.recent_cache_capacity);
        self.settings = settings;
        self
    }

    /// Sets the base URL of shareable viewer links.
    #[must_use]
    pub fn with_viewer_base_url(mut self, url: impl Into<String>) -> Self {
        self.viewer_base_url = url.into();
        self
    }

    /// Pins the session clock.
    #[must_use]
    pub const fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Returns a gateway for the request, or `None` when no key resolves.
    pub fn gateway(&mut self, meta: Option<&Value>) -> Option<Arc<dyn MeetingGateway>> {
        let key = self.resolver.resolve(meta)?;
        let switched = self
            .active_key
            .as_ref()
            .is_some_and(|active| active.expose_secret() != key.expose_secret());
        if switched && !self.recent.is_empty() {
            tracing::debug!(
                cleared = self.recent.len(),
                "API key changed, clearing recent meetings"
            );
            self.recent.clear();
        }
        let gateway = self.connector.connect(&key);
        self.active_key = Some(key);
        Some(gateway)
    }

    /// Creates a dispatcher bound to this session's cache and settings.
    pub fn dispatcher<'a>(&'a mut self, gateway: &'a dyn MeetingGateway) -> SearchDispatcher<'a> {
        let dispatcher = SearchDispatcher::new(gateway, &mut self.recent, &self.settings);
        match self.now {
            Some(now) => dispatcher.with_now(now),
            None => dispatcher,
        }
    }

    /// Returns the recent-meeting cache.
    #[must_use]
    pub const fn recent(&self) -> &RecentMeetingCache {
        &self.recent
    }

    /// Returns the search settings.
    #[must_use]
    pub const fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Returns the viewer base URL.
    #[must_use]
    pub fn viewer_base_url(&self) -> &str {
        &self.viewer_base_url
    }

    /// Returns the session clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}
