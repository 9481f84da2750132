//! TOML configuration file structure.
//!
//! Every field is optional; absent fields keep the built-in default.
//!
//! ```toml
//! api_key = "mb-..."
//! environment = "prod"
//!
//! [api]
//! timeout_secs = 20
//!
//! [search]
//! proximity_window_secs = 30.0
//! fallback_meeting_limit = 5
//!
//! [logging]
//! format = "json"
//! file = "/tmp/meetingbaas-mcp.log"
//! ```

use serde::Deserialize;

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// MeetingBaaS API key.
    pub api_key: Option<String>,
    /// Environment name: prod, preprod, gmeetbot.
    pub environment: Option<String>,
    /// API client section.
    pub api: Option<ConfigFileApi>,
    /// Search tuning section.
    pub search: Option<ConfigFileSearch>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
    /// Metrics section.
    pub metrics: Option<ConfigFileMetrics>,
}

/// `[api]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileApi {
    /// Base URL overriding the environment.
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Base URL for shareable recording links.
    pub viewer_base_url: Option<String>,
}

/// `[search]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileSearch {
    /// Minimum distance between key moments, in seconds.
    pub proximity_window_secs: Option<f64>,
    /// Meetings tried by the general fallback.
    pub fallback_meeting_limit: Option<usize>,
    /// Calendar events tried by the calendar strategy.
    pub calendar_event_limit: Option<usize>,
    /// Capacity of the per-session recent meeting cache.
    pub recent_cache_capacity: Option<usize>,
    /// Segments of context on each side of a match.
    pub context_segments: Option<usize>,
    /// Default result cap for intelligent search.
    pub default_max_results: Option<usize>,
    /// Default meeting cap for type searches.
    pub type_search_limit: Option<usize>,
}

/// `[logging]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// Filter directive, e.g. `info` or `meetingbaas_mcp=debug`.
    pub level: Option<String>,
    /// `json` or `pretty`.
    pub format: Option<String>,
    /// Log file path; stderr when absent.
    pub file: Option<String>,
}

/// `[metrics]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileMetrics {
    /// Whether to install the Prometheus exporter.
    pub enabled: Option<bool>,
    /// Listener port.
    pub port: Option<u16>,
}
