//! Configuration management.
//!
//! Layers, lowest to highest precedence: built-in defaults, the TOML config
//! file, environment variables (a `.env` file is honored by the binary).

mod file;

pub use file::{ConfigFile, ConfigFileApi, ConfigFileLogging, ConfigFileMetrics, ConfigFileSearch};

use crate::services::MAX_RECENT_MEETINGS;
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "MEETING_BAAS_API_KEY";

/// Environment variable selecting the API environment.
pub const ENVIRONMENT_ENV: &str = "MEETING_BAAS_ENV";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "MEETING_BAAS_CONFIG_PATH";

/// Directory name under the platform config dir.
const CONFIG_DIR_NAME: &str = "meetingbaas-mcp";

/// MeetingBaaS deployment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Production API.
    #[default]
    Prod,
    /// Pre-production API.
    PreProd,
    /// Google Meet bot API.
    GmeetBot,
}

impl Environment {
    /// Parses an environment name, defaulting to production.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "preprod" | "pre-prod" => Self::PreProd,
            "gmeetbot" => Self::GmeetBot,
            _ => Self::Prod,
        }
    }

    /// Returns the environment name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Prod => "prod",
            Self::PreProd => "preprod",
            Self::GmeetBot => "gmeetbot",
        }
    }

    /// Returns the API base URL for this environment.
    #[must_use]
    pub const fn base_url(&self) -> &'static str {
        match self {
            Self::Prod => "https://api.meetingbaas.com",
            Self::PreProd => "https://api.pre-prod-meetingbaas.com",
            Self::GmeetBot => "https://api.gmeetbot.com",
        }
    }
}

/// API client settings.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Explicit base URL, overriding the environment.
    pub base_url: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Base URL for shareable recording links.
    pub viewer_base_url: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            viewer_base_url: "https://meetingbaas.com/viewer".to_string(),
        }
    }
}

/// Tuning for moment selection and search dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Minimum distance between key moments, in seconds.
    pub proximity_window_secs: f64,
    /// Meetings tried by the general fallback.
    pub fallback_meeting_limit: usize,
    /// Calendar events tried by the calendar strategy.
    pub calendar_event_limit: usize,
    /// Capacity of the per-session recent meeting cache, at most 5.
    pub recent_cache_capacity: usize,
    /// Segments of context on each side of a match.
    pub context_segments: usize,
    /// Default result cap for intelligent search.
    pub default_max_results: usize,
    /// Default meeting cap for type searches.
    pub type_search_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            proximity_window_secs: 30.0,
            fallback_meeting_limit: 5,
            calendar_event_limit: 10,
            recent_cache_capacity: 5,
            context_segments: 2,
            default_max_results: 20,
            type_search_limit: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Structured JSON lines.
    Json,
    /// Human-readable output (default).
    #[default]
    Pretty,
}

impl LogFormat {
    /// Parses a format name, defaulting to pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default)]
pub struct LoggingSettings {
    /// Filter directive.
    pub level: Option<String>,
    /// Output format.
    pub format: LogFormat,
    /// Optional log file; stderr otherwise.
    pub file: Option<PathBuf>,
}

/// Metrics settings.
#[derive(Debug, Clone)]
pub struct MetricsSettings {
    /// Whether to install the Prometheus exporter.
    pub enabled: bool,
    /// Listener port.
    pub port: u16,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9090,
        }
    }
}

/// Main configuration for meetingbaas-mcp.
#[derive(Debug, Clone, Default)]
pub struct MeetingBaasConfig {
    /// API key from the config file or environment.
    pub api_key: Option<SecretString>,
    /// API environment.
    pub environment: Environment,
    /// API client settings.
    pub api: ApiSettings,
    /// Search tuning.
    pub search: SearchSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// Metrics settings.
    pub metrics: MetricsSettings,
}

impl MeetingBaasConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        let file: ConfigFile =
            toml::from_str(&contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the platform config dir, then `~/.config/meetingbaas-mcp/`.
    /// Returns defaults when neither file exists or parses.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join(CONFIG_DIR_NAME).join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join(CONFIG_DIR_NAME)
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Ignoring unreadable config file"
                    );
                },
            }
        }

        Self::default()
    }

    /// Loads configuration using the CLI path, then `MEETING_BAAS_CONFIG_PATH`,
    /// then the default location, and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let config = if let Some(path) = path {
            Self::load_from_file(path)?
        } else if let Some(env_path) = std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
        {
            Self::load_from_file(Path::new(&env_path))?
        } else {
            Self::load_default()
        };

        Ok(config.with_env_overrides())
    }

    /// Converts a `ConfigFile` to `MeetingBaasConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        config.api_key = non_blank(file.api_key).map(SecretString::from);
        if let Some(environment) = file.environment {
            config.environment = Environment::parse(&environment);
        }

        if let Some(api) = file.api {
            config.api.base_url = non_blank(api.base_url);
            if let Some(secs) = api.timeout_secs {
                config.api.timeout = Duration::from_secs(secs);
            }
            if let Some(viewer) = non_blank(api.viewer_base_url) {
                config.api.viewer_base_url = viewer;
            }
        }

        if let Some(search) = file.search {
            let s = &mut config.search;
            if let Some(v) = search.proximity_window_secs.filter(|v| *v >= 0.0) {
                s.proximity_window_secs = v;
            }
            if let Some(v) = search.fallback_meeting_limit {
                s.fallback_meeting_limit = v;
            }
            if let Some(v) = search.calendar_event_limit {
                s.calendar_event_limit = v;
            }
            if let Some(v) = search.recent_cache_capacity.filter(|v| *v > 0) {
                if v > MAX_RECENT_MEETINGS {
                    tracing::warn!(
                        requested = v,
                        max = MAX_RECENT_MEETINGS,
                        "Clamping recent_cache_capacity"
                    );
                }
                s.recent_cache_capacity = v.min(MAX_RECENT_MEETINGS);
            }
            if let Some(v) = search.context_segments {
                s.context_segments = v;
            }
            if let Some(v) = search.default_max_results.filter(|v| *v > 0) {
                s.default_max_results = v;
            }
            if let Some(v) = search.type_search_limit.filter(|v| *v > 0) {
                s.type_search_limit = v;
            }
        }

        if let Some(logging) = file.logging {
            config.logging.level = non_blank(logging.level);
            if let Some(format) = logging.format {
                config.logging.format = LogFormat::parse(&format);
            }
            config.logging.file = non_blank(logging.file).map(PathBuf::from);
        }

        if let Some(metrics) = file.metrics {
            if let Some(enabled) = metrics.enabled {
                config.metrics.enabled = enabled;
            }
            if let Some(port) = metrics.port {
                config.metrics.port = port;
            }
        }

        config
    }

    /// Applies `MEETING_BAAS_*` environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_blank(lookup(key));

        if let Some(key) = get(API_KEY_ENV) {
            self.api_key = Some(SecretString::from(key));
        }
        if let Some(env) = get(ENVIRONMENT_ENV) {
            self.environment = Environment::parse(&env);
        }
        if let Some(url) = get("MEETING_BAAS_BASE_URL") {
            self.api.base_url = Some(url);
        }
        if let Some(level) = get("MEETING_BAAS_LOG_LEVEL") {
            self.logging.level = Some(level);
        }
        if let Some(format) = get("MEETING_BAAS_LOG_FORMAT") {
            self.logging.format = LogFormat::parse(&format);
        }
        if let Some(file) = get("MEETING_BAAS_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }
        if let Some(enabled) = get("MEETING_BAAS_METRICS_ENABLED") {
            self.metrics.enabled = matches!(enabled.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(port) = get("MEETING_BAAS_METRICS_PORT").and_then(|p| p.parse().ok()) {
            self.metrics.port = port;
        }

        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Sets an explicit base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api.base_url = Some(url.into());
        self
    }

    /// Returns the effective API base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.api
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
            .to_string()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = MeetingBaasConfig::new();
        assert!(config.api_key.is_none());
        assert_eq!(config.environment, Environment::Prod);
        assert_eq!(config.base_url(), "https://api.meetingbaas.com");
        assert!((config.search.proximity_window_secs - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.search.recent_cache_capacity, 5);
        assert_eq!(config.search.fallback_meeting_limit, 5);
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("preprod"), Environment::PreProd);
        assert_eq!(Environment::parse("GMEETBOT"), Environment::GmeetBot);
        assert_eq!(Environment::parse("nonsense"), Environment::Prod);
        assert_eq!(
            Environment::PreProd.base_url(),
            "https://api.pre-prod-meetingbaas.com"
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
api_key = "file-key"
environment = "gmeetbot"

[api]
timeout_secs = 5
viewer_base_url = "https://viewer.example.com"

[search]
proximity_window_secs = 45.0
fallback_meeting_limit = 3
recent_cache_capacity = 50

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = MeetingBaasConfig::load_from_file(file.path()).unwrap();
        assert_eq!(
            config.api_key.as_ref().map(|k| k.expose_secret().to_string()),
            Some("file-key".to_string())
        );
        assert_eq!(config.environment, Environment::GmeetBot);
        assert_eq!(config.api.timeout, Duration::from_secs(5));
        assert_eq!(config.api.viewer_base_url, "https://viewer.example.com");
        assert!((config.search.proximity_window_secs - 45.0).abs() < f64::EPSILON);
        assert_eq!(config.search.fallback_meeting_limit, 3);
        assert_eq!(config.search.calendar_event_limit, 10);
        assert_eq!(config.search.recent_cache_capacity, MAX_RECENT_MEETINGS);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_from_file_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "unknown_key = 1").unwrap();
        let result = MeetingBaasConfig::load_from_file(file.path());
        assert!(matches!(result, Err(crate::Error::OperationFailed { .. })));
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = MeetingBaasConfig::load_from_file(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (API_KEY_ENV, "env-key"),
            (ENVIRONMENT_ENV, "preprod"),
            ("MEETING_BAAS_LOG_FORMAT", "json"),
            ("MEETING_BAAS_METRICS_ENABLED", "true"),
            ("MEETING_BAAS_METRICS_PORT", "9191"),
        ]
        .into_iter()
        .collect();

        let config = MeetingBaasConfig::new()
            .with_api_key("file-key")
            .with_overrides_from(|k| vars.get(k).map(|v| (*v).to_string()));

        assert_eq!(
            config.api_key.as_ref().map(|k| k.expose_secret().to_string()),
            Some("env-key".to_string())
        );
        assert_eq!(config.environment, Environment::PreProd);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.port, 9191);
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let config = MeetingBaasConfig::new()
            .with_api_key("kept")
            .with_overrides_from(|k| (k == API_KEY_ENV).then(|| "   ".to_string()));
        assert_eq!(
            config.api_key.as_ref().map(|k| k.expose_secret().to_string()),
            Some("kept".to_string())
        );
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let config = MeetingBaasConfig::new().with_base_url("http://127.0.0.1:8080/");
        assert_eq!(config.base_url(), "http://127.0.0.1:8080");
    }
}
