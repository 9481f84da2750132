//! Structured logging configuration.

use crate::config::{LogFormat, LoggingSettings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Default filter when nothing else is configured.
const DEFAULT_FILTER: &str = "info";

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Event filter.
    pub filter: EnvFilter,
    /// Log file; stderr when absent.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds logging configuration from settings.
    ///
    /// Filter precedence: `RUST_LOG`, then the configured level, then `info`.
    /// `verbose` forces `debug` regardless.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        let filter = if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                let directive = settings.level.as_deref().unwrap_or(DEFAULT_FILTER);
                EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
            })
        };

        Self {
            format: settings.format,
            filter,
            file: settings.file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_forces_debug() {
        let config = LoggingConfig::from_settings(&LoggingSettings::default(), true);
        assert_eq!(config.filter.to_string(), "debug");
    }

    #[test]
    fn test_settings_carry_format_and_file() {
        let settings = LoggingSettings {
            level: Some("warn".to_string()),
            format: LogFormat::Json,
            file: Some(PathBuf::from("/tmp/mb.log")),
        };
        let config = LoggingConfig::from_settings(&settings, false);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/mb.log")));
    }
}
