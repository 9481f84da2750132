//! Config command handler.

use meetingbaas_mcp::MeetingBaasConfig;
use meetingbaas_mcp::config::{API_KEY_ENV, CONFIG_PATH_ENV};
use secrecy::ExposeSecret;

/// Config command.
pub fn cmd_config(config: &MeetingBaasConfig, show: bool) -> anyhow::Result<()> {
    if !show {
        println!("Use --show to display the current configuration.");
        println!("Config file: set {CONFIG_PATH_ENV} or pass --config.");
        return Ok(());
    }

    println!("Current Configuration");
    println!("=====================");
    println!();

    println!("API:");
    println!(
        "  Key: {}",
        config
            .api_key
            .as_ref()
            .map_or_else(|| format!("(not set; use {API_KEY_ENV})"), |k| mask(k.expose_secret()))
    );
    println!("  Environment: {}", config.environment.as_str());
    println!("  Base URL: {}", config.base_url());
    println!("  Timeout: {}s", config.api.timeout.as_secs());
    println!("  Viewer URL: {}", config.api.viewer_base_url);
    println!();

    let s = &config.search;
    println!("Search:");
    println!("  Proximity Window: {}s", s.proximity_window_secs);
    println!("  Fallback Meeting Limit: {}", s.fallback_meeting_limit);
    println!("  Calendar Event Limit: {}", s.calendar_event_limit);
    println!("  Recent Cache Capacity: {}", s.recent_cache_capacity);
    println!("  Context Segments: {}", s.context_segments);
    println!("  Default Max Results: {}", s.default_max_results);
    println!("  Type Search Limit: {}", s.type_search_limit);
    println!();

    println!("Observability:");
    println!(
        "  Log Level: {}",
        config.logging.level.as_deref().unwrap_or("(default)")
    );
    println!("  Log Format: {:?}", config.logging.format);
    println!(
        "  Log File: {}",
        config
            .logging
            .file
            .as_ref()
            .map_or_else(|| "(stderr)".to_string(), |p| p.display().to_string())
    );
    println!("  Metrics Enabled: {}", config.metrics.enabled);
    println!("  Metrics Port: {}", config.metrics.port);

    Ok(())
}

/// Keeps the last four characters of a key.
fn mask(key: &str) -> String {
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if key.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{tail}")
    }
}
