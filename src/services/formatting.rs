//! Text rendering shared by tools, resources and the CLI.

// Allow cast_possible_truncation and cast_sign_loss for whole-second timestamps.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::models::TranscriptSegment;
use serde::Deserialize;
use std::fmt::Write as _;

/// Renders seconds as `mm:ss`, or `h:mm:ss` from one hour up.
#[must_use]
pub fn format_time(secs: f64) -> String {
    let total = whole_seconds(secs);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Renders a duration as `Xm Ys`.
#[must_use]
pub fn format_duration(secs: f64) -> String {
    let total = whole_seconds(secs);
    format!("{}m {}s", total / 60, total % 60)
}

fn whole_seconds(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    }
}

/// Builds a viewer link, optionally jumping to a timestamp.
#[must_use]
pub fn shareable_link(viewer_base_url: &str, bot_id: &str, timestamp: Option<f64>) -> String {
    let base = viewer_base_url.trim_end_matches('/');
    match timestamp {
        Some(t) => format!("{base}/{bot_id}?t={}", whole_seconds(t)),
        None => format!("{base}/{bot_id}"),
    }
}

/// Returns the recording URL without its query string, jumping to `secs`.
#[must_use]
pub fn video_url_at(recording_url: &str, secs: f64) -> String {
    let base = recording_url.split('?').next().unwrap_or(recording_url);
    format!("{base}?t={}", whole_seconds(secs))
}

/// Renders one transcript line as `[mm:ss] speaker: text`.
#[must_use]
pub fn transcript_line(segment: &TranscriptSegment) -> String {
    format!(
        "[{}] {}: {}",
        format_time(segment.start_time),
        segment.speaker,
        segment.text()
    )
}

/// Renders a whole transcript, one line per segment.
#[must_use]
pub fn transcript_text(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(transcript_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wraps every case-insensitive occurrence of `term` in `**`.
#[must_use]
pub fn highlight(text: &str, term: &str) -> String {
    let needle = term.trim();
    if needle.is_empty() {
        return text.to_string();
    }
    let lower_text = text.to_lowercase();
    let lower_needle = needle.to_lowercase();
    // Lowercasing can change byte lengths outside ASCII; leave such text as is.
    if lower_text.len() != text.len() || lower_needle.len() != needle.len() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + 8);
    let mut cursor = 0;
    for (idx, _) in lower_text.match_indices(&lower_needle) {
        out.push_str(&text[cursor..idx]);
        out.push_str("**");
        out.push_str(&text[idx..idx + needle.len()]);
        out.push_str("**");
        cursor = idx + needle.len();
    }
    out.push_str(&text[cursor..]);
    out
}

/// Optional decorations for a single shareable link.
#[derive(Debug, Clone, Default)]
pub struct LinkDetails<'a> {
    /// Jump target in seconds.
    pub timestamp: Option<f64>,
    /// Heading shown in bold.
    pub title: Option<&'a str>,
    /// Speaker at the timestamp.
    pub speaker: Option<&'a str>,
    /// What happens at the timestamp.
    pub description: Option<&'a str>,
}

/// Renders a shareable link block.
#[must_use]
pub fn link_block(viewer_base_url: &str, bot_id: &str, details: &LinkDetails<'_>) -> String {
    let link = shareable_link(viewer_base_url, bot_id, details.timestamp);
    let mut lines = Vec::with_capacity(4);
    if let Some(title) = details.title.filter(|t| !t.trim().is_empty()) {
        lines.push(format!("**{title}**"));
    }
    lines.push(match details.timestamp {
        Some(t) => format!("[Watch at {}]({link})", format_time(t)),
        None => format!("[Watch recording]({link})"),
    });
    if let Some(speaker) = details.speaker.filter(|s| !s.trim().is_empty()) {
        lines.push(format!("Speaker: {speaker}"));
    }
    if let Some(description) = details.description.filter(|d| !d.trim().is_empty()) {
        lines.push(description.to_string());
    }
    lines.join("\n")
}

/// A timestamp to share as part of a segment list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedSegment {
    /// Offset in seconds.
    pub timestamp: f64,
    /// Speaker at the timestamp.
    #[serde(default)]
    pub speaker: Option<String>,
    /// What happens at the timestamp.
    pub description: String,
}

/// Renders a numbered list of links into one recording.
#[must_use]
pub fn segments_list(viewer_base_url: &str, bot_id: &str, segments: &[SharedSegment]) -> String {
    let mut out = String::from("## Meeting Segments\n");
    for (i, segment) in segments.iter().enumerate() {
        let link = shareable_link(viewer_base_url, bot_id, Some(segment.timestamp));
        let time = format_time(segment.timestamp);
        let _ = write!(out, "\n{}. [{time}]({link})", i + 1);
        if let Some(speaker) = segment.speaker.as_deref().filter(|s| !s.trim().is_empty()) {
            let _ = write!(out, " {speaker}:");
        }
        let _ = writeln!(out, " {}", segment.description);
    }
    let _ = write!(
        out,
        "\n[Watch full recording]({})",
        shareable_link(viewer_base_url, bot_id, None)
    );
    out
}
