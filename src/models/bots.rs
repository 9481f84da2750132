//! Bot lifecycle and calendar connection models.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar connected to the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    /// Calendar identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owner email.
    pub email: String,
}

/// How a bot records the meeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingMode {
    /// Active speaker layout.
    #[default]
    SpeakerView,
    /// Grid of all participants.
    GalleryView,
    /// Audio track only.
    AudioOnly,
}

impl RecordingMode {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SpeakerView => "speaker_view",
            Self::GalleryView => "gallery_view",
            Self::AudioOnly => "audio_only",
        }
    }
}

impl fmt::Display for RecordingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to send a bot into a meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotRequest {
    /// Meeting link the bot joins.
    pub meeting_url: String,
    /// Name shown for the bot in the meeting.
    pub bot_name: String,
    /// Reserve a bot ahead of time instead of joining now.
    pub reserved: bool,
    /// Recording layout.
    pub recording_mode: RecordingMode,
    /// Unix timestamp to join at, if not immediately.
    pub start_time: Option<i64>,
}

/// Bot settings used when scheduling a calendar event recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSettings {
    /// Name shown for the bot in the meeting.
    pub bot_name: String,
    /// Recording layout.
    pub recording_mode: RecordingMode,
}

/// Speech-to-text engine used for a transcription run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranscriptionProvider {
    /// Gladia.
    Gladia,
    /// Runpod.
    Runpod,
    /// The account default.
    Default,
}

/// A request to transcribe an existing recording again.
#[derive(Debug, Clone)]
pub struct RetranscribeRequest {
    /// Bot whose recording is transcribed.
    pub bot_id: String,
    /// Engine to use; the account default when absent.
    pub provider: Option<TranscriptionProvider>,
    /// Key for the chosen engine, if it needs one.
    pub provider_api_key: Option<SecretString>,
    /// Callback notified when the transcript is ready.
    pub webhook_url: Option<String>,
}

/// How the API acknowledged a retranscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetranscribeStatus {
    /// Queued for asynchronous processing (HTTP 200).
    Queued,
    /// Already being processed (HTTP 202).
    Processing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_mode_wire_names() {
        assert_eq!(RecordingMode::default(), RecordingMode::SpeakerView);
        for mode in [
            RecordingMode::SpeakerView,
            RecordingMode::GalleryView,
            RecordingMode::AudioOnly,
        ] {
            let encoded = serde_json::to_value(mode).unwrap();
            assert_eq!(encoded, serde_json::json!(mode.as_str()));
        }
    }

    #[test]
    fn test_provider_names_keep_case() {
        let provider: TranscriptionProvider = serde_json::from_str("\"Gladia\"").unwrap();
        assert_eq!(provider, TranscriptionProvider::Gladia);
        assert!(serde_json::from_str::<TranscriptionProvider>("\"gladia\"").is_err());
    }
}
