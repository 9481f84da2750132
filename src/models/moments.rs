//! Key moment types.

use serde::{Deserialize, Serialize};

/// Why a moment was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MomentKind {
    /// Meeting start or conclusion.
    Structural,
    /// Best segment mentioning a requested or detected topic.
    TopicMatch,
    /// A window where several people spoke.
    Conversation,
    /// A long uninterrupted contribution.
    ExtendedDiscussion,
}

impl MomentKind {
    /// Returns the kind as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::TopicMatch => "topic-match",
            Self::Conversation => "conversation",
            Self::ExtendedDiscussion => "extended-discussion",
        }
    }
}

/// A single timestamp judged noteworthy for sharing or navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMoment {
    /// Offset into the recording, in seconds.
    pub start_time: f64,
    /// Speaker of the underlying segment.
    pub speaker: String,
    /// Short human-readable description.
    pub description: String,
    /// Importance used for ranking and deduplication.
    pub importance: f64,
    /// Origin of the moment.
    pub kind: MomentKind,
}

/// Level of detail for topic extraction and moment selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Few broad topics and moments.
    Low,
    /// Balanced (default).
    #[default]
    Medium,
    /// Many specific topics and moments.
    High,
}

impl Granularity {
    /// Parses a granularity string, defaulting to medium.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }

    /// Number of topics to extract at this granularity.
    #[must_use]
    pub const fn topic_count(self) -> usize {
        match self {
            Self::Low => 3,
            Self::Medium => 5,
            Self::High => 10,
        }
    }

    /// Adjusts a requested moment count for this granularity.
    #[must_use]
    pub fn adjust_moment_count(self, requested: usize) -> usize {
        match self {
            Self::Low => requested.min(3),
            Self::Medium => requested,
            Self::High => requested.max(10),
        }
    }

    /// Divides the meeting duration into this many conversation windows.
    #[must_use]
    pub const fn window_divisor(self) -> u32 {
        match self {
            Self::Low => 5,
            Self::Medium => 10,
            Self::High => 20,
        }
    }
}
