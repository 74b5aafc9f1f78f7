//! Emotion tags and their speech parameters.
//!
//! Each emotion maps to a fixed (rate, volume) profile applied when the
//! utterance reaches the speech backend. The table is a process-wide
//! constant, loaded once and never mutated.

use serde::{Deserialize, Serialize};

/// Closed set of emotion tags assigned at classification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Calm,
    Normal,
    Excited,
    Urgent,
    Worried,
    Flirty,
}

/// Speech parameters for one emotion: rate in words per minute, volume 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionProfile {
    pub rate: u32,
    pub volume: f32,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Calm,
        Emotion::Normal,
        Emotion::Excited,
        Emotion::Urgent,
        Emotion::Worried,
        Emotion::Flirty,
    ];

    /// Look up the constant speech profile for this emotion.
    pub const fn profile(self) -> EmotionProfile {
        match self {
            // Calm: slow and quiet
            Emotion::Calm => EmotionProfile { rate: 150, volume: 0.8 },
            // Normal: standard delivery
            Emotion::Normal => EmotionProfile { rate: 170, volume: 0.85 },
            // Excited: fast and loud
            Emotion::Excited => EmotionProfile { rate: 200, volume: 0.95 },
            // Urgent: maximum rate and volume, used for critical warnings
            Emotion::Urgent => EmotionProfile { rate: 220, volume: 1.0 },
            // Worried: slowest, quietest
            Emotion::Worried => EmotionProfile { rate: 140, volume: 0.75 },
            // Flirty: soft, playful
            Emotion::Flirty => EmotionProfile { rate: 160, volume: 0.9 },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Emotion::Calm => "calm",
            Emotion::Normal => "normal",
            Emotion::Excited => "excited",
            Emotion::Urgent => "urgent",
            Emotion::Worried => "worried",
            Emotion::Flirty => "flirty",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
