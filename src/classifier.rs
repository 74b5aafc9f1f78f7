//! Event classification: game event kind + payload → utterance.
//!
//! A fixed table maps each recognized event kind to (priority, emotion,
//! critical). Commentary text is formatted from payload fields where they
//! exist; a missing optional field falls back to a generic phrase and never
//! fails the classification. Only an unrecognized kind is an error.

use chrono::{DateTime, Local};
use serde_json::Value;

use crate::emotion::Emotion;
use crate::error::ClassifyError;

/// Recognized game event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Kill,
    DoubleKill,
    TripleKill,
    Death,
    LowHealth,
    LowAmmo,
    GameStart,
    RoundEnd,
    Custom,
}

impl std::str::FromStr for EventKind {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kill" => Ok(Self::Kill),
            "double_kill" => Ok(Self::DoubleKill),
            "triple_kill" => Ok(Self::TripleKill),
            "death" => Ok(Self::Death),
            "low_health" => Ok(Self::LowHealth),
            "low_ammo" => Ok(Self::LowAmmo),
            "game_start" => Ok(Self::GameStart),
            "round_end" => Ok(Self::RoundEnd),
            "custom" => Ok(Self::Custom),
            other => Err(ClassifyError::UnknownEventKind(other.to_string())),
        }
    }
}

impl EventKind {
    /// Queue priority, lower = more urgent (1 = most urgent).
    pub const fn priority(self) -> u8 {
        match self {
            Self::LowHealth => 1,
            Self::LowAmmo => 2,
            Self::Death | Self::DoubleKill => 3,
            Self::TripleKill => 4,
            Self::Kill | Self::GameStart | Self::RoundEnd | Self::Custom => 5,
        }
    }

    pub const fn emotion(self) -> Emotion {
        match self {
            Self::LowHealth | Self::LowAmmo => Emotion::Urgent,
            Self::Death | Self::RoundEnd => Emotion::Calm,
            Self::Kill | Self::DoubleKill | Self::TripleKill | Self::GameStart => Emotion::Excited,
            Self::Custom => Emotion::Normal,
        }
    }

    /// Critical events are the only kinds allowed through an active
    /// silence window.
    pub const fn is_critical(self) -> bool {
        matches!(self, Self::LowHealth | Self::LowAmmo)
    }
}

/// A unit of speech. Priority and emotion are assigned here and never
/// mutated after enqueue.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub text: String,
    pub priority: u8,
    pub emotion: Emotion,
    pub critical: bool,
    pub created_at: DateTime<Local>,
}

/// Classify an incoming event into an utterance.
///
/// Fails only for unrecognized kinds; missing payload fields degrade to a
/// generic phrase.
pub fn classify(kind: &str, payload: &Value) -> Result<Utterance, ClassifyError> {
    let kind: EventKind = kind.parse()?;
    let text = commentary_text(kind, payload);

    Ok(Utterance {
        text,
        priority: kind.priority(),
        emotion: kind.emotion(),
        critical: kind.is_critical(),
        created_at: Local::now(),
    })
}

fn commentary_text(kind: EventKind, payload: &Value) -> String {
    match kind {
        EventKind::Kill => {
            let weapon = payload
                .get("weapon")
                .and_then(Value::as_str)
                .unwrap_or("your weapon");
            let headshot = payload
                .get("headshot")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if headshot {
                format!("Headshot! Clean kill with the {weapon}!")
            } else {
                format!("Enemy down with the {weapon}. Keep it up!")
            }
        }
        EventKind::DoubleKill => "Double kill! Two enemies down, you're rolling!".to_string(),
        EventKind::TripleKill => "Triple kill! Absolutely unstoppable!".to_string(),
        EventKind::Death => {
            let kd = payload.get("kd_ratio").and_then(Value::as_f64);
            match kd {
                Some(kd) if kd >= 2.0 => {
                    "Even legends go down sometimes. You'll be back stronger.".to_string()
                }
                Some(kd) if kd >= 1.0 => {
                    "Good trade overall. Reset and take the next fight.".to_string()
                }
                _ => "Every death is a lesson. Shake it off and go again.".to_string(),
            }
        }
        EventKind::LowHealth => match payload.get("current_health").and_then(Value::as_u64) {
            Some(hp) => format!("Critical! {hp} HP left, find cover right now!"),
            None => "Critical! Health is almost gone, find cover right now!".to_string(),
        },
        EventKind::LowAmmo => match payload.get("ammo_magazine").and_then(Value::as_u64) {
            Some(ammo) => format!("Low ammo! Only {ammo} rounds left, reload now!"),
            None => "Low ammo! Magazine is nearly empty, reload now!".to_string(),
        },
        EventKind::GameStart => "New round! Focus up and take it!".to_string(),
        EventKind::RoundEnd => match payload.get("team_won").and_then(Value::as_bool) {
            Some(true) => "Round won! Great work out there!".to_string(),
            Some(false) => "Round lost. Shake it off, the next one is ours.".to_string(),
            None => "Round over. Regroup and get ready.".to_string(),
        },
        EventKind::Custom => payload
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("Something happened out there.")
            .to_string(),
    }
}
