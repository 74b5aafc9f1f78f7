//! game-caster-rs: emotional speech commentary for live game events.
//!
//! Game events (kill, death, low_health, ...) are classified into
//! priority-ordered, emotion-tagged utterances and drained one at a time
//! into a pluggable speech backend. Critical warnings jump the queue and
//! bypass an active silence window.

pub mod backend;
pub mod classifier;
pub mod config;
pub mod emotion;
pub mod engine;
pub mod error;
pub mod queue;
pub mod speaker;
pub mod stats;

pub use backend::SpeechBackend;
pub use classifier::{classify, EventKind, Utterance};
pub use emotion::{Emotion, EmotionProfile};
pub use engine::CommentaryEngine;
pub use error::{ClassifyError, SpeechError};
pub use queue::{EnqueueOutcome, SpeechQueue};
pub use stats::StatsSnapshot;
