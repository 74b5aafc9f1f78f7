//! Stats collector: pure observer of drained utterances.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Local;
use serde::Serialize;

use crate::classifier::Utterance;
use crate::emotion::Emotion;

/// The most recently drained utterance.
#[derive(Debug, Clone, Serialize)]
pub struct LastMessage {
    pub text: String,
    pub emotion: Emotion,
    pub spoken_at: String,
}

/// Point-in-time view of everything the collector has seen, plus the
/// queue-level drop counters filled in by the engine.
#[derive(Debug, Clone, Serialize, Default)]
pub struct StatsSnapshot {
    pub total_messages: u64,
    pub emotion_distribution: BTreeMap<Emotion, u64>,
    pub last_message: Option<LastMessage>,
    pub speech_failures: u64,
    /// Queue-level field; zero unless populated by `CommentaryEngine::stats`.
    pub silence_drops: u64,
    /// Queue-level field; zero unless populated by `CommentaryEngine::stats`.
    pub overflow_drops: u64,
    /// Queue-level field; false unless populated by `CommentaryEngine::stats`.
    pub silence_active: bool,
}

#[derive(Default)]
struct StatsInner {
    total: u64,
    by_emotion: BTreeMap<Emotion, u64>,
    last: Option<LastMessage>,
    failures: u64,
}

/// Counters are mutated only by the drain loop; `snapshot` may be called
/// from any thread at any time.
#[derive(Default)]
pub struct StatsCollector {
    inner: Mutex<StatsInner>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a drained utterance (spoken or failed).
    pub fn record(&self, utterance: &Utterance) {
        let mut inner = self.inner.lock().unwrap();
        inner.total += 1;
        *inner.by_emotion.entry(utterance.emotion).or_insert(0) += 1;
        inner.last = Some(LastMessage {
            text: utterance.text.clone(),
            emotion: utterance.emotion,
            spoken_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        });
    }

    pub fn record_failure(&self) {
        self.inner.lock().unwrap().failures += 1;
    }

    /// Snapshot of the collector's own counters. The queue-level fields
    /// (`silence_drops`, `overflow_drops`, `silence_active`) are left at
    /// their defaults here; `CommentaryEngine::stats` merges them in from
    /// the queue. Call that instead for the full picture.
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.lock().unwrap();
        StatsSnapshot {
            total_messages: inner.total,
            emotion_distribution: inner.by_emotion.clone(),
            last_message: inner.last.clone(),
            speech_failures: inner.failures,
            silence_drops: 0,
            overflow_drops: 0,
            silence_active: false,
        }
    }
}
