//! Commentary engine: wires classifier, queue, drain loop, and stats.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::backend::SpeechBackend;
use crate::classifier::classify;
use crate::config::{Config, SilenceConfig};
use crate::error::ClassifyError;
use crate::queue::{EnqueueOutcome, SpeechQueue};
use crate::speaker::{DrainConfig, SpeechDrain};
use crate::stats::{StatsCollector, StatsSnapshot};

pub struct CommentaryEngine {
    queue: Arc<SpeechQueue>,
    stats: Arc<StatsCollector>,
    drain: SpeechDrain,
    default_silence: Duration,
}

impl CommentaryEngine {
    /// Construct the queue and spawn the drain loop against `backend`.
    pub fn start(config: &Config, backend: Arc<dyn SpeechBackend>) -> Self {
        let queue = Arc::new(SpeechQueue::new(config.queue.capacity));
        let stats = Arc::new(StatsCollector::new());

        let drain = SpeechDrain::spawn(
            queue.clone(),
            backend,
            stats.clone(),
            DrainConfig {
                speak_timeout: Duration::from_secs(config.speech.speak_timeout_secs),
                debounce: Duration::from_millis(config.queue.debounce_ms),
            },
        );

        info!("Commentary engine started (queue capacity {})", config.queue.capacity);

        // Negative, NaN, or overflowing durations fall back to the default
        let default_silence = Duration::try_from_secs_f64(config.silence.default_duration_secs)
            .unwrap_or_else(|_| {
                let fallback = SilenceConfig::default().default_duration_secs;
                warn!(
                    "Invalid silence.default_duration_secs {}, using {fallback}s",
                    config.silence.default_duration_secs
                );
                Duration::from_secs_f64(fallback)
            });

        Self {
            queue,
            stats,
            drain,
            default_silence,
        }
    }

    /// Classify an event and enqueue the resulting utterance.
    ///
    /// Only an unrecognized event kind is an error; silence and overflow
    /// drops are reported through the returned outcome and counters.
    pub fn handle_event(&self, kind: &str, payload: &Value) -> Result<EnqueueOutcome, ClassifyError> {
        let utterance = classify(kind, payload)?;
        Ok(self.queue.enqueue(utterance))
    }

    /// Suppress non-critical commentary for `duration` (configured default
    /// when `None`). Critical warnings still get through.
    pub fn enable_silence(&self, duration: Option<Duration>) {
        self.queue
            .enable_silence(duration.unwrap_or(self.default_silence));
    }

    pub fn disable_silence(&self) {
        self.queue.disable_silence();
    }

    pub fn silence_active(&self) -> bool {
        self.queue.silence_active()
    }

    /// Resolve once the queue is empty and no speech is in flight.
    pub async fn wait_for_speech(&self) {
        self.queue.wait_until_idle().await;
    }

    pub fn stats(&self) -> StatsSnapshot {
        let mut snapshot = self.stats.snapshot();
        let counters = self.queue.counters();
        snapshot.silence_drops = counters.silence_drops;
        snapshot.overflow_drops = counters.overflow_drops;
        snapshot.silence_active = self.queue.silence_active();
        snapshot
    }

    /// Stop the drain loop after the in-flight utterance finishes.
    pub async fn shutdown(self) {
        self.drain.shutdown().await;
    }
}
