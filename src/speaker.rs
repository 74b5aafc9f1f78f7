//! Speech drain loop: the single consumer of the queue.
//!
//! Pops the most urgent pending utterance, resolves its emotion profile and
//! speaks it through the backend, one utterance at a time. A backend
//! failure or timeout discards that utterance and the loop continues; a
//! single bad speak call never halts draining.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::backend::SpeechBackend;
use crate::error::SpeechError;
use crate::queue::SpeechQueue;
use crate::stats::StatsCollector;

pub struct DrainConfig {
    pub speak_timeout: Duration,
    pub debounce: Duration,
}

pub struct SpeechDrain {
    queue: Arc<SpeechQueue>,
    shutdown: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl SpeechDrain {
    /// Spawn the drain task. There must be exactly one per queue.
    pub fn spawn(
        queue: Arc<SpeechQueue>,
        backend: Arc<dyn SpeechBackend>,
        stats: Arc<StatsCollector>,
        config: DrainConfig,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));

        let handle = tokio::spawn(drain_loop(
            queue.clone(),
            backend,
            stats,
            config,
            shutdown.clone(),
        ));

        Self {
            queue,
            shutdown,
            handle,
        }
    }

    /// Stop the loop after the in-flight utterance finishes and wait for
    /// the task to exit. Pending utterances are abandoned.
    pub async fn shutdown(self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.queue.notify_work();
        if let Err(e) = self.handle.await {
            warn!("Drain task join failed: {e}");
        }
        info!("Speech drain stopped");
    }
}

async fn drain_loop(
    queue: Arc<SpeechQueue>,
    backend: Arc<dyn SpeechBackend>,
    stats: Arc<StatsCollector>,
    config: DrainConfig,
    shutdown: Arc<AtomicBool>,
) {
    info!(
        "Speech drain running (speak timeout {}s, debounce {}ms)",
        config.speak_timeout.as_secs(),
        config.debounce.as_millis()
    );

    while !shutdown.load(Ordering::Relaxed) {
        let Some(utterance) = queue.pop() else {
            queue.wait_for_work().await;
            continue;
        };

        let profile = utterance.emotion.profile();
        debug!(
            "Speaking p{} [{}]: {}",
            utterance.priority, utterance.emotion, utterance.text
        );

        match timeout(
            config.speak_timeout,
            backend.speak(&utterance.text, profile.rate, profile.volume),
        )
        .await
        {
            Ok(Ok(())) => {
                info!("[{}] {}", utterance.emotion, utterance.text);
            }
            Ok(Err(e)) => {
                stats.record_failure();
                warn!("Speech failed, discarding utterance: {e}");
            }
            Err(_) => {
                stats.record_failure();
                let e = SpeechError::Timeout(config.speak_timeout.as_secs());
                warn!("Speech failed, discarding utterance: {e}");
            }
        }

        // Recorded regardless of outcome; the utterance is consumed either way
        stats.record(&utterance);
        queue.complete();

        if !config.debounce.is_zero() {
            tokio::time::sleep(config.debounce).await;
        }
    }
}
