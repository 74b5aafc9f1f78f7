//! Speech priority queue with silence gate.
//!
//! Pending utterances are ordered by ascending priority number (1 = most
//! urgent) with FIFO order inside a tier. Enqueue is safe under concurrent
//! producers; a single drain loop consumes. A timed silence window drops
//! non-critical utterances at enqueue time; critical ones always pass.
//!
//! The queue is bounded. When full, a newcomer that outranks the least
//! urgent pending entry evicts it; otherwise the newcomer is dropped.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::classifier::Utterance;

pub const DEFAULT_CAPACITY: usize = 64;

/// Result of an enqueue attempt. Drops are intentional and observable via
/// counters, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    SilenceDropped,
    OverflowDropped,
}

/// Timed suppression window. An immutable value replaced wholesale on
/// enable/disable so enqueue always reads one consistent snapshot.
#[derive(Debug, Clone, Copy, Default)]
struct SilenceWindow {
    active_until: Option<Instant>,
}

impl SilenceWindow {
    fn is_active(&self, now: Instant) -> bool {
        matches!(self.active_until, Some(until) if now < until)
    }
}

/// Ordering key: priority first, then arrival order within a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct QueueKey {
    priority: u8,
    seq: u64,
}

/// Drop counters, readable at any time.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueCounters {
    pub silence_drops: u64,
    pub overflow_drops: u64,
}

struct Inner {
    pending: BTreeMap<QueueKey, Utterance>,
    next_seq: u64,
    in_flight: bool,
    silence: SilenceWindow,
    counters: QueueCounters,
}

pub struct SpeechQueue {
    inner: Mutex<Inner>,
    capacity: usize,
    // Wakes the drain loop when work arrives
    work: Notify,
    // Wakes wait_until_idle watchers when an utterance finishes
    drained: Notify,
}

impl SpeechQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                pending: BTreeMap::new(),
                next_seq: 0,
                in_flight: false,
                silence: SilenceWindow::default(),
                counters: QueueCounters::default(),
            }),
            capacity: capacity.max(1),
            work: Notify::new(),
            drained: Notify::new(),
        }
    }

    /// Enqueue an utterance, applying the silence gate and capacity policy.
    pub fn enqueue(&self, utterance: Utterance) -> EnqueueOutcome {
        let mut inner = self.inner.lock().unwrap();

        if inner.silence.is_active(Instant::now()) && !utterance.critical {
            inner.counters.silence_drops += 1;
            debug!("Silence active, dropped: {}", utterance.text);
            return EnqueueOutcome::SilenceDropped;
        }

        let key = QueueKey {
            priority: utterance.priority,
            seq: inner.next_seq,
        };
        inner.next_seq += 1;

        if inner.pending.len() >= self.capacity {
            inner.counters.overflow_drops += 1;
            // Evict the least urgent pending entry only if the newcomer
            // outranks it; otherwise the newcomer itself is dropped.
            let least_urgent = inner.pending.last_key_value().map(|(k, _)| *k);
            match least_urgent {
                Some(last) if key < last => {
                    if let Some(evicted) = inner.pending.remove(&last) {
                        warn!(
                            "Queue full ({}), evicted p{}: {}",
                            self.capacity, evicted.priority, evicted.text
                        );
                    }
                }
                _ => {
                    warn!("Queue full ({}), dropped incoming: {}", self.capacity, utterance.text);
                    return EnqueueOutcome::OverflowDropped;
                }
            }
        }

        inner.pending.insert(key, utterance);
        drop(inner);

        self.work.notify_one();
        EnqueueOutcome::Queued
    }

    /// Pop the most urgent pending utterance, marking it in flight in the
    /// same critical section so idle checks never observe the gap between
    /// pop and speak.
    pub fn pop(&self) -> Option<Utterance> {
        let mut inner = self.inner.lock().unwrap();
        let utterance = inner.pending.pop_first().map(|(_, u)| u)?;
        inner.in_flight = true;
        Some(utterance)
    }

    /// Mark the in-flight utterance as finished (spoken or discarded).
    pub fn complete(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.in_flight = false;
        drop(inner);
        self.drained.notify_waiters();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when nothing is pending and nothing is being spoken.
    pub fn is_idle(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.pending.is_empty() && !inner.in_flight
    }

    /// Suspend until new work may be available. Used only by the drain loop.
    pub async fn wait_for_work(&self) {
        self.work.notified().await;
    }

    /// Wake the drain loop without enqueuing (used on shutdown).
    pub fn notify_work(&self) {
        self.work.notify_one();
    }

    /// Wait until the queue is fully drained and no speech is in flight.
    pub async fn wait_until_idle(&self) {
        loop {
            let drained = self.drained.notified();
            tokio::pin!(drained);
            drained.as_mut().enable();
            if self.is_idle() {
                return;
            }
            drained.await;
        }
    }

    /// Suppress non-critical utterances for `duration` from now.
    pub fn enable_silence(&self, duration: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner.silence = SilenceWindow {
            active_until: Some(Instant::now() + duration),
        };
        debug!("Silence enabled for {:.1}s", duration.as_secs_f64());
    }

    pub fn disable_silence(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.silence = SilenceWindow::default();
        debug!("Silence disabled");
    }

    pub fn silence_active(&self) -> bool {
        self.inner.lock().unwrap().silence.is_active(Instant::now())
    }

    pub fn counters(&self) -> QueueCounters {
        self.inner.lock().unwrap().counters
    }
}
