//! Integration tests for the commentary engine.
//!
//! Drives the full classify → enqueue → drain → stats pipeline against a
//! scripted mock backend that records calls and can inject failures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use game_caster::backend::SpeechBackend;
use game_caster::config::Config;
use game_caster::error::{ClassifyError, SpeechError};
use game_caster::queue::EnqueueOutcome;
use game_caster::CommentaryEngine;

/// Records every successful speak call; fails the call indices listed in
/// `fail_calls`; optionally sleeps to simulate playback time.
struct MockBackend {
    spoken: Mutex<Vec<String>>,
    fail_calls: Vec<usize>,
    calls: AtomicUsize,
    delay: Duration,
}

impl MockBackend {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            spoken: Mutex::new(Vec::new()),
            fail_calls: Vec::new(),
            calls: AtomicUsize::new(0),
            delay,
        })
    }

    fn failing_on(delay: Duration, fail_calls: Vec<usize>) -> Arc<Self> {
        Arc::new(Self {
            spoken: Mutex::new(Vec::new()),
            fail_calls,
            calls: AtomicUsize::new(0),
            delay,
        })
    }

    fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechBackend for MockBackend {
    async fn speak(&self, text: &str, _rate: u32, _volume: f32) -> Result<(), SpeechError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_calls.contains(&call) {
            return Err(SpeechError::Backend("device busy".into()));
        }
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.queue.debounce_ms = 0;
    config.speech.speak_timeout_secs = 5;
    config
}

#[tokio::test]
async fn urgent_event_preempts_queued_routine_events() {
    let backend = MockBackend::new(Duration::from_millis(200));
    let engine = CommentaryEngine::start(&test_config(), backend.clone());

    // First event starts speaking immediately and holds the backend
    engine.handle_event("game_start", &json!({})).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Queued while the backend is busy: kills first, then the critical warning
    engine
        .handle_event("kill", &json!({"weapon": "first"}))
        .unwrap();
    engine
        .handle_event("kill", &json!({"weapon": "second"}))
        .unwrap();
    engine
        .handle_event("low_health", &json!({"current_health": 12}))
        .unwrap();

    engine.wait_for_speech().await;

    let spoken = backend.spoken();
    assert_eq!(spoken.len(), 4);
    assert!(
        spoken[1].contains("Critical!"),
        "low_health must jump ahead of the kills: {spoken:?}"
    );
    assert!(spoken[2].contains("first"));
    assert!(spoken[3].contains("second"));

    engine.shutdown().await;
}

#[tokio::test]
async fn wait_for_speech_blocks_until_everything_is_spoken() {
    let backend = MockBackend::new(Duration::from_millis(50));
    let engine = CommentaryEngine::start(&test_config(), backend.clone());

    for weapon in ["a", "b", "c"] {
        engine
            .handle_event("kill", &json!({"weapon": weapon}))
            .unwrap();
    }
    engine.wait_for_speech().await;

    assert_eq!(backend.spoken().len(), 3);
    assert_eq!(engine.stats().total_messages, 3);

    engine.shutdown().await;
}

#[tokio::test]
async fn single_backend_failure_does_not_halt_the_drain_loop() {
    // Utterance #3 (call index 2) of 5 fails
    let backend = MockBackend::failing_on(Duration::from_millis(20), vec![2]);
    let engine = CommentaryEngine::start(&test_config(), backend.clone());

    for weapon in ["one", "two", "three", "four", "five"] {
        engine
            .handle_event("kill", &json!({"weapon": weapon}))
            .unwrap();
    }
    engine.wait_for_speech().await;

    let spoken = backend.spoken();
    assert_eq!(spoken.len(), 4, "four of five must still be spoken");
    assert!(spoken.iter().any(|t| t.contains("four")));
    assert!(spoken.iter().any(|t| t.contains("five")));

    let stats = engine.stats();
    assert_eq!(stats.speech_failures, 1);
    assert_eq!(stats.total_messages, 5);

    engine.shutdown().await;
}

#[tokio::test]
async fn silence_drops_routine_but_speaks_critical_events() {
    let backend = MockBackend::new(Duration::ZERO);
    let engine = CommentaryEngine::start(&test_config(), backend.clone());

    engine.enable_silence(Some(Duration::from_secs(60)));
    assert!(engine.silence_active());

    let outcome = engine.handle_event("kill", &json!({})).unwrap();
    assert_eq!(outcome, EnqueueOutcome::SilenceDropped);

    let outcome = engine
        .handle_event("low_health", &json!({"current_health": 5}))
        .unwrap();
    assert_eq!(outcome, EnqueueOutcome::Queued);

    engine.wait_for_speech().await;

    let spoken = backend.spoken();
    assert_eq!(spoken.len(), 1, "only the critical warning speaks");
    assert!(spoken[0].contains("Critical!"));

    let stats = engine.stats();
    assert_eq!(stats.silence_drops, 1);
    assert!(stats.silence_active);

    engine.shutdown().await;
}

#[tokio::test]
async fn silence_expiry_restores_routine_commentary() {
    let backend = MockBackend::new(Duration::ZERO);
    let engine = CommentaryEngine::start(&test_config(), backend.clone());

    engine.enable_silence(Some(Duration::from_millis(30)));
    tokio::time::sleep(Duration::from_millis(60)).await;

    let outcome = engine.handle_event("kill", &json!({})).unwrap();
    assert_eq!(outcome, EnqueueOutcome::Queued);
    engine.wait_for_speech().await;

    assert_eq!(backend.spoken().len(), 1);
    assert!(!engine.silence_active());

    engine.shutdown().await;
}

#[tokio::test]
async fn unknown_event_kind_is_surfaced_and_creates_nothing() {
    let backend = MockBackend::new(Duration::ZERO);
    let engine = CommentaryEngine::start(&test_config(), backend.clone());

    let err = engine.handle_event("explosion", &json!({})).unwrap_err();
    assert_eq!(err, ClassifyError::UnknownEventKind("explosion".into()));

    engine.wait_for_speech().await;
    assert!(backend.spoken().is_empty());
    assert_eq!(engine.stats().total_messages, 0);

    engine.shutdown().await;
}

#[tokio::test]
async fn stats_reflect_emotion_distribution_and_last_message() {
    let backend = MockBackend::new(Duration::ZERO);
    let engine = CommentaryEngine::start(&test_config(), backend.clone());

    engine.handle_event("kill", &json!({})).unwrap();
    engine.handle_event("death", &json!({})).unwrap();
    engine
        .handle_event("custom", &json!({"text": "last words"}))
        .unwrap();
    engine.wait_for_speech().await;

    let stats = engine.stats();
    assert_eq!(stats.total_messages, 3);
    assert_eq!(stats.emotion_distribution.values().sum::<u64>(), 3);
    assert_eq!(stats.last_message.unwrap().text, "last words");

    engine.shutdown().await;
}

#[tokio::test]
async fn invalid_silence_duration_in_config_falls_back_to_default() {
    let mut config = test_config();
    config.silence.default_duration_secs = -5.0;

    let backend = MockBackend::new(Duration::ZERO);
    let engine = CommentaryEngine::start(&config, backend.clone());

    // The fallback window must still suppress routine commentary
    engine.enable_silence(None);
    assert!(engine.silence_active());
    let outcome = engine.handle_event("kill", &json!({})).unwrap();
    assert_eq!(outcome, EnqueueOutcome::SilenceDropped);

    engine.shutdown().await;
}

#[tokio::test]
async fn nan_silence_duration_in_config_falls_back_to_default() {
    let mut config = test_config();
    config.silence.default_duration_secs = f64::NAN;

    let backend = MockBackend::new(Duration::ZERO);
    let engine = CommentaryEngine::start(&config, backend.clone());

    engine.enable_silence(None);
    assert!(engine.silence_active());

    engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn hung_backend_call_times_out_and_drain_continues() {
    // The backend "hangs" for 60s; speak timeout is 5s. Paused time makes
    // this run instantly.
    let backend = MockBackend::new(Duration::from_secs(60));
    let engine = CommentaryEngine::start(&test_config(), backend.clone());

    engine.handle_event("kill", &json!({"weapon": "stuck"})).unwrap();
    engine.handle_event("kill", &json!({"weapon": "next"})).unwrap();
    engine.wait_for_speech().await;

    let stats = engine.stats();
    assert_eq!(stats.speech_failures, 2, "both calls exceed the timeout");
    assert_eq!(stats.total_messages, 2, "both utterances are consumed");

    engine.shutdown().await;
}
