//! Speech backend seam.
//!
//! The drain loop only needs `speak(text, rate, volume)`; everything else
//! (which synthesizer, which device) lives behind this trait.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::error::SpeechError;

#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Speak `text` at `rate` words per minute and `volume` 0.0-1.0.
    /// Synchronous from the caller's perspective: resolves when playback
    /// is finished.
    async fn speak(&self, text: &str, rate: u32, volume: f32) -> Result<(), SpeechError>;
}

/// Shells out to the system `espeak` binary.
pub struct EspeakBackend {
    binary: PathBuf,
}

impl EspeakBackend {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl SpeechBackend for EspeakBackend {
    async fn speak(&self, text: &str, rate: u32, volume: f32) -> Result<(), SpeechError> {
        // espeak amplitude range is 0-200
        let amplitude = (volume.clamp(0.0, 1.0) * 200.0).round() as u32;

        let status = Command::new(&self.binary)
            .arg("-s")
            .arg(rate.to_string())
            .arg("-a")
            .arg(amplitude.to_string())
            .arg(text)
            .status()
            .await
            .map_err(|e| SpeechError::Backend(format!("failed to run espeak: {e}")))?;

        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::Backend(format!("espeak exited with {status}")))
        }
    }
}

/// Logs utterances instead of speaking them, for running without audio.
pub struct LogBackend;

#[async_trait]
impl SpeechBackend for LogBackend {
    async fn speak(&self, text: &str, rate: u32, volume: f32) -> Result<(), SpeechError> {
        info!("[speak rate={rate} vol={volume:.2}] {text}");
        Ok(())
    }
}
