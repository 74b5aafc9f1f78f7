//! Error types for classification and speech output.

use thiserror::Error;

/// Errors surfaced to callers of event classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("unknown event kind: {0}")]
    UnknownEventKind(String),
}

/// Errors from a single speech backend call. Absorbed by the drain loop,
/// never propagated to enqueuers.
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("speech backend failed: {0}")]
    Backend(String),

    #[error("speech backend timed out after {0}s")]
    Timeout(u64),
}
