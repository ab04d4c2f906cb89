//! Error types for TTS synthesis requests

use thiserror::Error;

pub type TtsResult<T> = Result<T, TtsError>;

/// TTS request failures. None of these are retried automatically; they
/// propagate to the caller, who owns the user-visible messaging.
#[derive(Error, Debug)]
pub enum TtsError {
    /// The synthesis service could not be reached at all.
    #[error("TTS transport error: {0}")]
    Transport(String),

    /// The synthesis service answered with a non-success status.
    #[error("TTS request failed: {status} {message}")]
    Service { status: u16, message: String },

    /// The service answered successfully but produced no audio payload.
    #[error("synthesis produced no audio: {0}")]
    NoAudio(String),
}
