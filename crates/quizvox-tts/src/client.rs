//! TTS client interface

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::TtsResult;

/// Voice assumed when the caller does not pick one explicitly.
pub const DEFAULT_VOICE: &str = "Zephyr";

/// Delivery instruction sent alongside the text when the caller does not
/// supply one.
pub const DEFAULT_PROMPT: &str = "Say the following in a natural way";

/// A synthesis backend.
///
/// Implementations turn text into encoded audio bytes. The audio manager
/// only ever sees this trait, which keeps playback testable without a
/// network or a real engine.
#[async_trait]
pub trait TtsClient: Send + Sync {
    /// Synthesize `text` and return the raw encoded audio bytes.
    ///
    /// A `voice` of `None` asks the service for its default voice; `Some`
    /// requests a specific one. `prompt` is the delivery instruction the
    /// synthesis model receives together with the text.
    async fn synthesize(&self, text: &str, voice: Option<&str>, prompt: &str) -> TtsResult<Bytes>;
}
