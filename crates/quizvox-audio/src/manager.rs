//! The shared audio manager
//!
//! One instance per game session. It serializes playback (a new request
//! always cuts off the previous one), reuses pooled output channels, and
//! caches fetched synthesis results so repeated lines replay without a
//! network round-trip.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use quizvox_tts::{TtsClient, TtsError, DEFAULT_PROMPT, DEFAULT_VOICE};
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::AudioCache;
use crate::handle::{HandleId, PlaybackHandle};
use crate::output::{AudioOutput, PlaybackError};
use crate::pool::{AcquiredHandle, HandlePool};

/// How much of the text participates in the cache fingerprint.
const CACHE_KEY_TEXT_CHARS: usize = 50;

#[derive(Error, Debug)]
pub enum SpeakError {
    #[error("speech synthesis failed: {0}")]
    Tts(#[from] TtsError),

    #[error("audio playback failed: {0}")]
    Playback(#[from] PlaybackError),
}

/// Per-playback options.
#[derive(Debug, Clone, Default)]
pub struct PlaybackOptions {
    /// Playback volume, clamped to `[0.0, 1.0]`. `None` keeps the channel's
    /// current volume.
    pub volume: Option<f32>,
}

/// Lifecycle callbacks for [`AudioManager::play_tts`].
///
/// `on_start` fires synchronously before any request goes out, so UI code
/// can flip to a "speaking" state with no delay. Exactly one of
/// `on_success` / `on_error` fires per call.
#[derive(Default)]
pub struct SpeakCallbacks {
    on_start: Option<Box<dyn FnOnce() + Send>>,
    on_success: Option<Box<dyn FnOnce() + Send>>,
    on_error: Option<Box<dyn FnOnce(&SpeakError) + Send>>,
}

impl SpeakCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    pub fn on_success(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(&SpeakError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

/// Manager tuning knobs. Defaults match the shipped games.
#[derive(Debug, Clone)]
pub struct AudioManagerConfig {
    /// Upper bound on pooled output channels.
    pub max_pool_size: usize,
    /// Channels opened eagerly at construction.
    pub warm_handles: usize,
    /// Upper bound on cached synthesis results.
    pub max_cache_entries: usize,
    /// Voice assumed when the caller does not pick one.
    pub default_voice: String,
    /// Delivery instruction used when the caller does not supply one.
    pub default_prompt: String,
}

impl Default for AudioManagerConfig {
    fn default() -> Self {
        Self {
            max_pool_size: 5,
            warm_handles: 3,
            max_cache_entries: 10,
            default_voice: DEFAULT_VOICE.to_string(),
            default_prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

/// The handle currently routed to the speakers.
///
/// Pooled handles stay owned by the pool map; temporaries live here until
/// superseded, then drop.
enum CurrentPlayback {
    Pooled(HandleId),
    Temporary(PlaybackHandle),
}

struct ManagerState {
    pool: HandlePool,
    cache: AudioCache,
    current: Option<CurrentPlayback>,
    playing: bool,
}

impl ManagerState {
    /// Cut off the current handle: pause, free its source, forget it.
    fn stop_current(&mut self) {
        if let Some(current) = self.current.take() {
            match current {
                CurrentPlayback::Pooled(id) => {
                    if let Some(handle) = self.pool.get_mut(id) {
                        handle.pause();
                        handle.release();
                    }
                }
                CurrentPlayback::Temporary(mut handle) => {
                    handle.pause();
                    handle.release();
                    // Temporaries are never reused; dropping frees the channel.
                }
            }
        }
        self.playing = false;
    }

    fn current_handle(&self) -> Option<&PlaybackHandle> {
        match self.current.as_ref()? {
            CurrentPlayback::Pooled(id) => self.pool.get(*id),
            CurrentPlayback::Temporary(handle) => Some(handle),
        }
    }
}

/// Shared audio controller: at-most-one active playback, pooled output
/// channels, and request-level caching for synthesized speech.
pub struct AudioManager {
    tts: Arc<dyn TtsClient>,
    output: Box<dyn AudioOutput>,
    config: AudioManagerConfig,
    state: Mutex<ManagerState>,
}

impl AudioManager {
    /// Construct the manager and warm its playback pool.
    pub fn new(
        tts: Arc<dyn TtsClient>,
        output: Box<dyn AudioOutput>,
        config: AudioManagerConfig,
    ) -> Result<Self, PlaybackError> {
        let pool =
            HandlePool::with_warm_handles(config.max_pool_size, config.warm_handles, output.as_ref())?;
        let cache = AudioCache::new(config.max_cache_entries);
        Ok(Self {
            tts,
            output,
            config,
            state: Mutex::new(ManagerState {
                pool,
                cache,
                current: None,
                playing: false,
            }),
        })
    }

    /// Something is audibly playing right now.
    pub fn is_playing(&self) -> bool {
        let state = self.state.lock();
        state.playing && state.current_handle().is_some_and(PlaybackHandle::is_active)
    }

    /// Number of pooled handles (temporaries excluded).
    pub fn pool_size(&self) -> usize {
        self.state.lock().pool.len()
    }

    /// Cut off whatever is currently playing and free its source.
    pub fn stop_current(&self) {
        self.state.lock().stop_current();
    }

    /// Play raw encoded audio, superseding any current playback.
    ///
    /// Returns once the bytes decoded and the channel started; it does not
    /// wait for the clip to finish. On any failure the handle is released
    /// before the error propagates, so no partial state is left behind.
    pub fn play(&self, bytes: &[u8], options: &PlaybackOptions) -> Result<(), PlaybackError> {
        let mut state = self.state.lock();
        state.stop_current();

        let result = match state.pool.acquire(self.output.as_ref())? {
            AcquiredHandle::Pooled(id) => {
                state.current = Some(CurrentPlayback::Pooled(id));
                match state.pool.get_mut(id) {
                    Some(handle) => begin_playback(handle, bytes, options),
                    // The pool handed this id out a moment ago; a missing
                    // entry means the output went away underneath us.
                    None => Err(PlaybackError::OutputUnavailable(
                        "pooled handle missing".into(),
                    )),
                }
            }
            AcquiredHandle::Temporary(mut handle) => {
                let result = begin_playback(&mut handle, bytes, options);
                if result.is_ok() {
                    state.current = Some(CurrentPlayback::Temporary(handle));
                }
                result
            }
        };

        match result {
            Ok(()) => {
                state.playing = true;
                Ok(())
            }
            Err(e) => {
                state.current = None;
                state.playing = false;
                Err(e)
            }
        }
    }

    /// Fetch synthesized audio, consulting the cache first.
    ///
    /// The fingerprint is the voice plus the first fifty characters of the
    /// text, so two long texts sharing a prefix alias to one cache entry.
    /// That trades exactness for key brevity; the games' texts diverge well
    /// within fifty characters.
    pub async fn request_tts(
        &self,
        text: &str,
        voice: Option<&str>,
        prompt: Option<&str>,
    ) -> Result<Bytes, TtsError> {
        let key = cache_key(voice.unwrap_or(&self.config.default_voice), text);
        if let Some(bytes) = self.state.lock().cache.get(&key) {
            debug!(%key, "synthesis cache hit");
            return Ok(bytes);
        }

        let prompt = prompt.unwrap_or(&self.config.default_prompt);
        let bytes = self.tts.synthesize(text, voice, prompt).await?;
        self.state.lock().cache.insert(key, bytes.clone());
        Ok(bytes)
    }

    /// Speak `text`: fetch (or reuse cached) synthesis, then play it.
    ///
    /// `on_start` fires synchronously before the request goes out; exactly
    /// one of `on_success` / `on_error` fires afterwards. The error is
    /// re-raised after `on_error` so callers without callbacks can still
    /// handle the result.
    pub async fn play_tts(
        &self,
        text: &str,
        voice: Option<&str>,
        prompt: Option<&str>,
        options: &PlaybackOptions,
        mut callbacks: SpeakCallbacks,
    ) -> Result<(), SpeakError> {
        if let Some(on_start) = callbacks.on_start.take() {
            on_start();
        }

        let result = self.speak(text, voice, prompt, options).await;
        match &result {
            Ok(()) => {
                if let Some(on_success) = callbacks.on_success.take() {
                    on_success();
                }
            }
            Err(e) => {
                warn!(error = %e, "TTS playback failed");
                if let Some(on_error) = callbacks.on_error.take() {
                    on_error(e);
                }
            }
        }
        result
    }

    async fn speak(
        &self,
        text: &str,
        voice: Option<&str>,
        prompt: Option<&str>,
        options: &PlaybackOptions,
    ) -> Result<(), SpeakError> {
        let bytes = self.request_tts(text, voice, prompt).await?;
        self.play(&bytes, options)?;
        Ok(())
    }

    /// Store audio under an explicit fingerprint.
    pub fn cache_audio(&self, key: impl Into<String>, bytes: Bytes) {
        self.state.lock().cache.insert(key, bytes);
    }

    /// Look up previously fetched audio. No side effects.
    pub fn cached_audio(&self, key: &str) -> Option<Bytes> {
        self.state.lock().cache.get(key)
    }
}

fn begin_playback(
    handle: &mut PlaybackHandle,
    bytes: &[u8],
    options: &PlaybackOptions,
) -> Result<(), PlaybackError> {
    if let Err(e) = handle.load(bytes) {
        handle.release();
        return Err(e);
    }
    if let Some(volume) = options.volume {
        handle.set_volume(volume);
    }
    if let Err(e) = handle.start() {
        handle.release();
        return Err(e);
    }
    Ok(())
}

/// `"{voice}_{first 50 chars of text}"`, counted in characters so a
/// multi-byte boundary can never split the key.
fn cache_key(voice: &str, text: &str) -> String {
    let truncated: String = text.chars().take(CACHE_KEY_TEXT_CHARS).collect();
    format!("{voice}_{truncated}")
}
