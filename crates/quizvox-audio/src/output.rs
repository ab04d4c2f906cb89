//! Audio output seam
//!
//! [`AudioOutput`] opens output channels; an [`OutputChannel`] is one
//! channel able to hold and play a decoded byte buffer. Production code
//! uses the rodio backend behind the `playback` feature; tests plug in a
//! scriptable fake.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The audio device or output stream could not be opened.
    #[error("audio output unavailable: {0}")]
    OutputUnavailable(String),

    /// The fetched bytes could not be decoded as audio.
    #[error("could not decode audio: {0}")]
    Decode(String),

    /// Playback was started without a loaded source.
    #[error("no audio source loaded")]
    NoSource,
}

/// One audio output channel.
///
/// A channel is loaded with a new source each time it is reused; the pool
/// clears the source between uses so an idle channel holds no live buffer.
pub trait OutputChannel: Send {
    /// Decode `bytes` and assign them as the channel's source, replacing
    /// whatever was loaded before. The channel stays silent until
    /// [`start`](Self::start).
    fn load(&mut self, bytes: &[u8]) -> Result<(), PlaybackError>;

    /// Begin playback of the loaded source.
    fn start(&mut self) -> Result<(), PlaybackError>;

    /// Pause playback, keeping the source.
    fn pause(&mut self);

    /// Playback volume in `[0.0, 1.0]`.
    fn set_volume(&mut self, volume: f32);

    /// Drop the assigned source and rewind. Idempotent.
    fn clear(&mut self);

    /// A source is currently assigned.
    fn has_source(&self) -> bool;

    /// The assigned source has played to the end.
    fn is_finished(&self) -> bool;

    /// Playback is paused (or was never started).
    fn is_paused(&self) -> bool;
}

/// Factory for output channels, implemented per audio backend.
pub trait AudioOutput: Send + Sync {
    fn open_channel(&self) -> Result<Box<dyn OutputChannel>, PlaybackError>;
}
