//! Pooled, cached TTS audio playback for the quizvox games
//!
//! Every game shares one [`AudioManager`] that turns "speak this text" into:
//! cache lookup, synthesis request on a miss, then playback through a
//! bounded pool of reusable output channels — with at most one clip audible
//! at a time. The manager is constructed once at startup and handed to each
//! view controller; there is no ambient global.

pub mod cache;
pub mod handle;
pub mod manager;
pub mod output;
pub mod pool;

#[cfg(feature = "playback")]
pub mod rodio_output;


#[cfg(test)]
pub(crate) mod testing;

pub use cache::AudioCache;
pub use handle::{HandleId, HandleState, PlaybackHandle};
pub use manager::{
    AudioManager, AudioManagerConfig, PlaybackOptions, SpeakCallbacks, SpeakError,
};
pub use output::{AudioOutput, OutputChannel, PlaybackError};
pub use pool::{AcquiredHandle, HandlePool};

#[cfg(feature = "playback")]
pub use rodio_output::RodioOutput;
