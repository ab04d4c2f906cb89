//! Text-to-speech client abstraction for quizvox
//!
//! This crate defines the interface the games use to obtain synthesized
//! speech, independent of how the audio is produced. The shipped
//! implementation talks to the game server over HTTP (`quizvox-tts-http`);
//! tests plug in fakes.

pub mod client;
pub mod error;

pub use client::{TtsClient, DEFAULT_PROMPT, DEFAULT_VOICE};
pub use error::{TtsError, TtsResult};
