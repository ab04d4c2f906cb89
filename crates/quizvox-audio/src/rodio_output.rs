//! rodio-backed audio output
//!
//! `rodio::OutputStream` is `!Send` on some platforms, so the stream lives
//! on a dedicated OS thread for the life of the output. Sinks created from
//! the stream handle are freely shareable, which is all the channels need.

use std::io::Cursor;
use std::sync::mpsc;
use std::thread;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::info;

use crate::output::{AudioOutput, OutputChannel, PlaybackError};

pub struct RodioOutput {
    stream_handle: OutputStreamHandle,
    // Dropping this sender lets the keeper thread exit.
    _shutdown_tx: mpsc::Sender<()>,
}

impl RodioOutput {
    /// Open the default output device.
    pub fn new() -> Result<Self, PlaybackError> {
        let (init_tx, init_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("quizvox-audio-output".into())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    if init_tx.send(Ok(handle)).is_err() {
                        return;
                    }
                    // Keep the stream alive until the output is dropped.
                    let _stream = stream;
                    let _ = shutdown_rx.recv();
                }
                Err(e) => {
                    let _ = init_tx.send(Err(PlaybackError::OutputUnavailable(e.to_string())));
                }
            })
            .map_err(|e| {
                PlaybackError::OutputUnavailable(format!("failed to spawn audio thread: {e}"))
            })?;

        let stream_handle = init_rx
            .recv()
            .map_err(|_| PlaybackError::OutputUnavailable("audio thread died during init".into()))??;

        info!("audio output initialized on default device");
        Ok(Self {
            stream_handle,
            _shutdown_tx: shutdown_tx,
        })
    }
}

impl AudioOutput for RodioOutput {
    fn open_channel(&self) -> Result<Box<dyn OutputChannel>, PlaybackError> {
        Ok(Box::new(RodioChannel {
            stream_handle: self.stream_handle.clone(),
            sink: None,
        }))
    }
}

struct RodioChannel {
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
}

impl OutputChannel for RodioChannel {
    fn load(&mut self, bytes: &[u8]) -> Result<(), PlaybackError> {
        let source =
            Decoder::new(Cursor::new(bytes.to_vec())).map_err(|e| PlaybackError::Decode(e.to_string()))?;
        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| PlaybackError::OutputUnavailable(e.to_string()))?;
        // Queue paused; the handle starts playback explicitly.
        sink.pause();
        sink.append(source);
        self.sink = Some(sink);
        Ok(())
    }

    fn start(&mut self) -> Result<(), PlaybackError> {
        match &self.sink {
            Some(sink) => {
                sink.play();
                Ok(())
            }
            None => Err(PlaybackError::NoSource),
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn clear(&mut self) {
        // Dropping the sink stops playback and frees the decoded source.
        self.sink = None;
    }

    fn has_source(&self) -> bool {
        self.sink.is_some()
    }

    fn is_finished(&self) -> bool {
        self.sink.as_ref().map_or(false, Sink::empty)
    }

    fn is_paused(&self) -> bool {
        self.sink.as_ref().map_or(true, Sink::is_paused)
    }
}
