//! Scriptable fakes shared by the unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use quizvox_tts::{TtsClient, TtsError, TtsResult};

use crate::output::{AudioOutput, OutputChannel, PlaybackError};

/// Observable state of one fake channel, shared with the test body.
#[derive(Debug, Default)]
pub struct ChannelProbe {
    pub loads: usize,
    pub starts: usize,
    pub pauses: usize,
    pub clears: usize,
    pub volume: Option<f32>,
    pub has_source: bool,
    pub playing: bool,
    pub paused: bool,
    pub finished: bool,
}

pub struct FakeChannel {
    probe: Arc<Mutex<ChannelProbe>>,
    fail_load: bool,
    fail_start: bool,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self {
            probe: Arc::new(Mutex::new(ChannelProbe::default())),
            fail_load: false,
            fail_start: false,
        }
    }

    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::new()
        }
    }

    pub fn probe(&self) -> Arc<Mutex<ChannelProbe>> {
        self.probe.clone()
    }
}

impl OutputChannel for FakeChannel {
    fn load(&mut self, _bytes: &[u8]) -> Result<(), PlaybackError> {
        if self.fail_load {
            return Err(PlaybackError::Decode("scripted decode failure".into()));
        }
        let mut probe = self.probe.lock();
        probe.loads += 1;
        probe.has_source = true;
        probe.playing = false;
        probe.paused = true;
        probe.finished = false;
        Ok(())
    }

    fn start(&mut self) -> Result<(), PlaybackError> {
        if self.fail_start {
            return Err(PlaybackError::OutputUnavailable(
                "scripted start failure".into(),
            ));
        }
        let mut probe = self.probe.lock();
        probe.starts += 1;
        probe.playing = true;
        probe.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        let mut probe = self.probe.lock();
        probe.pauses += 1;
        probe.paused = true;
        probe.playing = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.probe.lock().volume = Some(volume);
    }

    fn clear(&mut self) {
        let mut probe = self.probe.lock();
        probe.clears += 1;
        probe.has_source = false;
        probe.playing = false;
        probe.finished = false;
    }

    fn has_source(&self) -> bool {
        self.probe.lock().has_source
    }

    fn is_finished(&self) -> bool {
        self.probe.lock().finished
    }

    fn is_paused(&self) -> bool {
        self.probe.lock().paused
    }
}

/// Output backend that records a probe for every channel it opens.
#[derive(Default)]
pub struct FakeOutput {
    probes: Mutex<Vec<Arc<Mutex<ChannelProbe>>>>,
    fail_load: bool,
    fail_start: bool,
}

impl FakeOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    /// Probes for every channel opened so far, in open order.
    pub fn probes(&self) -> Vec<Arc<Mutex<ChannelProbe>>> {
        self.probes.lock().clone()
    }
}

impl AudioOutput for FakeOutput {
    fn open_channel(&self) -> Result<Box<dyn OutputChannel>, PlaybackError> {
        let channel = FakeChannel {
            probe: Arc::new(Mutex::new(ChannelProbe::default())),
            fail_load: self.fail_load,
            fail_start: self.fail_start,
        };
        self.probes.lock().push(channel.probe());
        Ok(Box::new(channel))
    }
}

// Lets tests keep a handle on the output after the manager takes ownership.
impl AudioOutput for Arc<FakeOutput> {
    fn open_channel(&self) -> Result<Box<dyn OutputChannel>, PlaybackError> {
        self.as_ref().open_channel()
    }
}

/// TTS client fake: deterministic payloads derived from the full request,
/// a call counter, scriptable failures, and an event log shared with test
/// callbacks for ordering assertions.
#[derive(Default)]
pub struct FakeTtsClient {
    calls: AtomicUsize,
    fail_remaining: AtomicUsize,
    pub events: Arc<Mutex<Vec<&'static str>>>,
}

impl FakeTtsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next `n` synthesize calls fail with a service error.
    pub fn fail_next(&self, n: usize) {
        self.fail_remaining.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl TtsClient for FakeTtsClient {
    async fn synthesize(&self, text: &str, voice: Option<&str>, prompt: &str) -> TtsResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.events.lock().push("fetch");
        if self
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(TtsError::Service {
                status: 500,
                message: "scripted synthesis failure".into(),
            });
        }
        Ok(Bytes::from(format!(
            "audio|{}|{}|{}",
            voice.unwrap_or("default"),
            prompt,
            text
        )))
    }
}
