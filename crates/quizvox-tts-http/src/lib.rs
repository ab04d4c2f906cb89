//! HTTP TTS client for the quizvox game server
//!
//! Talks to the server's synthesis endpoints: `/api/generate-tts` for the
//! default voice and `/api/test-voice` when the caller picked an explicit
//! voice. Both take a JSON `{text, voice, prompt}` body and answer with the
//! raw encoded audio on success.

use async_trait::async_trait;
use bytes::Bytes;
use quizvox_tts::{TtsClient, TtsError, TtsResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};


const GENERATE_PATH: &str = "/api/generate-tts";
const TEST_VOICE_PATH: &str = "/api/test-voice";

#[derive(Serialize)]
struct SynthesisBody<'a> {
    text: &'a str,
    voice: Option<&'a str>,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

/// [`TtsClient`] backed by the game server's HTTP synthesis endpoints.
pub struct HttpTtsClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpTtsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Build with a caller-provided `reqwest` client (custom timeouts,
    /// proxies, connection pools).
    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, http }
    }

    /// An explicit voice goes through the voice-test endpoint; everything
    /// else through plain generation. Callers rely on this routing to get
    /// voice-specific versus default-voice synthesis.
    fn endpoint(&self, voice: Option<&str>) -> String {
        let path = if voice.is_some() {
            TEST_VOICE_PATH
        } else {
            GENERATE_PATH
        };
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl TtsClient for HttpTtsClient {
    async fn synthesize(&self, text: &str, voice: Option<&str>, prompt: &str) -> TtsResult<Bytes> {
        let url = self.endpoint(voice);
        debug!(%url, text_len = text.len(), "requesting speech synthesis");

        let response = self
            .http
            .post(&url)
            .json(&SynthesisBody {
                text,
                voice,
                prompt,
            })
            .send()
            .await
            .map_err(|e| TtsError::Transport(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| TtsError::Transport(e.to_string()))?;

        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "synthesis request failed");
            return Err(service_error(status, &body));
        }

        // The voice-test endpoint answers 2xx with a JSON `{message}` body
        // when it could not produce audio for the requested voice.
        if content_type.starts_with("application/json") {
            return Err(TtsError::NoAudio(fallback_message(&body)));
        }

        debug!(%url, bytes = body.len(), "synthesis succeeded");
        Ok(body)
    }
}

/// Map a non-success response to a service error, preferring the JSON
/// `{message}` body when the server sent one. Error bodies are not always
/// JSON, so a parse failure falls back to the HTTP status reason.
fn service_error(status: StatusCode, body: &[u8]) -> TtsError {
    let message = match serde_json::from_slice::<MessageBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    TtsError::Service {
        status: status.as_u16(),
        message,
    }
}

fn fallback_message(body: &[u8]) -> String {
    serde_json::from_slice::<MessageBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| "service returned no audio".to_string())
}
