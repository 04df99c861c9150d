//! OpenAI speech synthesis
//!
//! `POST {base}/audio/speech` with a bearer key. The response body is the
//! encoded audio itself, requested as MP3.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::TtsConfig;
use crate::error::SpeechError;
use crate::ports::RemoteSynthesizer;
use crate::types::{AudioFormat, AudioPayload};

/// OpenAI TTS rejects inputs above this many characters
const MAX_INPUT_CHARS: usize = 4096;

/// OpenAI TTS backend
#[derive(Debug, Clone)]
pub struct OpenAiTts {
    client: Client,
}

/// OpenAI TTS request body
#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

/// OpenAI API error response
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiTts {
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    fn tts_url(config: &TtsConfig) -> String {
        format!("{}/audio/speech", config.openai_base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RemoteSynthesizer for OpenAiTts {
    #[instrument(skip(self, text, config), fields(text_len = text.len(), voice = %config.voice_or_default()))]
    async fn synthesize(&self, text: &str, config: &TtsConfig) -> Result<AudioPayload, SpeechError> {
        debug!("Synthesizing speech with OpenAI TTS");

        let api_key = config
            .api_key
            .as_ref()
            .filter(|_| config.has_credential())
            .ok_or_else(|| SpeechError::Configuration("no OpenAI API key".to_string()))?;

        let char_count = text.chars().count();
        if char_count > MAX_INPUT_CHARS {
            return Err(SpeechError::SynthesisFailed(format!(
                "Text too long: {char_count} characters exceeds {MAX_INPUT_CHARS} limit"
            )));
        }

        let request = TtsRequest {
            model: config.model_or_default(),
            input: text,
            voice: config.voice_or_default(),
            response_format: AudioFormat::Mp3.extension(),
        };

        let response = self
            .client
            .post(Self::tts_url(config))
            .bearer_auth(api_key.expose_secret())
            .timeout(Duration::from_millis(config.timeout_ms))
            .json(&request)
            .send()
            .await
            .map_err(|e| SpeechError::from_transport(&e, config.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_body) {
                return Err(SpeechError::SynthesisFailed(format!(
                    "HTTP {status}: {}",
                    api_error.error.message
                )));
            }

            return Err(SpeechError::SynthesisFailed(format!(
                "HTTP {status}: {error_body}"
            )));
        }

        // Trust the declared container when it is one we know
        let format = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(AudioFormat::from_mime_type)
            .unwrap_or(AudioFormat::Mp3);

        let audio_bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to read audio: {e}")))?;

        if audio_bytes.is_empty() {
            return Err(SpeechError::InvalidResponse("empty audio body".to_string()));
        }

        debug!(audio_size = audio_bytes.len(), %format, "Speech synthesis complete");

        Ok(AudioPayload::container(audio_bytes, format))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
