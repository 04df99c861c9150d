//! Gemini speech synthesis
//!
//! Speech comes back from `generateContent` as base64 raw PCM inside the
//! first candidate part. The sample rate is read from the part's MIME type
//! (`audio/L16;codec=pcm;rate=24000`) and defaults to 24 kHz mono 16-bit.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::TtsConfig;
use crate::error::SpeechError;
use crate::ports::RemoteSynthesizer;
use crate::types::{AudioPayload, PcmSpec};

/// Gemini TTS backend
#[derive(Debug, Clone)]
pub struct GeminiTts {
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [TextPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: [&'static str; 1],
    speech_config: SpeechConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoice<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoice<'a> {
    voice_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct SpeechResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<AudioPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AudioPart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

impl GeminiTts {
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    fn generate_url(config: &TtsConfig) -> String {
        let model = config.model_or_default();
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!(
            "{}/models/{model}:generateContent",
            config.gemini_base_url.trim_end_matches('/')
        )
    }
}

/// Sample layout declared by an `audio/L16;...;rate=N` MIME type
///
/// A missing `rate` means 24 kHz. A rate that does not parse or that no
/// WAV header can carry makes the response invalid.
fn pcm_spec_from_mime(mime: &str) -> Result<PcmSpec, SpeechError> {
    let rate = match mime
        .split(';')
        .find_map(|param| param.trim().strip_prefix("rate="))
    {
        Some(rate) => rate.trim().parse::<u32>().map_err(|_| {
            SpeechError::InvalidResponse(format!("unreadable sample rate in '{mime}'"))
        })?,
        None => PcmSpec::MONO_16BIT_24KHZ.sample_rate_hz,
    };

    let spec = PcmSpec {
        sample_rate_hz: rate,
        ..PcmSpec::MONO_16BIT_24KHZ
    };
    spec.validate()
        .map_err(|e| SpeechError::InvalidResponse(format!("unusable audio '{mime}': {e}")))?;
    Ok(spec)
}

#[async_trait]
impl RemoteSynthesizer for GeminiTts {
    #[instrument(skip(self, text, config), fields(text_len = text.len(), voice = %config.voice_or_default()))]
    async fn synthesize(&self, text: &str, config: &TtsConfig) -> Result<AudioPayload, SpeechError> {
        debug!("Synthesizing speech with Gemini");

        let api_key = config
            .api_key
            .as_ref()
            .filter(|_| config.has_credential())
            .ok_or_else(|| SpeechError::Configuration("no Gemini API key".to_string()))?;

        let request = SpeechRequest {
            contents: [Content {
                parts: [TextPart { text }],
            }],
            generation_config: GenerationConfig {
                response_modalities: ["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoice {
                            voice_name: config.voice_or_default(),
                        },
                    },
                },
            },
        };

        let response = self
            .client
            .post(Self::generate_url(config))
            .query(&[("key", api_key.expose_secret())])
            .timeout(Duration::from_millis(config.timeout_ms))
            .json(&request)
            .send()
            .await
            .map_err(|e| SpeechError::from_transport(&e, config.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SpeechError::SynthesisFailed(format!(
                "HTTP {status}: {error_body}"
            )));
        }

        let body: SpeechResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("body is not a speech response: {e}")))?;

        let inline = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.inline_data)
            .ok_or_else(|| {
                SpeechError::InvalidResponse(
                    "missing `candidates[0].content.parts[0].inlineData`".to_string(),
                )
            })?;

        let samples = STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| SpeechError::AudioProcessing(format!("inline audio is not base64: {e}")))?;

        if samples.is_empty() {
            return Err(SpeechError::InvalidResponse("empty audio data".to_string()));
        }

        let spec = pcm_spec_from_mime(&inline.mime_type)?;
        debug!(audio_size = samples.len(), sample_rate = spec.sample_rate_hz, "Speech synthesis complete");

        Ok(AudioPayload::raw_pcm(samples, spec))
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
