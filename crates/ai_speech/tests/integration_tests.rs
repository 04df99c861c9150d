//! Integration tests for ai_speech crate
//!
//! Tests the speak flow end to end with mocked TTS APIs and recording
//! local adapters.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ai_speech::{
    AudioFormat, AudioPlayer, LocalSynthesizer, RemoteBackend, SpeechError, SpeechOutcome,
    TtsConfig, TtsDispatcher, TtsProvider,
};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use parking_lot::Mutex;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingSynth {
    spoken: Mutex<Vec<String>>,
    stops: AtomicUsize,
}

#[async_trait]
impl LocalSynthesizer for RecordingSynth {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        self.spoken.lock().push(text.to_string());
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
struct PlayedFile {
    path: PathBuf,
    format: AudioFormat,
    bytes: Vec<u8>,
}

/// Player that records what it was handed; with `hold` it never finishes,
/// with `fail` it reports a playback error after reading the file
#[derive(Default)]
struct RecordingPlayer {
    played: Mutex<Vec<PlayedFile>>,
    stops: AtomicUsize,
    hold: bool,
    fail: bool,
}

#[async_trait]
impl AudioPlayer for RecordingPlayer {
    async fn play(&self, path: &Path, format: AudioFormat) -> Result<(), SpeechError> {
        let bytes = std::fs::read(path).map_err(|e| SpeechError::Playback(e.to_string()))?;
        self.played.lock().push(PlayedFile {
            path: path.to_path_buf(),
            format,
            bytes,
        });
        if self.fail {
            return Err(SpeechError::Playback("device busy".to_string()));
        }
        if self.hold {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    synth: Arc<RecordingSynth>,
    player: Arc<RecordingPlayer>,
    dispatcher: Arc<TtsDispatcher>,
}

fn harness(player: RecordingPlayer) -> Harness {
    let synth = Arc::new(RecordingSynth::default());
    let player = Arc::new(player);
    let dispatcher = TtsDispatcher::new(
        Arc::clone(&synth) as Arc<dyn LocalSynthesizer>,
        Arc::clone(&player) as Arc<dyn AudioPlayer>,
    )
    .unwrap();
    Harness {
        synth,
        player,
        dispatcher: Arc::new(dispatcher),
    }
}

/// Minimal MP3 frame header plus padding
fn mock_mp3_audio() -> Vec<u8> {
    vec![0xFF, 0xFB, 0x90, 0x00, 0x00, 0x00, 0x00, 0x00]
}

fn gemini_body(samples: &[u8]) -> serde_json::Value {
    gemini_body_with_mime(samples, "audio/L16;codec=pcm;rate=24000")
}

fn gemini_body_with_mime(samples: &[u8], mime: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {
                "parts": [{
                    "inlineData": {
                        "mimeType": mime,
                        "data": STANDARD.encode(samples)
                    }
                }]
            }
        }]
    })
}

async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

// ============ Remote playback ============

#[tokio::test]
async fn openai_audio_is_played_as_mp3_and_cleaned_up() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .and(header("Authorization", "Bearer sk-tts"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(mock_mp3_audio()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(RecordingPlayer::default());
    let config = TtsConfig::remote(TtsProvider::OpenAi, "sk-tts").with_base_url(mock_server.uri());

    let outcome = h.dispatcher.speak("Entry saved.", &config).await;

    assert_eq!(outcome, SpeechOutcome::Remote(RemoteBackend::OpenAi));
    let played = h.player.played.lock().clone();
    assert_eq!(played.len(), 1);
    assert_eq!(played[0].format, AudioFormat::Mp3);
    assert_eq!(played[0].bytes, mock_mp3_audio());
    assert_eq!(
        played[0].path.extension().and_then(|e| e.to_str()),
        Some("mp3")
    );
    assert!(!played[0].path.exists());
    assert!(h.synth.spoken.lock().is_empty());
}

#[tokio::test]
async fn gemini_pcm_is_wrapped_in_wav() {
    let mock_server = MockServer::start().await;
    let samples: Vec<u8> = (0..=255).collect();

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash-preview-tts:generateContent"))
        .and(query_param("key", "g-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(&samples)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(RecordingPlayer::default());
    let config = TtsConfig::remote(TtsProvider::Gemini, "g-key").with_base_url(mock_server.uri());

    let outcome = h.dispatcher.speak("Good evening", &config).await;

    assert_eq!(outcome, SpeechOutcome::Remote(RemoteBackend::Gemini));
    let played = h.player.played.lock().clone();
    assert_eq!(played.len(), 1);
    let wav = &played[0].bytes;
    assert_eq!(played[0].format, AudioFormat::Wav);
    assert_eq!(wav.len(), 44 + samples.len());
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");
    assert_eq!(&wav[44..], &samples[..]);
    assert!(!played[0].path.exists());
}

// ============ Fallback ============

#[tokio::test]
async fn remote_error_falls_back_to_local() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(RecordingPlayer::default());
    let config = TtsConfig::remote(TtsProvider::OpenAi, "sk-tts").with_base_url(mock_server.uri());

    let outcome = h.dispatcher.speak("Fallback please", &config).await;

    assert_eq!(outcome, SpeechOutcome::Local);
    assert_eq!(h.synth.spoken.lock().as_slice(), ["Fallback please".to_string()]);
    assert!(h.player.played.lock().is_empty());
}

#[tokio::test]
async fn undecodable_gemini_response_falls_back_to_local() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(RecordingPlayer::default());
    let config = TtsConfig::remote(TtsProvider::Gemini, "g-key").with_base_url(mock_server.uri());

    assert_eq!(h.dispatcher.speak("hi", &config).await, SpeechOutcome::Local);
}

#[tokio::test]
async fn oversized_gemini_sample_rate_falls_back_to_local() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body_with_mime(
            &[0, 1, 2, 3],
            "audio/L16;codec=pcm;rate=4000000000",
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(RecordingPlayer::default());
    let config = TtsConfig::remote(TtsProvider::Gemini, "g-key").with_base_url(mock_server.uri());

    let outcome = h.dispatcher.speak("hi", &config).await;

    assert_eq!(outcome, SpeechOutcome::Local);
    assert_eq!(h.synth.spoken.lock().as_slice(), ["hi".to_string()]);
    assert!(h.player.played.lock().is_empty());
}

#[tokio::test]
async fn playback_error_cleans_up_and_falls_back() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mock_mp3_audio()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(RecordingPlayer {
        fail: true,
        ..Default::default()
    });
    let config = TtsConfig::remote(TtsProvider::OpenAi, "sk-tts").with_base_url(mock_server.uri());

    let outcome = h.dispatcher.speak("Speaker unplugged", &config).await;

    assert_eq!(outcome, SpeechOutcome::Local);
    let played = h.player.played.lock().clone();
    assert_eq!(played.len(), 1);
    assert!(!played[0].path.exists());
    assert_eq!(h.synth.spoken.lock().as_slice(), ["Speaker unplugged".to_string()]);
    assert!(!h.dispatcher.is_speaking());
}

#[tokio::test]
async fn blank_credential_never_touches_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mock_mp3_audio()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let h = harness(RecordingPlayer::default());
    let config = TtsConfig::remote(TtsProvider::OpenAi, "").with_base_url(mock_server.uri());

    let outcome = h.dispatcher.speak("Offline entry", &config).await;

    assert_eq!(outcome, SpeechOutcome::Local);
    assert_eq!(h.synth.spoken.lock().as_slice(), ["Offline entry".to_string()]);
}

#[tokio::test]
async fn azure_slot_speaks_locally_without_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let h = harness(RecordingPlayer::default());
    let mut config = TtsConfig::remote(TtsProvider::Azure, "azure-key").with_base_url(mock_server.uri());
    config.region = Some("westeurope".to_string());

    let outcome = h.dispatcher.speak("Hello from Azure", &config).await;

    assert_eq!(outcome, SpeechOutcome::Local);
    assert_eq!(h.synth.spoken.lock().as_slice(), ["Hello from Azure".to_string()]);
}

// ============ Serialization ============

#[tokio::test]
async fn new_utterance_preempts_current_one() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mock_mp3_audio()))
        .mount(&mock_server)
        .await;

    let h = harness(RecordingPlayer {
        hold: true,
        ..Default::default()
    });
    let config = TtsConfig::remote(TtsProvider::OpenAi, "sk-tts").with_base_url(mock_server.uri());

    let first = {
        let dispatcher = Arc::clone(&h.dispatcher);
        let config = config.clone();
        tokio::spawn(async move { dispatcher.speak("first reply", &config).await })
    };

    let player = Arc::clone(&h.player);
    wait_until(|| !player.played.lock().is_empty()).await;
    let first_file = h.player.played.lock()[0].path.clone();
    assert!(h.dispatcher.is_speaking());

    // Local provider so the second utterance completes
    let second = h.dispatcher.speak("second reply", &TtsConfig::default()).await;

    assert_eq!(second, SpeechOutcome::Local);
    assert_eq!(first.await.unwrap(), SpeechOutcome::Interrupted);
    assert_eq!(h.player.stops.load(Ordering::SeqCst), 1);
    assert_eq!(h.synth.stops.load(Ordering::SeqCst), 1);
    assert!(!first_file.exists());
    assert!(!h.dispatcher.is_speaking());
}

#[tokio::test]
async fn stop_interrupts_playback_and_is_idempotent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mock_mp3_audio()))
        .mount(&mock_server)
        .await;

    let h = harness(RecordingPlayer {
        hold: true,
        ..Default::default()
    });
    let config = TtsConfig::remote(TtsProvider::OpenAi, "sk-tts").with_base_url(mock_server.uri());

    let speaking = {
        let dispatcher = Arc::clone(&h.dispatcher);
        tokio::spawn(async move { dispatcher.speak("a long reply", &config).await })
    };

    let player = Arc::clone(&h.player);
    wait_until(|| !player.played.lock().is_empty()).await;

    h.dispatcher.stop();
    h.dispatcher.stop();

    assert!(!h.dispatcher.is_speaking());
    assert_eq!(h.player.stops.load(Ordering::SeqCst), 1);
    assert_eq!(speaking.await.unwrap(), SpeechOutcome::Interrupted);
}

#[tokio::test]
async fn dropped_speak_future_frees_the_slot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mock_mp3_audio()))
        .mount(&mock_server)
        .await;

    let h = harness(RecordingPlayer {
        hold: true,
        ..Default::default()
    });
    let config = TtsConfig::remote(TtsProvider::OpenAi, "sk-tts").with_base_url(mock_server.uri());

    let player = Arc::clone(&h.player);
    let speaking = h.dispatcher.speak("cut short", &config);
    let timed_out = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::select! {
            _ = speaking => unreachable!("held playback finished"),
            () = wait_until(|| !player.played.lock().is_empty()) => {},
        }
    })
    .await;

    assert!(timed_out.is_ok());
    assert!(!h.dispatcher.is_speaking());
    let played = h.player.played.lock().clone();
    assert!(!played[0].path.exists());
}
