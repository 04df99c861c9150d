//! AI Speech - voice output and continuous listening for Journal Voice
//!
//! Provides:
//! - `TtsDispatcher` - speaks replies through a remote TTS backend, falling
//!   back to the on-device synthesizer
//! - `transcoder` - wraps raw PCM in a WAV container for playback
//! - `SpeechInputController` - keeps a recognition engine listening and
//!   streams final utterances
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports)
//! - `providers` module contains concrete implementations (adapters)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ai_speech::{CommandPlayer, CommandSynthesizer, LocalAudioConfig, TtsConfig, TtsDispatcher};
//!
//! let audio = LocalAudioConfig::default();
//! let dispatcher = TtsDispatcher::new(
//!     Arc::new(CommandSynthesizer::from_config(&audio)),
//!     Arc::new(CommandPlayer::from_config(&audio)),
//! )?;
//!
//! dispatcher.speak("Entry saved.", &TtsConfig::default()).await;
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ports;
pub mod providers;
pub mod recognition;
pub mod transcoder;
pub mod types;

pub use config::{
    ListeningConfig, LocalAudioConfig, RemoteBackend, SynthesisStep, TtsConfig, TtsProvider,
};
pub use dispatcher::{SpeechOutcome, TtsDispatcher};
pub use error::SpeechError;
pub use ports::{AudioPlayer, LocalSynthesizer, RecognitionEngine, RemoteSynthesizer};
pub use providers::{CommandPlayer, CommandSynthesizer, GeminiTts, OpenAiTts};
pub use recognition::{
    CallbackEngine, PlatformRecognizer, RecognitionEvent, RecognitionFault, RecognitionStream,
    SignalSender, SpeechInputController,
};
pub use types::{AudioEncoding, AudioFormat, AudioPayload, PcmSpec};
