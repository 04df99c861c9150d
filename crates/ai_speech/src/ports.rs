//! Port definitions for speech processing
//!
//! Defines the traits (ports) that synthesis, playback and recognition
//! adapters must implement.

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::config::TtsConfig;
use crate::error::SpeechError;
use crate::recognition::RecognitionFault;
use crate::types::{AudioFormat, AudioPayload};

/// Port for remote Text-to-Speech backends
///
/// Implementations turn text into an [`AudioPayload`] over the network. The
/// payload may be a finished container or raw PCM; the dispatcher transcodes
/// as needed before playback.
///
/// # Example
///
/// ```ignore
/// use ai_speech::{RemoteSynthesizer, TtsConfig, TtsProvider};
///
/// async fn fetch(tts: &impl RemoteSynthesizer) -> Result<usize, SpeechError> {
///     let config = TtsConfig::remote(TtsProvider::OpenAi, "sk-...");
///     let audio = tts.synthesize("Good morning", &config).await?;
///     Ok(audio.len())
/// }
/// ```
#[async_trait]
pub trait RemoteSynthesizer: Send + Sync {
    /// Synthesize `text` with the model, voice and key in `config`
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` on transport failures, non-2xx responses and
    /// undecodable bodies.
    async fn synthesize(&self, text: &str, config: &TtsConfig) -> Result<AudioPayload, SpeechError>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

/// Port for the on-device synthesizer
///
/// The last step of every fallback chain. It is assumed to be present; when
/// it fails the error is logged and the utterance is dropped.
#[async_trait]
pub trait LocalSynthesizer: Send + Sync {
    /// Speak `text`, resolving once speech has finished
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the engine cannot be started or exits with
    /// a failure.
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;

    /// Silence any speech in progress
    ///
    /// Must take effect before returning. Calling it while idle does nothing.
    fn stop(&self);
}

/// Port for audio file playback
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Play the file at `path`, resolving once playback has finished
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Playback` if the file cannot be played.
    async fn play(&self, path: &Path, format: AudioFormat) -> Result<(), SpeechError>;

    /// Stop playback in progress
    ///
    /// Must take effect before returning. Calling it while idle does nothing.
    fn stop(&self);
}

/// Port for a speech recognition engine
///
/// One call to [`recognize`](RecognitionEngine::recognize) is one recognition
/// pass: it listens until the engine produces a final result or a fault.
/// The listening controller restarts passes to keep the microphone open.
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Whether recognition is possible on this host at all
    fn is_available(&self) -> bool;

    /// Run one recognition pass
    ///
    /// Interim hypotheses are published with `partial.send_replace(..)`.
    ///
    /// # Errors
    ///
    /// Returns the engine's fault, classified by the caller as recoverable
    /// or fatal.
    async fn recognize(&self, partial: &watch::Sender<String>) -> Result<String, RecognitionFault>;

    /// Tear down the current pass; synchronous, no-op when idle
    fn cancel(&self);
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Mock implementation for testing
    struct MockLocalSynthesizer {
        spoken: parking_lot::Mutex<Vec<String>>,
        stops: AtomicUsize,
    }

    #[async_trait]
    impl LocalSynthesizer for MockLocalSynthesizer {
        async fn speak(&self, text: &str) -> Result<(), SpeechError> {
            self.spoken.lock().push(text.to_string());
            Ok(())
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct MockEngine;

    #[async_trait]
    impl RecognitionEngine for MockEngine {
        fn is_available(&self) -> bool {
            true
        }

        async fn recognize(
            &self,
            partial: &watch::Sender<String>,
        ) -> Result<String, RecognitionFault> {
            partial.send_replace("hel".to_string());
            Ok("hello".to_string())
        }

        fn cancel(&self) {}
    }

    #[tokio::test]
    async fn local_synthesizer_trait_object() {
        let mock = MockLocalSynthesizer {
            spoken: parking_lot::Mutex::new(Vec::new()),
            stops: AtomicUsize::new(0),
        };
        let synth: &dyn LocalSynthesizer = &mock;

        synth.speak("Hello").await.unwrap();
        synth.stop();

        assert_eq!(mock.spoken.lock().as_slice(), ["Hello".to_string()]);
        assert_eq!(mock.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn engine_publishes_partials() {
        let (tx, rx) = watch::channel(String::new());
        let engine: &dyn RecognitionEngine = &MockEngine;

        let text = engine.recognize(&tx).await.unwrap();

        assert_eq!(text, "hello");
        assert_eq!(*rx.borrow(), "hel");
    }
}
