//! Speech adapter - Implements SpeechOutputPort using the TTS dispatcher

use std::fmt;
use std::sync::Arc;

use ai_speech::{CommandPlayer, CommandSynthesizer, SpeechError, TtsConfig, TtsDispatcher};
use application::ports::SpeechOutputPort;
use async_trait::async_trait;
use tracing::debug;

use crate::config::AppConfig;

/// A dispatcher bound to one speech configuration
pub struct ConfiguredSpeech {
    dispatcher: Arc<TtsDispatcher>,
    config: TtsConfig,
}

impl fmt::Debug for ConfiguredSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredSpeech")
            .field("provider", &self.config.provider)
            .finish_non_exhaustive()
    }
}

impl ConfiguredSpeech {
    pub const fn new(dispatcher: Arc<TtsDispatcher>, config: TtsConfig) -> Self {
        Self { dispatcher, config }
    }

    pub fn dispatcher(&self) -> &Arc<TtsDispatcher> {
        &self.dispatcher
    }

    pub const fn config(&self) -> &TtsConfig {
        &self.config
    }
}

#[async_trait]
impl SpeechOutputPort for ConfiguredSpeech {
    async fn speak(&self, text: &str) {
        let outcome = self.dispatcher.speak(text, &self.config).await;
        debug!(?outcome, "Reply spoken");
    }

    fn stop(&self) {
        self.dispatcher.stop();
    }
}

/// Speech output using the system synthesizer and player from `[audio]`
pub fn build_speech(config: &AppConfig) -> Result<ConfiguredSpeech, SpeechError> {
    let dispatcher = TtsDispatcher::new(
        Arc::new(CommandSynthesizer::from_config(&config.audio)),
        Arc::new(CommandPlayer::from_config(&config.audio)),
    )?;
    Ok(ConfiguredSpeech::new(
        Arc::new(dispatcher),
        config.to_tts_config(),
    ))
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ai_speech::{AudioFormat, AudioPlayer, LocalSynthesizer, TtsProvider};

    use super::*;

    #[derive(Default)]
    struct CountingSynth {
        spoken: AtomicUsize,
        stops: AtomicUsize,
    }

    #[async_trait]
    impl LocalSynthesizer for CountingSynth {
        async fn speak(&self, _text: &str) -> Result<(), SpeechError> {
            self.spoken.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct SilentPlayer;

    #[async_trait]
    impl AudioPlayer for SilentPlayer {
        async fn play(&self, _path: &Path, _format: AudioFormat) -> Result<(), SpeechError> {
            Ok(())
        }

        fn stop(&self) {}
    }

    #[tokio::test]
    async fn speaks_through_dispatcher_with_bound_config() {
        let synth = Arc::new(CountingSynth::default());
        let dispatcher = TtsDispatcher::new(
            Arc::clone(&synth) as Arc<dyn LocalSynthesizer>,
            Arc::new(SilentPlayer),
        )
        .unwrap();
        // no key: the OpenAI step is skipped and local speech takes over
        let config = TtsConfig {
            provider: TtsProvider::OpenAi,
            ..TtsConfig::default()
        };
        let speech = ConfiguredSpeech::new(Arc::new(dispatcher), config);

        speech.speak("Saved.").await;

        assert_eq!(synth.spoken.load(Ordering::SeqCst), 1);
        assert_eq!(speech.config().provider, TtsProvider::OpenAi);
    }

    #[test]
    fn build_speech_uses_configured_provider() {
        let mut config = AppConfig::default();
        config.speech.provider = TtsProvider::Gemini;

        let speech = build_speech(&config).unwrap();

        assert_eq!(speech.config().provider, TtsProvider::Gemini);
        assert!(!speech.dispatcher().is_speaking());
        assert!(format!("{speech:?}").contains("Gemini"));
    }
}
