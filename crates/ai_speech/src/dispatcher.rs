//! Text-to-speech dispatch
//!
//! [`TtsDispatcher::speak`] walks the configured provider's fallback chain
//! until one step produces sound. Remote audio is transcoded when needed,
//! written to a temporary file and handed to the [`AudioPlayer`]. The local
//! synthesizer ends every chain, so a reply is never silently dropped unless
//! the device itself cannot speak.
//!
//! One utterance plays at a time per dispatcher. Starting a new one stops
//! the current one first.

use std::fmt;
use std::io::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::Client;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::{RemoteBackend, SynthesisStep, TtsConfig};
use crate::error::SpeechError;
use crate::ports::{AudioPlayer, LocalSynthesizer, RemoteSynthesizer};
use crate::providers::{GeminiTts, OpenAiTts};
use crate::transcoder;
use crate::types::AudioFormat;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How a `speak` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// Played audio from a remote backend
    Remote(RemoteBackend),
    /// Spoken by the local synthesizer
    Local,
    /// Every step failed, including the local synthesizer
    Silent,
    /// Nothing to say
    Skipped,
    /// Stopped by `stop` or a newer utterance
    Interrupted,
}

#[derive(Debug)]
struct Playback {
    id: u64,
    cancel: CancellationToken,
}

/// The single utterance a dispatcher may be playing
#[derive(Debug, Default)]
struct PlaybackSlot {
    current: Mutex<Option<Playback>>,
    next_id: AtomicU64,
}

impl PlaybackSlot {
    /// Clear the slot if `id` still occupies it
    fn release(&self, id: u64) {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|p| p.id == id) {
            current.take();
        }
    }
}

/// Frees the playback slot when a `speak` call ends or its future is dropped
struct ReleaseOnDrop<'a> {
    slot: &'a PlaybackSlot,
    id: u64,
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.slot.release(self.id);
    }
}

/// Routes replies to a speech backend and plays them
pub struct TtsDispatcher {
    openai: OpenAiTts,
    gemini: GeminiTts,
    local: Arc<dyn LocalSynthesizer>,
    player: Arc<dyn AudioPlayer>,
    playback: PlaybackSlot,
}

impl fmt::Debug for TtsDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtsDispatcher")
            .field("speaking", &self.is_speaking())
            .finish_non_exhaustive()
    }
}

impl TtsDispatcher {
    /// Create a dispatcher over the given local synthesizer and player
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the HTTP client cannot be built.
    pub fn new(
        local: Arc<dyn LocalSynthesizer>,
        player: Arc<dyn AudioPlayer>,
    ) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            openai: OpenAiTts::new(client.clone()),
            gemini: GeminiTts::new(client),
            local,
            player,
            playback: PlaybackSlot::default(),
        })
    }

    /// Speak `text` with the configured provider, falling back along its chain
    ///
    /// Never fails: every error is logged and the next step is tried.
    #[instrument(skip(self, text, config), fields(provider = %config.provider, text_len = text.len()))]
    pub async fn speak(&self, text: &str, config: &TtsConfig) -> SpeechOutcome {
        let text = text.trim();
        if text.is_empty() {
            debug!("Nothing to speak");
            return SpeechOutcome::Skipped;
        }

        let (id, cancel) = self.begin_playback();
        let release = ReleaseOnDrop {
            slot: &self.playback,
            id,
        };

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => SpeechOutcome::Interrupted,
            outcome = self.run_chain(text, config) => outcome,
        };

        drop(release);
        debug!(?outcome, "Speech finished");
        outcome
    }

    /// Stop whatever is playing; returns once the backends were told to stop
    pub fn stop(&self) {
        let stopped = self.playback.current.lock().take();
        if let Some(playback) = stopped {
            info!(playback = playback.id, "Stopping speech");
            self.halt(&playback);
        }
    }

    /// Whether an utterance is in progress
    pub fn is_speaking(&self) -> bool {
        self.playback.current.lock().is_some()
    }

    fn begin_playback(&self) -> (u64, CancellationToken) {
        let id = self.playback.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();

        let mut current = self.playback.current.lock();
        if let Some(previous) = current.take() {
            debug!(playback = previous.id, "Pre-empting previous utterance");
            self.halt(&previous);
        }
        *current = Some(Playback {
            id,
            cancel: cancel.clone(),
        });

        (id, cancel)
    }

    fn halt(&self, playback: &Playback) {
        playback.cancel.cancel();
        self.player.stop();
        self.local.stop();
    }

    async fn run_chain(&self, text: &str, config: &TtsConfig) -> SpeechOutcome {
        for step in config.provider.fallback_chain() {
            match *step {
                SynthesisStep::Remote(backend) => {
                    match self.speak_remote(backend, text, config).await {
                        Ok(()) => return SpeechOutcome::Remote(backend),
                        Err(e) => {
                            warn!(%backend, error = %e, "Remote speech failed, falling back");
                        },
                    }
                },
                SynthesisStep::Local => {
                    return match self.local.speak(text).await {
                        Ok(()) => SpeechOutcome::Local,
                        Err(e) => {
                            warn!(error = %e, "Local speech failed, dropping utterance");
                            SpeechOutcome::Silent
                        },
                    };
                },
            }
        }
        SpeechOutcome::Silent
    }

    fn remote(&self, backend: RemoteBackend) -> Option<&dyn RemoteSynthesizer> {
        match backend {
            RemoteBackend::OpenAi => Some(&self.openai as &dyn RemoteSynthesizer),
            RemoteBackend::Gemini => Some(&self.gemini as &dyn RemoteSynthesizer),
            RemoteBackend::Unavailable(_) => None,
        }
    }

    async fn speak_remote(
        &self,
        backend: RemoteBackend,
        text: &str,
        config: &TtsConfig,
    ) -> Result<(), SpeechError> {
        let synthesizer = self.remote(backend).ok_or_else(|| {
            SpeechError::NotAvailable(format!("{} speech has no backend", config.provider))
        })?;

        if !config.has_credential() {
            return Err(SpeechError::Configuration(format!(
                "no API key for {} speech",
                synthesizer.name()
            )));
        }

        let payload = synthesizer.synthesize(text, config).await?;
        let format = transcoder::playable_format(&payload);
        let audio_file = write_temp_audio(transcoder::to_playable(&payload), format).await?;

        debug!(path = %audio_file.path().display(), %format, "Playing remote audio");
        // audio_file is deleted when this returns or the future is dropped
        self.player.play(audio_file.path(), format).await
    }
}

/// Write playable audio to a temporary file named with the format's extension
async fn write_temp_audio(audio: Bytes, format: AudioFormat) -> Result<NamedTempFile, SpeechError> {
    tokio::task::spawn_blocking(move || {
        let mut file = tempfile::Builder::new()
            .prefix("journal-voice-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile()?;
        file.write_all(&audio)?;
        file.flush()?;
        Ok::<_, std::io::Error>(file)
    })
    .await
    .map_err(|e| SpeechError::AudioProcessing(format!("temp file task failed: {e}")))?
    .map_err(|e| SpeechError::AudioProcessing(format!("Failed to write temp audio: {e}")))
}
