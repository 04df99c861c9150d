//! Voice chat service - one journaling conversation turn at a time

use std::{fmt, sync::Arc, time::Instant};

use ai_core::{CompletionGateway, ProviderSelection};
use ai_speech::RecognitionEvent;
use domain::{Conversation, ConversationTurn};
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::{error::ApplicationError, ports::SpeechOutputPort};

/// Settings for a chat session
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Provider, model and key used for replies
    pub selection: ProviderSelection,
    /// System prompt sent with every completion
    pub system_prompt: String,
    /// Read replies aloud when a speech port is present
    pub speak_replies: bool,
}

/// Sends journal entries to the assistant and optionally speaks the replies
pub struct VoiceChatService {
    gateway: Arc<dyn CompletionGateway>,
    speech: Option<Arc<dyn SpeechOutputPort>>,
    settings: ChatSettings,
    /// Reply currently being read aloud
    speaking: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for VoiceChatService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceChatService")
            .field("provider", &self.settings.selection.provider)
            .field("speak_replies", &self.speaks_replies())
            .finish_non_exhaustive()
    }
}

impl VoiceChatService {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        speech: Option<Arc<dyn SpeechOutputPort>>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            gateway,
            speech,
            settings,
            speaking: Mutex::new(None),
        }
    }

    pub const fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Whether replies will be read aloud
    pub const fn speaks_replies(&self) -> bool {
        self.settings.speak_replies && self.speech.is_some()
    }

    /// Append `user_text` to the transcript and get the assistant's reply
    ///
    /// The whole transcript is sent as context. On failure the user turn
    /// stays in the transcript so it can be retried or edited. A spoken reply
    /// plays in the background; `stop_speaking` interrupts it and
    /// `finish_speaking` waits for it.
    ///
    /// # Errors
    ///
    /// `EmptyMessage` for blank input, `Gateway` when the completion fails.
    #[instrument(skip(self, conversation, user_text), fields(turns = conversation.len(), provider = %self.settings.selection.provider))]
    pub async fn send(
        &self,
        conversation: &mut Conversation,
        user_text: &str,
    ) -> Result<ConversationTurn, ApplicationError> {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return Err(ApplicationError::EmptyMessage);
        }

        conversation.append_user(user_text);

        let start = Instant::now();
        let completion = self
            .gateway
            .complete(
                conversation.turns(),
                &self.settings.selection,
                &self.settings.system_prompt,
            )
            .await
            .inspect_err(|e| warn!(error = %e, "Completion failed"))?;

        debug!(
            model = %completion.model,
            latency_ms = start.elapsed().as_millis(),
            "Reply received"
        );

        let reply = conversation.append_assistant(completion.text).clone();

        if let Some(speech) = self.speech.as_ref().filter(|_| self.settings.speak_replies) {
            let speech = Arc::clone(speech);
            let text = reply.content().to_string();
            let task = tokio::spawn(async move { speech.speak(&text).await });
            // The speech port replaces whatever was still playing
            *self.speaking.lock() = Some(task);
        }

        Ok(reply)
    }

    /// Talk by voice: send each recognized utterance until listening ends
    ///
    /// `on_turn` sees every outcome of `send`, so a failed completion is
    /// reported without ending the session. Returns the number of replies
    /// when the stream ends because listening was stopped.
    ///
    /// # Errors
    ///
    /// `Listening` with the fault that ended the session.
    #[instrument(skip_all, fields(provider = %self.settings.selection.provider))]
    pub async fn converse_by_voice<S, F>(
        &self,
        conversation: &mut Conversation,
        mut utterances: S,
        mut on_turn: F,
    ) -> Result<usize, ApplicationError>
    where
        S: Stream<Item = RecognitionEvent> + Unpin,
        F: FnMut(&Result<ConversationTurn, ApplicationError>),
    {
        let mut replies = 0;

        while let Some(event) = utterances.next().await {
            match event {
                RecognitionEvent::Utterance(text) => {
                    debug!(text_len = text.len(), "Utterance recognized");
                    let outcome = self.send(conversation, &text).await;
                    if outcome.is_ok() {
                        replies += 1;
                    }
                    on_turn(&outcome);
                },
                RecognitionEvent::RecoverableFault(fault) => {
                    debug!(%fault, "Listening pass restarted");
                },
                RecognitionEvent::FatalFault(fault) => {
                    warn!(%fault, replies, "Listening ended");
                    return Err(ApplicationError::Listening(fault));
                },
            }
        }

        info!(replies, "Voice conversation stopped");
        Ok(replies)
    }

    /// Interrupt a reply being spoken
    pub fn stop_speaking(&self) {
        if let Some(speech) = &self.speech {
            speech.stop();
        }
    }

    /// Wait until the reply being spoken has finished or was stopped
    pub async fn finish_speaking(&self) {
        let task = self.speaking.lock().take();
        let Some(task) = task else {
            return;
        };
        if let Err(e) = task.await {
            warn!(error = %e, "Speech task ended abnormally");
        }
    }

    /// Start a fresh transcript, silencing any reply in progress
    pub fn reset(&self, conversation: &mut Conversation) {
        self.stop_speaking();
        conversation.clear();
    }
}
