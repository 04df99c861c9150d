//! Application-level errors

use ai_core::GatewayError;
use ai_speech::RecognitionFault;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The user submitted nothing to send
    #[error("Message is empty")]
    EmptyMessage,

    /// Completion request failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Voice input ended with a fault
    #[error("Listening stopped: {0}")]
    Listening(RecognitionFault),
}

impl ApplicationError {
    /// The user has to add or fix an API key before chatting
    pub const fn needs_configuration(&self) -> bool {
        matches!(self, Self::Gateway(GatewayError::NotConfigured(_)))
    }

    /// Trying again later may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Gateway(err) => {
                err.is_transport() || err.status().is_some_and(|status| status == 429 || status >= 500)
            },
            _ => false,
        }
    }
}
