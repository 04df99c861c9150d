//! Speech output port - reads assistant replies aloud

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Port for speaking text to the user
///
/// Speaking never fails from the caller's point of view; adapters log and
/// fall back internally.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeechOutputPort: Send + Sync {
    /// Speak `text`, returning when speech has finished or was interrupted
    async fn speak(&self, text: &str);

    /// Interrupt current speech; no-op when silent
    fn stop(&self);
}
