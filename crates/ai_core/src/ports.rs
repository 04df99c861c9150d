//! Port definitions for text completion
//!
//! Defines the trait (port) the chat flow depends on and the normalized
//! result every provider is reduced to.

use async_trait::async_trait;
use domain::ConversationTurn;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::provider::{Provider, ProviderSelection};

/// Provider-neutral completion result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedCompletion {
    /// Generated text
    pub text: String,
    /// Provider that answered
    pub provider: Provider,
    /// Model that answered
    pub model: String,
}

/// Port for completion gateways
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Complete a conversation with the selected provider
    ///
    /// # Arguments
    ///
    /// * `turns` - Conversation so far, oldest first
    /// * `selection` - Provider, model and credential to use
    /// * `system_prompt` - Instructions for the assistant (omitted when empty)
    ///
    /// # Errors
    ///
    /// Every failure is returned as a classified [`GatewayError`].
    async fn complete(
        &self,
        turns: &[ConversationTurn],
        selection: &ProviderSelection,
        system_prompt: &str,
    ) -> Result<NormalizedCompletion, GatewayError>;
}
