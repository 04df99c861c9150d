//! HTTP gateway that runs a codec's request and classifies the outcome

use std::time::Duration;

use async_trait::async_trait;
use domain::ConversationTurn;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::codec::codec_for;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::ports::{CompletionGateway, NormalizedCompletion};
use crate::provider::ProviderSelection;

/// Completion gateway backed by `reqwest`
///
/// Performs exactly one POST per call. Retries, if wanted, belong to the
/// caller.
#[derive(Debug, Clone)]
pub struct AiGateway {
    client: Client,
    config: GatewayConfig,
}

impl AiGateway {
    /// Create a new gateway
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Configuration` if the configuration is invalid
    /// or the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        config.validate().map_err(GatewayError::Configuration)?;

        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                GatewayError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        info!(
            openai = %config.openai_base_url,
            gemini = %config.gemini_base_url,
            anthropic = %config.anthropic_base_url,
            "Initialized completion gateway"
        );

        Ok(Self { client, config })
    }

    /// Create with the public provider endpoints
    pub fn with_defaults() -> Result<Self, GatewayError> {
        Self::new(GatewayConfig::default())
    }

    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[async_trait]
impl CompletionGateway for AiGateway {
    #[instrument(
        skip(self, turns, selection, system_prompt),
        fields(provider = %selection.provider, model = %selection.model_or_default(), turns = turns.len())
    )]
    async fn complete(
        &self,
        turns: &[ConversationTurn],
        selection: &ProviderSelection,
        system_prompt: &str,
    ) -> Result<NormalizedCompletion, GatewayError> {
        if !selection.has_credential() {
            warn!("Completion blocked: no API key configured");
            return Err(GatewayError::NotConfigured(format!(
                "no API key configured for {}",
                selection.provider
            )));
        }

        let codec = codec_for(selection.provider);
        let request = codec.encode(&self.config, selection, turns, system_prompt)?;

        debug!(url = %request.url, "Sending completion request");

        let mut builder = self.client.post(&request.url).json(&request.body);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(&e, self.config.timeout_ms))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::from_transport(&e, self.config.timeout_ms))?;

        if !status.is_success() {
            warn!(status = %status, body = %body, "Provider rejected completion request");
            return Err(GatewayError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| GatewayError::MalformedResponse(format!("body is not JSON: {e}")))?;
        let text = codec.decode(&json)?;

        debug!(text_len = text.len(), "Completion received");

        Ok(NormalizedCompletion {
            text,
            provider: selection.provider,
            model: selection.model_or_default().to_string(),
        })
    }
}
