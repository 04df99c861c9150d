//! Configuration for the completion gateway

use serde::{Deserialize, Serialize};

/// Endpoints and limits shared by all provider codecs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// OpenAI API base URL
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Gemini API base URL
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Anthropic API base URL
    #[serde(default = "default_anthropic_base_url")]
    pub anthropic_base_url: String,

    /// Connect timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Whole-request (read) timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Response size cap sent to Anthropic, which requires one
    #[serde(default = "default_anthropic_max_tokens")]
    pub anthropic_max_tokens: u32,

    /// Value of the `anthropic-version` header
    #[serde(default = "default_anthropic_version")]
    pub anthropic_version: String,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com/v1".to_string()
}

const fn default_timeout_ms() -> u64 {
    30000 // 30 seconds
}

const fn default_anthropic_max_tokens() -> u32 {
    1024
}

fn default_anthropic_version() -> String {
    "2023-06-01".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            openai_base_url: default_openai_base_url(),
            gemini_base_url: default_gemini_base_url(),
            anthropic_base_url: default_anthropic_base_url(),
            connect_timeout_ms: default_timeout_ms(),
            timeout_ms: default_timeout_ms(),
            anthropic_max_tokens: default_anthropic_max_tokens(),
            anthropic_version: default_anthropic_version(),
        }
    }
}

impl GatewayConfig {
    /// Point every provider at the same base URL (mock servers, proxies)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            openai_base_url: base_url.clone(),
            gemini_base_url: base_url.clone(),
            anthropic_base_url: base_url,
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err("Timeouts must be greater than 0".to_string());
        }
        if self.anthropic_max_tokens == 0 {
            return Err("anthropic_max_tokens must be greater than 0".to_string());
        }
        Ok(())
    }
}
