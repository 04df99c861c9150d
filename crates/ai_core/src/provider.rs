//! Provider identity and per-call provider selection

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Supported chat-completion providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI chat completions
    #[serde(alias = "open_ai")]
    OpenAi,
    /// Google Gemini `generateContent`
    Gemini,
    /// Anthropic messages
    Anthropic,
}

impl Provider {
    /// Every provider, in table order
    pub const ALL: [Self; 3] = [Self::OpenAi, Self::Gemini, Self::Anthropic];

    /// Stable lowercase identifier
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Anthropic => "anthropic",
        }
    }

    /// Model used when settings leave the model blank
    pub const fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Gemini => "gemini-1.5-flash",
            Self::Anthropic => "claude-3-5-haiku-latest",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open_ai" | "a" => Ok(Self::OpenAi),
            "gemini" | "google" | "b" => Ok(Self::Gemini),
            "anthropic" | "claude" | "c" => Ok(Self::Anthropic),
            _ => Err(format!(
                "Invalid provider: {s}. Use 'openai', 'gemini' or 'anthropic'"
            )),
        }
    }
}

/// Which provider, model and credential a single call uses
///
/// Text generation and speech synthesis each get their own selection; the
/// credential is never printed by `Debug`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSelection {
    /// Provider whose codec must serve the call
    pub provider: Provider,
    /// Provider-specific model identifier
    pub model: String,
    /// API key
    pub credential: SecretString,
}

impl ProviderSelection {
    /// Create a selection
    pub fn new(provider: Provider, model: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            credential: SecretString::from(credential.into()),
        }
    }

    /// Whether a non-blank credential is present
    pub fn has_credential(&self) -> bool {
        !self.credential.expose_secret().trim().is_empty()
    }

    /// The model, or the provider default when blank
    pub fn model_or_default(&self) -> &str {
        if self.model.trim().is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }
}
