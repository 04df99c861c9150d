//! Provider codecs
//!
//! One encode/decode pair per provider, selected through a table keyed by
//! [`Provider`]. Codecs are pure: they never touch the network and hold no
//! state.

mod anthropic;
mod gemini;
mod openai;

use std::fmt;

use domain::ConversationTurn;
use serde::Serialize;
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::provider::{Provider, ProviderSelection};

type BuildFn = fn(
    &GatewayConfig,
    &ProviderSelection,
    &[ConversationTurn],
    &str,
) -> Result<EncodedRequest, GatewayError>;

type DecodeFn = fn(&Value) -> Result<String, GatewayError>;

/// Encode/decode pair for one provider's wire format
pub struct ProviderCodec {
    provider: Provider,
    build: BuildFn,
    parse: DecodeFn,
}

static CODECS: [ProviderCodec; 3] = [
    ProviderCodec {
        provider: Provider::OpenAi,
        build: openai::encode,
        parse: openai::decode,
    },
    ProviderCodec {
        provider: Provider::Gemini,
        build: gemini::encode,
        parse: gemini::decode,
    },
    ProviderCodec {
        provider: Provider::Anthropic,
        build: anthropic::encode,
        parse: anthropic::decode,
    },
];

/// Look up the codec for a provider
pub fn codec_for(provider: Provider) -> &'static ProviderCodec {
    let index = match provider {
        Provider::OpenAi => 0,
        Provider::Gemini => 1,
        Provider::Anthropic => 2,
    };
    &CODECS[index]
}

impl ProviderCodec {
    /// Provider this codec speaks
    pub const fn provider(&self) -> Provider {
        self.provider
    }

    /// Build the provider-specific request
    ///
    /// # Errors
    ///
    /// Returns `ProviderMismatch` when the selection names another provider.
    pub fn encode(
        &self,
        config: &GatewayConfig,
        selection: &ProviderSelection,
        turns: &[ConversationTurn],
        system_prompt: &str,
    ) -> Result<EncodedRequest, GatewayError> {
        if selection.provider != self.provider {
            return Err(GatewayError::ProviderMismatch {
                expected: self.provider.to_string(),
                actual: selection.provider.to_string(),
            });
        }
        (self.build)(config, selection, turns, system_prompt)
    }

    /// Extract the completion text from a 2xx response body
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` when the expected path is absent or not a string.
    pub fn decode(&self, body: &Value) -> Result<String, GatewayError> {
        (self.parse)(body)
    }
}

impl fmt::Debug for ProviderCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCodec")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

/// A fully built HTTP POST, ready to send
#[derive(Clone)]
pub struct EncodedRequest {
    /// Endpoint URL without query string
    pub url: String,
    /// Query parameters (may carry the credential)
    pub query: Vec<(&'static str, String)>,
    /// Extra headers (may carry the credential)
    pub headers: Vec<(&'static str, String)>,
    /// JSON body
    pub body: Value,
}

impl EncodedRequest {
    fn new(url: String, body: Value) -> Self {
        Self {
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body,
        }
    }

    fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    fn query(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.query.push((name, value.into()));
        self
    }

    /// Value of a header, if set
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Value of a query parameter, if set
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for EncodedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<_> = self.headers.iter().map(|(name, _)| *name).collect();
        let query: Vec<_> = self.query.iter().map(|(name, _)| *name).collect();
        f.debug_struct("EncodedRequest")
            .field("url", &self.url)
            .field("headers", &headers)
            .field("query", &query)
            .finish_non_exhaustive()
    }
}

fn to_body<T: Serialize>(envelope: &T) -> Result<Value, GatewayError> {
    serde_json::to_value(envelope)
        .map_err(|e| GatewayError::Configuration(format!("Failed to encode request: {e}")))
}

/// Read a string at a JSON pointer, naming `display_path` when it is missing
fn text_at(body: &Value, pointer: &str, display_path: &str) -> Result<String, GatewayError> {
    match body.pointer(pointer) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(GatewayError::MalformedResponse(format!(
            "expected string at `{display_path}`, found {}",
            json_kind(other)
        ))),
        None => Err(GatewayError::MalformedResponse(format!(
            "missing `{display_path}`"
        ))),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn trim_base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}
