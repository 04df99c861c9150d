//! Anthropic messages codec
//!
//! `x-api-key` plus `anthropic-version` headers, top-level `system` field,
//! and an explicit `max_tokens`, which this API requires. Text at
//! `content[0].text`.

use domain::{ConversationTurn, Originator};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;

use super::{EncodedRequest, text_at, to_body, trim_base};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::provider::ProviderSelection;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

const fn role(originator: Originator) -> &'static str {
    match originator {
        Originator::User => "user",
        Originator::Assistant => "assistant",
    }
}

pub(super) fn encode(
    config: &GatewayConfig,
    selection: &ProviderSelection,
    turns: &[ConversationTurn],
    system_prompt: &str,
) -> Result<EncodedRequest, GatewayError> {
    let body = to_body(&MessagesRequest {
        model: selection.model_or_default(),
        max_tokens: config.anthropic_max_tokens,
        system: (!system_prompt.trim().is_empty()).then_some(system_prompt),
        messages: turns
            .iter()
            .map(|turn| Message {
                role: role(turn.originator()),
                content: turn.content(),
            })
            .collect(),
    })?;

    let url = format!("{}/messages", trim_base(&config.anthropic_base_url));
    Ok(EncodedRequest::new(url, body)
        .header("x-api-key", selection.credential.expose_secret())
        .header("anthropic-version", config.anthropic_version.clone()))
}

pub(super) fn decode(body: &Value) -> Result<String, GatewayError> {
    text_at(body, "/content/0/text", "content[0].text")
}
