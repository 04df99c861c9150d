//! OpenAI chat completions codec
//!
//! Bearer auth, system prompt as a leading `system` message, text at
//! `choices[0].message.content`.

use domain::{ConversationTurn, Originator};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;

use super::{EncodedRequest, text_at, to_body, trim_base};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::provider::ProviderSelection;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
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
    let mut messages = Vec::with_capacity(turns.len() + 1);
    if !system_prompt.trim().is_empty() {
        messages.push(ChatMessage {
            role: "system",
            content: system_prompt,
        });
    }
    messages.extend(turns.iter().map(|turn| ChatMessage {
        role: role(turn.originator()),
        content: turn.content(),
    }));

    let body = to_body(&ChatRequest {
        model: selection.model_or_default(),
        messages,
    })?;

    let url = format!("{}/chat/completions", trim_base(&config.openai_base_url));
    Ok(EncodedRequest::new(url, body).header(
        "authorization",
        format!("Bearer {}", selection.credential.expose_secret()),
    ))
}

pub(super) fn decode(body: &Value) -> Result<String, GatewayError> {
    text_at(body, "/choices/0/message/content", "choices[0].message.content")
}
