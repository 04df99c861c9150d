//! Gemini `generateContent` codec
//!
//! Credential travels as the `key` query parameter. Roles are `user` and
//! `model`, each wrapping its text in `parts`; the system prompt goes into the
//! separate `systemInstruction` field.

use domain::{ConversationTurn, Originator};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;

use super::{EncodedRequest, text_at, to_body, trim_base};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::provider::ProviderSelection;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Instruction<'a>>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Instruction<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

const fn role(originator: Originator) -> &'static str {
    match originator {
        Originator::User => "user",
        Originator::Assistant => "model",
    }
}

/// `models/` prefixed names are accepted as well as bare ones
pub(crate) fn model_path(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

pub(super) fn encode(
    config: &GatewayConfig,
    selection: &ProviderSelection,
    turns: &[ConversationTurn],
    system_prompt: &str,
) -> Result<EncodedRequest, GatewayError> {
    let system_instruction = (!system_prompt.trim().is_empty()).then(|| Instruction {
        parts: [Part {
            text: system_prompt,
        }],
    });

    let contents = turns
        .iter()
        .map(|turn| Content {
            role: role(turn.originator()),
            parts: [Part {
                text: turn.content(),
            }],
        })
        .collect();

    let body = to_body(&GenerateContentRequest {
        system_instruction,
        contents,
    })?;

    let url = format!(
        "{}/models/{}:generateContent",
        trim_base(&config.gemini_base_url),
        model_path(selection.model_or_default())
    );
    Ok(EncodedRequest::new(url, body).query("key", selection.credential.expose_secret()))
}

pub(super) fn decode(body: &Value) -> Result<String, GatewayError> {
    text_at(
        body,
        "/candidates/0/content/parts/0/text",
        "candidates[0].content.parts[0].text",
    )
}
