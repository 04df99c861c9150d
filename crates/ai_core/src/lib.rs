//! AI Core - Provider-neutral text completion
//!
//! Normalizes three unrelated chat-completion protocols behind a single
//! [`CompletionGateway::complete`] call:
//!
//! - `codec` holds one pure encode/decode pair per provider
//! - `gateway` executes the HTTP round trip and classifies failures
//!
//! # Example
//!
//! ```ignore
//! use ai_core::{AiGateway, CompletionGateway, GatewayConfig, Provider, ProviderSelection};
//!
//! let gateway = AiGateway::new(GatewayConfig::default())?;
//! let selection = ProviderSelection::new(Provider::Anthropic, "claude-3-5-haiku-latest", key);
//! let reply = gateway.complete(conversation.turns(), &selection, "You are a journaling companion.").await?;
//! println!("{}", reply.text);
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod gateway;
pub mod ports;
pub mod provider;

pub use codec::{EncodedRequest, ProviderCodec, codec_for};
pub use config::GatewayConfig;
pub use error::GatewayError;
pub use gateway::AiGateway;
pub use ports::{CompletionGateway, NormalizedCompletion};
pub use provider::{Provider, ProviderSelection};
