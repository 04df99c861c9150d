//! Adapters binding the speech and gateway crates to application ports

mod speech_adapter;

use std::sync::Arc;

use ai_core::{AiGateway, GatewayError};
use ai_speech::{RecognitionEngine, SpeechInputController};

pub use speech_adapter::{ConfiguredSpeech, build_speech};

use crate::config::AppConfig;

/// Completion gateway configured from `[gateway]`
pub fn build_gateway(config: &AppConfig) -> Result<AiGateway, GatewayError> {
    AiGateway::new(config.gateway.clone())
}

/// Voice input over the host's recognition engine, paced by `[listening]`
pub fn build_listener(config: &AppConfig, engine: Arc<dyn RecognitionEngine>) -> SpeechInputController {
    SpeechInputController::new(engine, config.to_listening_config())
}
