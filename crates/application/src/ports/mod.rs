//! Port definitions for the application layer

mod speech_output;

pub use ai_core::CompletionGateway;
#[cfg(test)]
pub use speech_output::MockSpeechOutputPort;
pub use speech_output::SpeechOutputPort;
