//! Speech synthesis and playback adapters
//!
//! Remote backends implement [`RemoteSynthesizer`](crate::ports::RemoteSynthesizer);
//! the command adapters implement the local synthesizer and player ports.

pub mod command;
pub mod gemini;
pub mod openai;

pub use command::{CommandPlayer, CommandSynthesizer};
pub use gemini::GeminiTts;
pub use openai::OpenAiTts;
