//! Application services

mod voice_chat_service;

pub use voice_chat_service::{ChatSettings, VoiceChatService};
