//! Infrastructure layer - configuration loading and adapter wiring
//!
//! Loads [`AppConfig`] from defaults, an optional TOML file and the
//! environment, and binds the speech dispatcher to the application's
//! speech output port.

pub mod adapters;
pub mod config;

pub use adapters::{ConfiguredSpeech, build_gateway, build_listener, build_speech};
pub use config::{AppConfig, ChatConfig};
