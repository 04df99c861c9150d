//! Application configuration

use std::path::Path;

use ai_core::{GatewayConfig, Provider, ProviderSelection};
use ai_speech::{ListeningConfig, LocalAudioConfig, TtsConfig};
use application::ChatSettings;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "journal-voice";

/// Environment variable prefix, e.g. `JOURNAL_VOICE__CHAT__API_KEY`
pub const ENV_PREFIX: &str = "JOURNAL_VOICE";

const ENV_SEPARATOR: &str = "__";

/// Text-generation settings
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Provider that writes the replies
    #[serde(default = "default_provider")]
    pub provider: Provider,

    /// Model name, blank for the provider default
    #[serde(default)]
    pub model: String,

    /// API key for the provider
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// System prompt sent with every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Read replies aloud
    #[serde(default)]
    pub speak_replies: bool,
}

const fn default_provider() -> Provider {
    Provider::OpenAi
}

fn default_system_prompt() -> String {
    "You are a warm, attentive journaling companion. Reply briefly, reflect the \
     writer's feelings back to them and ask at most one gentle follow-up question."
        .to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: String::new(),
            api_key: None,
            system_prompt: default_system_prompt(),
            speak_replies: false,
        }
    }
}

impl ChatConfig {
    /// Provider selection for the completion gateway
    ///
    /// A missing key becomes an empty credential, which the gateway rejects
    /// before any network call.
    pub fn to_selection(&self) -> ProviderSelection {
        let credential = self
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().to_string())
            .unwrap_or_default();
        ProviderSelection::new(self.provider, self.model.trim(), credential)
    }

    pub fn to_settings(&self) -> ChatSettings {
        ChatSettings {
            selection: self.to_selection(),
            system_prompt: self.system_prompt.clone(),
            speak_replies: self.speak_replies,
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Speech synthesis, independent of `chat`
    #[serde(default)]
    pub speech: TtsConfig,

    /// Local synthesizer and player commands
    #[serde(default)]
    pub audio: LocalAudioConfig,

    #[serde(default)]
    pub listening: ListeningConfig,
}

impl AppConfig {
    /// Load from `journal-voice.toml` (if present) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load from an explicit file (required when given) and the environment
    pub fn load_from(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::from_sources(path, Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
    }

    fn from_sources(
        path: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(CONFIG_FILE).required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(environment)
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate().map_err(config::ConfigError::Message)?;
        Ok(app)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        self.gateway.validate()?;
        self.speech.validate()?;
        if self.audio.synthesizer_command.trim().is_empty() {
            return Err("audio.synthesizer_command must not be empty".to_string());
        }
        if self.audio.player_command.trim().is_empty() {
            return Err("audio.player_command must not be empty".to_string());
        }
        Ok(())
    }

    pub fn to_selection(&self) -> ProviderSelection {
        self.chat.to_selection()
    }

    pub fn to_tts_config(&self) -> TtsConfig {
        self.speech.clone()
    }

    pub const fn to_listening_config(&self) -> ListeningConfig {
        self.listening
    }
}
