//! Configuration for speech synthesis, playback and listening

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Which engine renders the assistant's replies as audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    /// On-device system voice
    #[default]
    Local,
    /// OpenAI `/audio/speech`
    #[serde(alias = "open_ai")]
    OpenAi,
    /// Gemini speech generation
    Gemini,
    /// Azure neural voices (no backend yet, always falls back to local)
    Azure,
}

/// A remote synthesis backend reachable from the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteBackend {
    OpenAi,
    Gemini,
    /// Selectable provider without an implementation
    Unavailable(TtsProvider),
}

impl fmt::Display for RemoteBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => f.write_str("openai"),
            Self::Gemini => f.write_str("gemini"),
            Self::Unavailable(provider) => write!(f, "{provider} (unavailable)"),
        }
    }
}

/// One step of a synthesis fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SynthesisStep {
    Remote(RemoteBackend),
    /// Always succeeds from the dispatcher's point of view and ends the chain
    Local,
}

impl TtsProvider {
    pub const ALL: [Self; 4] = [Self::Local, Self::OpenAi, Self::Gemini, Self::Azure];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Azure => "azure",
        }
    }

    /// Ordered steps the dispatcher tries for this provider
    pub const fn fallback_chain(&self) -> &'static [SynthesisStep] {
        match self {
            Self::Local => &[SynthesisStep::Local],
            Self::OpenAi => &[
                SynthesisStep::Remote(RemoteBackend::OpenAi),
                SynthesisStep::Local,
            ],
            Self::Gemini => &[
                SynthesisStep::Remote(RemoteBackend::Gemini),
                SynthesisStep::Local,
            ],
            Self::Azure => &[
                SynthesisStep::Remote(RemoteBackend::Unavailable(Self::Azure)),
                SynthesisStep::Local,
            ],
        }
    }

    /// Model used when the configuration leaves it blank
    pub const fn default_model(&self) -> &'static str {
        match self {
            Self::Local | Self::Azure => "",
            Self::OpenAi => "tts-1",
            Self::Gemini => "gemini-2.5-flash-preview-tts",
        }
    }

    /// Voice used when the configuration leaves it blank
    pub const fn default_voice(&self) -> &'static str {
        match self {
            Self::Local => "",
            Self::OpenAi => "nova",
            Self::Gemini => "Kore",
            Self::Azure => "en-US-JennyNeural",
        }
    }
}

impl fmt::Display for TtsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TtsProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "system" => Ok(Self::Local),
            "openai" | "open_ai" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            "azure" => Ok(Self::Azure),
            _ => Err(format!(
                "Invalid speech provider: {s}. Use 'local', 'openai', 'gemini' or 'azure'"
            )),
        }
    }
}

/// Speech synthesis settings
///
/// Independent of the text-generation provider selection: replies can be
/// written by one vendor and spoken by another, each with its own key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Speech provider to use
    #[serde(default)]
    pub provider: TtsProvider,

    /// Synthesis model, blank for the provider default
    #[serde(default)]
    pub model: String,

    /// Voice name, blank for the provider default
    #[serde(default)]
    pub voice: String,

    /// API key for the remote provider
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Service region (Azure)
    #[serde(default)]
    pub region: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// OpenAI API base URL
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Gemini API base URL
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: TtsProvider::default(),
            model: String::new(),
            voice: String::new(),
            api_key: None,
            region: None,
            timeout_ms: default_timeout_ms(),
            openai_base_url: default_openai_base_url(),
            gemini_base_url: default_gemini_base_url(),
        }
    }
}

impl TtsConfig {
    /// Configuration for a remote provider with the given key
    pub fn remote(provider: TtsProvider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: Some(SecretString::from(api_key.into())),
            ..Self::default()
        }
    }

    /// Point both remote providers at another base URL (mock servers)
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.openai_base_url.clone_from(&url);
        self.gemini_base_url = url;
        self
    }

    /// Whether a non-blank API key is present
    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty())
    }

    pub fn model_or_default(&self) -> &str {
        let model = self.model.trim();
        if model.is_empty() {
            self.provider.default_model()
        } else {
            model
        }
    }

    pub fn voice_or_default(&self) -> &str {
        let voice = self.voice.trim();
        if voice.is_empty() {
            self.provider.default_voice()
        } else {
            voice
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than 0".to_string());
        }
        if self.provider == TtsProvider::OpenAi && self.openai_base_url.trim().is_empty() {
            return Err("openai_base_url must not be empty".to_string());
        }
        if self.provider == TtsProvider::Gemini && self.gemini_base_url.trim().is_empty() {
            return Err("gemini_base_url must not be empty".to_string());
        }
        Ok(())
    }
}

/// Commands backing the on-device synthesizer and player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAudioConfig {
    /// Program that speaks text passed as its final argument
    #[serde(default = "default_synthesizer_command")]
    pub synthesizer_command: String,

    /// Arguments placed before the text
    #[serde(default)]
    pub synthesizer_args: Vec<String>,

    /// Program that plays the audio file passed as its final argument
    #[serde(default = "default_player_command")]
    pub player_command: String,

    /// Arguments placed before the file path
    #[serde(default = "default_player_args")]
    pub player_args: Vec<String>,
}

fn default_synthesizer_command() -> String {
    if cfg!(target_os = "macos") {
        "say".to_string()
    } else {
        "espeak-ng".to_string()
    }
}

fn default_player_command() -> String {
    if cfg!(target_os = "macos") {
        "afplay".to_string()
    } else {
        "ffplay".to_string()
    }
}

fn default_player_args() -> Vec<String> {
    if cfg!(target_os = "macos") {
        Vec::new()
    } else {
        ["-nodisp", "-autoexit", "-loglevel", "error"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}

impl Default for LocalAudioConfig {
    fn default() -> Self {
        Self {
            synthesizer_command: default_synthesizer_command(),
            synthesizer_args: Vec::new(),
            player_command: default_player_command(),
            player_args: default_player_args(),
        }
    }
}

/// Continuous listening settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListeningConfig {
    /// Pause between the end of one recognition pass and the next
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,
}

fn default_restart_delay_ms() -> u64 {
    100
}

impl Default for ListeningConfig {
    fn default() -> Self {
        Self {
            restart_delay_ms: default_restart_delay_ms(),
        }
    }
}
