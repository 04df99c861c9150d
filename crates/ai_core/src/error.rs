//! Gateway errors

use thiserror::Error;

/// Classified failure of a completion request
///
/// Callers can tell "the provider complained" (`Provider`) apart from "we
/// couldn't parse a success" (`MalformedResponse`) and from "we never got an
/// answer" (`Transport` / `Timeout`).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Credential or model missing; no request was sent
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Selection and codec disagree on the provider
    #[error("Provider mismatch: codec for {expected} cannot serve a {actual} selection")]
    ProviderMismatch {
        /// Provider the codec implements
        expected: String,
        /// Provider named by the selection
        actual: String,
    },

    /// Connection could not be established or broke mid-request
    #[error("Transport error: {0}")]
    Transport(String),

    /// No response within the configured bound
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Provider answered with a non-2xx status
    #[error("Provider returned HTTP {status}: {body}")]
    Provider {
        /// HTTP status code
        status: u16,
        /// Raw response body, kept for diagnostics
        body: String,
    },

    /// 2xx response without the expected field
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid gateway configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl GatewayError {
    /// Classify a reqwest failure, reporting `timeout_ms` for timeouts
    pub fn from_transport(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else {
            Self::Transport(err.to_string())
        }
    }

    /// Whether the request never produced an HTTP answer
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }

    /// HTTP status of a provider error
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}
