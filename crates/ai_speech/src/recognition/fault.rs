//! Recognition fault classification
//!
//! Maps platform engine error codes onto [`RecognitionFault`] and splits them
//! into faults that end a listening session and faults a restart absorbs.

use thiserror::Error;

/// Why a recognition pass ended without a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum RecognitionFault {
    #[error("audio recording error")]
    AudioRecording,
    #[error("recognizer client error")]
    Client,
    #[error("insufficient permissions to record audio")]
    InsufficientPermissions,
    #[error("network error")]
    Network,
    #[error("recognition server error")]
    Server,
    #[error("no speech matched")]
    NoMatch,
    #[error("no speech heard before timeout")]
    SpeechTimeout,
    #[error("recognizer busy")]
    RecognizerBusy,
    #[error("unknown recognizer error code {0}")]
    Unknown(i32),
    /// No recognition engine on this host
    #[error("speech recognition is not available")]
    Unavailable,
    /// A listening session is already running
    #[error("already listening")]
    AlreadyListening,
}

/// What a listening session reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// A final, non-blank recognition result
    Utterance(String),
    /// The pass ended quietly; the session restarts
    RecoverableFault(RecognitionFault),
    /// The session is over
    FatalFault(RecognitionFault),
}

impl RecognitionFault {
    /// Map an engine's numeric error code
    ///
    /// Codes follow the common platform numbering: 1 network timeout,
    /// 2 network, 3 audio, 4 server, 5 client, 6 speech timeout, 7 no match,
    /// 8 busy, 9 permissions.
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 | 2 => Self::Network,
            3 => Self::AudioRecording,
            4 => Self::Server,
            5 => Self::Client,
            6 => Self::SpeechTimeout,
            7 => Self::NoMatch,
            8 => Self::RecognizerBusy,
            9 => Self::InsufficientPermissions,
            other => Self::Unknown(other),
        }
    }

    /// Whether listening should simply start another pass
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoMatch | Self::SpeechTimeout | Self::RecognizerBusy)
    }

    /// Classify into a session event
    pub const fn into_event(self) -> RecognitionEvent {
        if self.is_recoverable() {
            RecognitionEvent::RecoverableFault(self)
        } else {
            RecognitionEvent::FatalFault(self)
        }
    }
}

impl RecognitionEvent {
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::FatalFault(_))
    }
}
