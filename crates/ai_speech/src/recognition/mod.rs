//! Continuous speech recognition
//!
//! [`SpeechInputController`] keeps a [`RecognitionEngine`](crate::ports::RecognitionEngine)
//! listening by restarting recognition passes until a fatal fault or an
//! explicit stop. Final results arrive on a [`RecognitionStream`]; interim
//! hypotheses go to a separate watch channel.

mod callback;
mod controller;
mod fault;

pub use callback::{CallbackEngine, PlatformRecognizer, SignalSender};
pub use controller::{RecognitionStream, SpeechInputController};
pub use fault::{RecognitionEvent, RecognitionFault};
