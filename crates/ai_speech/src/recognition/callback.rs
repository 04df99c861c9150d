//! Bridge from callback-style platform recognizers to [`RecognitionEngine`]
//!
//! Platform glue reports through a [`SignalSender`]. Every signal carries the
//! pass it was sent in, so results and errors a platform delivers late, after
//! `cancel` or between passes, never reach a later pass.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc, watch};
use tracing::debug;

use super::fault::RecognitionFault;
use crate::ports::RecognitionEngine;

/// A callback-driven platform recognizer
///
/// Platform glue (FFI bindings, a desktop speech service) implements this
/// and reports back through a [`SignalSender`].
pub trait PlatformRecognizer: Send + Sync {
    fn is_available(&self) -> bool;

    /// Start listening for one utterance
    fn begin(&self);

    /// Abort the utterance in progress
    fn cancel(&self);
}

#[derive(Debug)]
enum Signal {
    Partial(String),
    Final(String),
    Error(i32),
}

/// A signal stamped with the pass that was current when it was sent
#[derive(Debug)]
struct Stamped {
    pass: u64,
    signal: Signal,
}

/// Handle the platform uses to report recognition callbacks
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: mpsc::UnboundedSender<Stamped>,
    pass: Arc<AtomicU64>,
}

impl SignalSender {
    fn send(&self, signal: Signal) {
        let pass = self.pass.load(Ordering::SeqCst);
        let _ = self.tx.send(Stamped { pass, signal });
    }

    pub fn partial(&self, text: impl Into<String>) {
        self.send(Signal::Partial(text.into()));
    }

    pub fn result(&self, text: impl Into<String>) {
        self.send(Signal::Final(text.into()));
    }

    /// Report an engine error code, see [`RecognitionFault::from_code`]
    pub fn error(&self, code: i32) {
        self.send(Signal::Error(code));
    }
}

/// Adapts a [`PlatformRecognizer`] to the [`RecognitionEngine`] port
///
/// Each pass calls `begin` and waits for the next final result or error
/// signal of that pass; partial signals seen on the way are published as
/// interim text. Signals stamped with an earlier pass are discarded.
pub struct CallbackEngine {
    platform: Arc<dyn PlatformRecognizer>,
    signals: Mutex<mpsc::UnboundedReceiver<Stamped>>,
    pass: Arc<AtomicU64>,
}

impl fmt::Debug for CallbackEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackEngine")
            .field("pass", &self.pass.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl CallbackEngine {
    pub fn new(platform: Arc<dyn PlatformRecognizer>) -> (Self, SignalSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pass = Arc::new(AtomicU64::new(0));
        let engine = Self {
            platform,
            signals: Mutex::new(rx),
            pass: Arc::clone(&pass),
        };
        (engine, SignalSender { tx, pass })
    }
}

#[async_trait]
impl RecognitionEngine for CallbackEngine {
    fn is_available(&self) -> bool {
        self.platform.is_available()
    }

    async fn recognize(&self, partial: &watch::Sender<String>) -> Result<String, RecognitionFault> {
        let mut signals = self.signals.lock().await;
        let pass = self.pass.fetch_add(1, Ordering::SeqCst) + 1;
        self.platform.begin();

        loop {
            let Some(Stamped { pass: sent_in, signal }) = signals.recv().await else {
                // every sender is gone, so no result can ever arrive
                return Err(RecognitionFault::Client);
            };
            if sent_in != pass {
                debug!(pass, sent_in, ?signal, "Dropping signal from an earlier pass");
                continue;
            }

            match signal {
                Signal::Partial(text) => {
                    partial.send_replace(text);
                },
                Signal::Final(text) => return Ok(text),
                Signal::Error(code) => {
                    debug!(code, "Platform recognizer reported an error");
                    return Err(RecognitionFault::from_code(code));
                },
            }
        }
    }

    fn cancel(&self) {
        self.platform.cancel();
        self.pass.fetch_add(1, Ordering::SeqCst);
    }
}
