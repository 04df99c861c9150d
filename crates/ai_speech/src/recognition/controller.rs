//! Listening sessions
//!
//! [`SpeechInputController`] owns at most one session. The session runs on a
//! spawned task and reports through a [`RecognitionStream`]; dropping the
//! stream or calling `stop_listening` tears it down.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::fault::{RecognitionEvent, RecognitionFault};
use crate::config::ListeningConfig;
use crate::ports::RecognitionEngine;

const EVENT_BUFFER: usize = 16;

#[derive(Debug)]
struct ActiveSession {
    id: u64,
    cancel: CancellationToken,
}

type SessionSlot = Arc<Mutex<Option<ActiveSession>>>;

/// Keeps a recognition engine listening across passes
///
/// At most one session runs per controller. The session restarts the engine
/// after every result and every recoverable fault, and ends on a fatal fault,
/// [`stop_listening`](Self::stop_listening), or when its stream is dropped.
pub struct SpeechInputController {
    engine: Arc<dyn RecognitionEngine>,
    restart_delay: Duration,
    session: SessionSlot,
    next_session: AtomicU64,
    partial: Arc<watch::Sender<String>>,
}

impl fmt::Debug for SpeechInputController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechInputController")
            .field("restart_delay", &self.restart_delay)
            .field("listening", &self.is_listening())
            .finish_non_exhaustive()
    }
}

impl SpeechInputController {
    pub fn new(engine: Arc<dyn RecognitionEngine>, config: ListeningConfig) -> Self {
        let (partial, _) = watch::channel(String::new());
        Self {
            engine,
            restart_delay: Duration::from_millis(config.restart_delay_ms),
            session: Arc::new(Mutex::new(None)),
            next_session: AtomicU64::new(1),
            partial: Arc::new(partial),
        }
    }

    /// Start a listening session
    ///
    /// When the engine is unavailable or a session is already running, the
    /// returned stream yields a single `FatalFault` and ends; a running
    /// session is left alone. Must be called within a Tokio runtime.
    pub fn start_listening(&self) -> RecognitionStream {
        if !self.engine.is_available() {
            warn!("Speech recognition is not available");
            return RecognitionStream::rejected(RecognitionFault::Unavailable);
        }

        let mut slot = self.session.lock();
        if let Some(active) = slot.as_ref() {
            warn!(session = active.id, "Already listening");
            return RecognitionStream::rejected(RecognitionFault::AlreadyListening);
        }

        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        *slot = Some(ActiveSession {
            id,
            cancel: cancel.clone(),
        });
        drop(slot);

        self.partial.send_replace(String::new());
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);

        let session = ListeningSession {
            id,
            engine: Arc::clone(&self.engine),
            session: Arc::clone(&self.session),
            cancel: cancel.clone(),
            events: events_tx,
            partial: Arc::clone(&self.partial),
            restart_delay: self.restart_delay,
        };
        tokio::spawn(session.run());

        info!(session = id, "Listening started");

        RecognitionStream {
            events: events_rx,
            teardown: Some(Teardown {
                id,
                cancel,
                session: Arc::clone(&self.session),
                engine: Arc::clone(&self.engine),
            }),
        }
    }

    /// Stop the running session; no-op when idle
    ///
    /// The engine's current pass is cancelled before this returns and the
    /// session's stream yields nothing further.
    pub fn stop_listening(&self) {
        let mut slot = self.session.lock();
        if let Some(active) = slot.take() {
            active.cancel.cancel();
            self.engine.cancel();
            info!(session = active.id, "Listening stopped");
        }
    }

    pub fn is_listening(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Interim hypotheses of the current pass
    pub fn partial_results(&self) -> watch::Receiver<String> {
        self.partial.subscribe()
    }
}

/// Drives one session's restart loop on a spawned task
struct ListeningSession {
    id: u64,
    engine: Arc<dyn RecognitionEngine>,
    session: SessionSlot,
    cancel: CancellationToken,
    events: mpsc::Sender<RecognitionEvent>,
    partial: Arc<watch::Sender<String>>,
    restart_delay: Duration,
}

impl ListeningSession {
    async fn run(self) {
        let mut pass: u32 = 0;

        loop {
            pass += 1;
            debug!(session = self.id, pass, "Starting recognition pass");

            let result = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                result = self.engine.recognize(&self.partial) => result,
            };

            let event = match result {
                Ok(text) => RecognitionEvent::Utterance(text),
                Err(fault) => fault.into_event(),
            };

            match event {
                RecognitionEvent::Utterance(text) => {
                    let text = text.trim();
                    if text.is_empty() {
                        debug!(session = self.id, "Blank result absorbed");
                    } else if !self.emit(RecognitionEvent::Utterance(text.to_string())).await {
                        break;
                    }
                },
                RecognitionEvent::RecoverableFault(fault) => {
                    warn!(session = self.id, %fault, "Recognition pass ended, restarting");
                },
                RecognitionEvent::FatalFault(fault) => {
                    error!(session = self.id, %fault, "Listening ended by fatal fault");
                    self.release();
                    self.emit(RecognitionEvent::FatalFault(fault)).await;
                    return;
                },
            }

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(self.restart_delay) => {},
            }
        }

        debug!(session = self.id, passes = pass, "Listening loop finished");
        self.release();
    }

    /// Deliver an event; false once the session is cancelled or unobserved
    async fn emit(&self, event: RecognitionEvent) -> bool {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => false,
            sent = self.events.send(event) => sent.is_ok(),
        }
    }

    fn release(&self) {
        let mut slot = self.session.lock();
        if slot.as_ref().is_some_and(|s| s.id == self.id) {
            slot.take();
        }
    }
}

/// Synchronous teardown run when a session's stream is dropped
struct Teardown {
    id: u64,
    cancel: CancellationToken,
    session: SessionSlot,
    engine: Arc<dyn RecognitionEngine>,
}

impl Teardown {
    fn run(&self) {
        self.cancel.cancel();
        let mut slot = self.session.lock();
        if slot.as_ref().is_some_and(|s| s.id == self.id) {
            slot.take();
            self.engine.cancel();
            debug!(session = self.id, "Listening stream dropped");
        }
    }
}

/// Final results and the terminating fault of one listening session
///
/// Yields `Utterance` events and at most one `FatalFault`, after which it
/// ends. Dropping it stops the session.
pub struct RecognitionStream {
    events: mpsc::Receiver<RecognitionEvent>,
    teardown: Option<Teardown>,
}

impl RecognitionStream {
    fn rejected(fault: RecognitionFault) -> Self {
        let (tx, events) = mpsc::channel(1);
        let _ = tx.try_send(RecognitionEvent::FatalFault(fault));
        Self {
            events,
            teardown: None,
        }
    }

    /// Session id, `None` for a rejected start
    pub fn session_id(&self) -> Option<u64> {
        self.teardown.as_ref().map(|t| t.id)
    }
}

impl fmt::Debug for RecognitionStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognitionStream")
            .field("session", &self.session_id())
            .finish_non_exhaustive()
    }
}

impl Stream for RecognitionStream {
    type Item = RecognitionEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this
            .teardown
            .as_ref()
            .is_some_and(|t| t.cancel.is_cancelled())
        {
            return Poll::Ready(None);
        }
        this.events.poll_recv(cx)
    }
}

impl Drop for RecognitionStream {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown.run();
        }
    }
}
