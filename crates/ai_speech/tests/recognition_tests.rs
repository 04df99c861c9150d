//! Listening sessions driven through the callback engine adapter

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use ai_speech::{
    CallbackEngine, ListeningConfig, PlatformRecognizer, RecognitionEngine, RecognitionEvent,
    RecognitionFault, SignalSender, SpeechInputController,
};
use futures::StreamExt;
use parking_lot::Mutex;

#[derive(Debug, Clone)]
enum Callback {
    Partial(&'static str),
    Result(&'static str),
    Error(i32),
}

/// Platform that answers each `begin` with the next batch of callbacks
#[derive(Default)]
struct FakePlatform {
    begins: AtomicUsize,
    cancels: AtomicUsize,
    script: Mutex<VecDeque<Vec<Callback>>>,
    /// Callbacks a sloppy platform still fires while being cancelled
    on_cancel: Vec<Callback>,
    signals: OnceLock<SignalSender>,
}

impl FakePlatform {
    fn fire(&self, callbacks: &[Callback]) {
        let Some(signals) = self.signals.get() else {
            return;
        };
        for callback in callbacks {
            match callback {
                Callback::Partial(text) => signals.partial(*text),
                Callback::Result(text) => signals.result(*text),
                Callback::Error(code) => signals.error(*code),
            }
        }
    }

    fn push_pass(&self, callbacks: Vec<Callback>) {
        self.script.lock().push_back(callbacks);
    }
}

impl PlatformRecognizer for FakePlatform {
    fn is_available(&self) -> bool {
        true
    }

    fn begin(&self) {
        self.begins.fetch_add(1, Ordering::SeqCst);
        let batch = self.script.lock().pop_front().unwrap_or_default();
        self.fire(&batch);
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        self.fire(&self.on_cancel);
    }
}

fn platform(passes: Vec<Vec<Callback>>) -> Arc<FakePlatform> {
    Arc::new(FakePlatform {
        script: Mutex::new(passes.into()),
        ..Default::default()
    })
}

fn controller_for(platform: &Arc<FakePlatform>) -> SpeechInputController {
    let (engine, signals) = CallbackEngine::new(Arc::clone(platform) as Arc<dyn PlatformRecognizer>);
    let _ = platform.signals.set(signals);
    SpeechInputController::new(
        Arc::new(engine) as Arc<dyn RecognitionEngine>,
        ListeningConfig::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn no_match_timeout_then_audio_error() {
    let platform = platform(vec![
        vec![Callback::Error(7)],
        vec![Callback::Error(6)],
        vec![Callback::Error(3)],
    ]);
    let controller = controller_for(&platform);

    let events: Vec<_> = controller.start_listening().collect().await;

    assert_eq!(
        events,
        vec![RecognitionEvent::FatalFault(RecognitionFault::AudioRecording)]
    );
    assert_eq!(platform.begins.load(Ordering::SeqCst), 3);
    assert!(!controller.is_listening());
}

#[tokio::test(start_paused = true)]
async fn server_error_ends_immediately() {
    let platform = platform(vec![vec![Callback::Error(4)]]);
    let controller = controller_for(&platform);

    let events: Vec<_> = controller.start_listening().collect().await;

    assert_eq!(
        events,
        vec![RecognitionEvent::FatalFault(RecognitionFault::Server)]
    );
    assert_eq!(platform.begins.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn results_stream_until_stopped() {
    let platform = platform(vec![
        vec![Callback::Partial("slept"), Callback::Result("slept well")],
        vec![Callback::Error(8)],
        vec![Callback::Result("coffee first")],
    ]);
    let controller = controller_for(&platform);
    let mut partials = controller.partial_results();

    let mut stream = controller.start_listening();

    assert_eq!(
        stream.next().await,
        Some(RecognitionEvent::Utterance("slept well".to_string()))
    );
    assert_eq!(*partials.borrow_and_update(), "slept");

    assert_eq!(
        stream.next().await,
        Some(RecognitionEvent::Utterance("coffee first".to_string()))
    );

    controller.stop_listening();

    assert_eq!(stream.next().await, None);
    assert!(!controller.is_listening());
    assert_eq!(platform.cancels.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn late_callbacks_do_not_leak_into_next_session() {
    let platform = Arc::new(FakePlatform {
        script: Mutex::new(vec![vec![Callback::Result("first words")]].into()),
        on_cancel: vec![Callback::Result("late words from old session"), Callback::Error(3)],
        ..Default::default()
    });
    let controller = controller_for(&platform);

    let mut first = controller.start_listening();
    assert_eq!(
        first.next().await,
        Some(RecognitionEvent::Utterance("first words".to_string()))
    );
    controller.stop_listening();
    assert_eq!(first.next().await, None);

    platform.push_pass(vec![Callback::Result("fresh words")]);
    let mut second = controller.start_listening();

    assert_eq!(
        second.next().await,
        Some(RecognitionEvent::Utterance("fresh words".to_string()))
    );
    assert!(controller.is_listening());
}
