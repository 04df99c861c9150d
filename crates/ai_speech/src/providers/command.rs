//! Local synthesis and playback through system commands
//!
//! `CommandSynthesizer` runs a TTS program such as `espeak-ng` or `say` with
//! the text as its final argument. `CommandPlayer` runs a player such as
//! `ffplay`, `aplay` or `afplay` on an audio file. Both keep the running child
//! in a slot so `stop` can kill it synchronously.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::process::{Child, Command};
use tracing::{debug, instrument};

use crate::config::LocalAudioConfig;
use crate::error::SpeechError;
use crate::ports::{AudioPlayer, LocalSynthesizer};
use crate::types::AudioFormat;

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// The child process currently running for an adapter
///
/// Each spawn gets a run id so a superseded run never waits on, or kills,
/// the child that replaced it.
#[derive(Debug, Default)]
struct ProcessSlot {
    child: Mutex<Option<(u64, Child)>>,
    next_run: AtomicU64,
}

/// Kills the run's child if the waiting future is dropped
struct KillOnDrop<'a> {
    slot: &'a ProcessSlot,
    run: u64,
}

impl Drop for KillOnDrop<'_> {
    fn drop(&mut self) {
        let mut current = self.slot.child.lock();
        let owned = current.as_ref().is_some_and(|(run, _)| *run == self.run);
        if let Some((_, mut child)) = current.take_if(|_| owned) {
            let _ = child.start_kill();
        }
    }
}

impl ProcessSlot {
    /// Spawn `cmd` and wait for it; `Ok(None)` means it was killed or replaced
    async fn run(&self, mut cmd: Command) -> io::Result<Option<ExitStatus>> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = cmd.spawn()?;
        let run = self.next_run.fetch_add(1, Ordering::Relaxed);
        if let Some((_, mut previous)) = self.child.lock().replace((run, child)) {
            let _ = previous.start_kill();
        }
        let _guard = KillOnDrop { slot: self, run };

        loop {
            let polled = {
                let mut slot = self.child.lock();
                let Some((_, child)) = slot.as_mut().filter(|(current, _)| *current == run) else {
                    return Ok(None);
                };
                let polled = child.try_wait();
                if !matches!(polled, Ok(None)) {
                    slot.take();
                }
                polled
            };

            if let Some(status) = polled? {
                return Ok(Some(status));
            }
            tokio::time::sleep(EXIT_POLL_INTERVAL).await;
        }
    }

    fn kill(&self) {
        if let Some((_, mut child)) = self.child.lock().take() {
            let _ = child.start_kill();
        }
    }

    fn is_running(&self) -> bool {
        self.child.lock().is_some()
    }
}

fn spawn_error(program: &Path, err: &io::Error) -> SpeechError {
    if err.kind() == io::ErrorKind::NotFound {
        SpeechError::NotAvailable(format!("'{}' not found", program.display()))
    } else {
        SpeechError::SynthesisFailed(format!("Failed to run '{}': {err}", program.display()))
    }
}

/// On-device synthesizer backed by a system TTS command
#[derive(Debug)]
pub struct CommandSynthesizer {
    program: PathBuf,
    args: Vec<String>,
    process: ProcessSlot,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            process: ProcessSlot::default(),
        }
    }

    pub fn from_config(config: &LocalAudioConfig) -> Self {
        Self::new(&config.synthesizer_command, config.synthesizer_args.clone())
    }

    /// Whether the synthesizer is currently speaking
    pub fn is_speaking(&self) -> bool {
        self.process.is_running()
    }
}

#[async_trait]
impl LocalSynthesizer for CommandSynthesizer {
    #[instrument(skip(self, text), fields(program = %self.program.display(), text_len = text.len()))]
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(text);

        match self.process.run(cmd).await {
            Ok(Some(status)) if status.success() => Ok(()),
            Ok(Some(status)) => Err(SpeechError::SynthesisFailed(format!(
                "'{}' exited with {status}",
                self.program.display()
            ))),
            Ok(None) => {
                debug!("Local speech stopped");
                Ok(())
            },
            Err(e) => Err(spawn_error(&self.program, &e)),
        }
    }

    fn stop(&self) {
        self.process.kill();
    }
}

/// Audio player backed by a system playback command
#[derive(Debug)]
pub struct CommandPlayer {
    program: PathBuf,
    args: Vec<String>,
    process: ProcessSlot,
}

impl CommandPlayer {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            process: ProcessSlot::default(),
        }
    }

    pub fn from_config(config: &LocalAudioConfig) -> Self {
        Self::new(&config.player_command, config.player_args.clone())
    }

    pub fn is_playing(&self) -> bool {
        self.process.is_running()
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    #[instrument(skip(self), fields(program = %self.program.display()))]
    async fn play(&self, path: &Path, format: AudioFormat) -> Result<(), SpeechError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(path);

        match self.process.run(cmd).await {
            Ok(Some(status)) if status.success() => Ok(()),
            Ok(Some(status)) => Err(SpeechError::Playback(format!(
                "'{}' exited with {status}",
                self.program.display()
            ))),
            Ok(None) => {
                debug!("Playback stopped");
                Ok(())
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SpeechError::NotAvailable(
                format!("'{}' not found", self.program.display()),
            )),
            Err(e) => Err(SpeechError::Playback(format!(
                "Failed to run '{}': {e}",
                self.program.display()
            ))),
        }
    }

    fn stop(&self) {
        self.process.kill();
    }
}
