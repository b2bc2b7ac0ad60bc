use std::sync::{Arc, Mutex, MutexGuard};

use crate::audio::AudioOutput;
use crate::error::{InvalidStateError, PlaybackError};
use crate::library::Track;
use crate::now_playing::{CommandStatus, RemoteCommand, RemoteCommandHandler};

use super::SessionObserver;
use super::snapshot::SessionSnapshot;
use super::state::PlaybackSession;

/// A `PlaybackSession` shared between the front end, the progress ticker and
/// remote-command callbacks. Every call takes the one session lock.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<PlaybackSession>>,
}

impl SharedSession {
    pub fn new(output: Box<dyn AudioOutput>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PlaybackSession::new(output))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlaybackSession> {
        // A panic inside a transition leaves the fields consistent enough to
        // keep serving snapshots.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_observer(&self, observer: Arc<dyn SessionObserver>) {
        self.lock().add_observer(observer);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.lock().current_track().cloned()
    }

    pub fn select_track(&self, track: Track, bytes: Vec<u8>) -> Result<(), PlaybackError> {
        self.lock().select_track(track, bytes)
    }

    pub fn play(&self) -> Result<(), InvalidStateError> {
        self.lock().play()
    }

    pub fn pause(&self) -> Result<(), InvalidStateError> {
        self.lock().pause()
    }

    pub fn toggle(&self) -> Result<(), InvalidStateError> {
        self.lock().toggle()
    }

    pub fn seek(&self, seconds: f64) -> Result<(), InvalidStateError> {
        self.lock().seek(seconds)
    }

    pub fn restart_current_track(&self) -> Result<(), InvalidStateError> {
        self.lock().restart_current_track()
    }

    pub fn stop(&self) {
        self.lock().stop()
    }
}

impl RemoteCommandHandler for SharedSession {
    fn handle(&self, command: RemoteCommand) -> CommandStatus {
        let result = match command {
            RemoteCommand::Play => self.play(),
            RemoteCommand::Pause => self.pause(),
            RemoteCommand::TogglePlayPause => self.toggle(),
            RemoteCommand::Previous => self.restart_current_track(),
            RemoteCommand::Stop => {
                self.stop();
                Ok(())
            }
            // No queue to advance through yet.
            RemoteCommand::Next => return CommandStatus::Unimplemented,
        };
        match result {
            Ok(()) => CommandStatus::Success,
            Err(e) => CommandStatus::Failed(e.to_string()),
        }
    }
}
