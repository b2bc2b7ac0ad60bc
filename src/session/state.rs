use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::audio::{AudioOutput, PlayerHandle};
use crate::error::{InvalidStateError, PlaybackError};
use crate::library::{Track, TrackMetadata, metadata};

use super::SessionObserver;
use super::snapshot::{NowPlaying, SessionSnapshot, SessionState};

/// A loaded track and its handle. Both exist together or not at all.
struct LoadedTrack {
    track: Track,
    metadata: TrackMetadata,
    handle: Box<dyn PlayerHandle>,
    duration: Duration,
}

/// Idle / Loaded / Playing state machine over a single player handle.
pub struct PlaybackSession {
    output: Box<dyn AudioOutput>,
    loaded: Option<LoadedTrack>,
    playing: bool,
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl PlaybackSession {
    pub fn new(output: Box<dyn AudioOutput>) -> Self {
        Self {
            output,
            loaded: None,
            playing: false,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> SessionState {
        match &self.loaded {
            None => SessionState::Idle,
            Some(l) if self.playing && !l.handle.is_finished() => SessionState::Playing,
            Some(_) => SessionState::Loaded,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.loaded.as_ref().map(|l| &l.track)
    }

    /// Elapsed position, clamped into `[0, duration]`.
    pub fn position(&self) -> Duration {
        self.loaded
            .as_ref()
            .map_or(Duration::ZERO, |l| l.handle.position().min(l.duration))
    }

    pub fn duration(&self) -> Duration {
        self.loaded.as_ref().map_or(Duration::ZERO, |l| l.duration)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let now_playing = self.loaded.as_ref().map(|l| NowPlaying {
            track_id: l.track.id,
            file_name: l.track.file_name.clone(),
            title: l.metadata.title.clone(),
            artist: l.metadata.artist.clone(),
            album: l.metadata.album.clone(),
            artwork: l.metadata.artwork.clone(),
            duration: l.duration,
            elapsed: self.position(),
        });
        SessionSnapshot {
            state: self.state(),
            now_playing,
        }
    }

    fn notify(&self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for o in &self.observers {
            o.session_changed(&snapshot);
        }
    }

    fn invalid(&self, operation: &'static str) -> InvalidStateError {
        InvalidStateError {
            operation,
            state: self.state(),
        }
    }

    /// A handle that ran to its end is paused where it stopped, so the
    /// session reads `Loaded` and the next `play` starts it over.
    fn settle(&mut self) {
        if !self.playing {
            return;
        }
        if let Some(l) = self.loaded.as_mut().filter(|l| l.handle.is_finished()) {
            l.handle.pause();
            self.playing = false;
            debug!(file = %l.track.file_name, "track finished");
        }
    }

    /// Stop and drop the current handle, if any. Returns whether one existed.
    fn release(&mut self) -> bool {
        self.playing = false;
        match self.loaded.take() {
            Some(mut l) => {
                l.handle.stop();
                debug!(file = %l.track.file_name, "released player handle");
                true
            }
            None => false,
        }
    }

    /// Load `track` from `bytes`, replacing whatever was loaded.
    ///
    /// The previous handle is released before decoding starts. On success the
    /// session is `Loaded` at position zero; on decode failure it is `Idle`.
    pub fn select_track(&mut self, track: Track, bytes: Vec<u8>) -> Result<(), PlaybackError> {
        let had_track = self.release();

        let bytes: Arc<[u8]> = bytes.into();
        let handle = match self.output.open(bytes.clone()) {
            Ok(h) => h,
            Err(e) => {
                debug!(file = %track.file_name, "decode failed: {e}");
                if had_track {
                    self.notify();
                }
                return Err(e);
            }
        };

        let metadata = metadata::extract(&bytes);
        let duration = handle.duration();
        debug!(file = %track.file_name, ?duration, "track loaded");
        self.loaded = Some(LoadedTrack {
            track,
            metadata,
            handle,
            duration,
        });
        self.notify();
        Ok(())
    }

    /// `Loaded -> Playing`. No-op when already playing. A finished track
    /// starts again from zero.
    pub fn play(&mut self) -> Result<(), InvalidStateError> {
        self.settle();
        let Some(l) = self.loaded.as_mut() else {
            return Err(self.invalid("play"));
        };
        if self.playing {
            return Ok(());
        }
        if l.handle.is_finished() {
            l.handle.seek(Duration::ZERO);
        }
        l.handle.play();
        self.playing = true;
        self.notify();
        Ok(())
    }

    /// `Playing -> Loaded`. No-op when already paused.
    pub fn pause(&mut self) -> Result<(), InvalidStateError> {
        self.settle();
        let Some(l) = self.loaded.as_mut() else {
            return Err(self.invalid("pause"));
        };
        if !self.playing {
            return Ok(());
        }
        l.handle.pause();
        self.playing = false;
        self.notify();
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<(), InvalidStateError> {
        self.settle();
        if self.playing { self.pause() } else { self.play() }
    }

    /// Move to `seconds`, clamped into `[0, duration]`. Play state is kept.
    pub fn seek(&mut self, seconds: f64) -> Result<(), InvalidStateError> {
        self.settle();
        let Some(l) = self.loaded.as_mut() else {
            return Err(self.invalid("seek"));
        };
        let max = l.duration.as_secs_f64();
        let target = if seconds.is_nan() {
            0.0
        } else {
            seconds.clamp(0.0, max)
        };
        let to = Duration::from_secs_f64(target).min(l.duration);
        l.handle.seek(to);
        debug!(?to, "seek");
        self.notify();
        Ok(())
    }

    /// Jump back to zero and play.
    pub fn restart_current_track(&mut self) -> Result<(), InvalidStateError> {
        let Some(l) = self.loaded.as_mut() else {
            return Err(self.invalid("restart"));
        };
        l.handle.seek(Duration::ZERO);
        l.handle.play();
        self.playing = true;
        self.notify();
        Ok(())
    }

    /// Release the handle and go `Idle`.
    pub fn stop(&mut self) {
        if self.release() {
            self.notify();
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.release();
    }
}
