use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::mixer::Mixer;
use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use crate::error::PlaybackError;
use crate::library::metadata;

use super::sink::{create_paused_sink, decode};
use super::types::{AudioOutput, PlayerHandle};

/// The default OS audio device.
///
/// The output stream is owned by a dedicated thread for the lifetime of this
/// value; handles only need the mixer.
pub struct RodioOutput {
    mixer: Mixer,
    shutdown: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl RodioOutput {
    pub fn open_default() -> Result<Self, PlaybackError> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<Mixer, String>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let join = thread::Builder::new()
            .name("tunebox-audio".into())
            .spawn(move || {
                let mut stream = match OutputStreamBuilder::open_default_stream() {
                    Ok(s) => s,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                // rodio logs to stderr when the stream is dropped.
                stream.log_on_drop(false);
                let _ = ready_tx.send(Ok(stream.mixer().clone()));

                // Returns once the owning `RodioOutput` drops its sender.
                let _ = shutdown_rx.recv();
                debug!("audio output closed");
            })
            .map_err(|e| PlaybackError::Output(e.to_string()))?;

        let mixer = ready_rx
            .recv()
            .map_err(|_| PlaybackError::Output("audio thread exited".into()))?
            .map_err(PlaybackError::Output)?;

        Ok(Self {
            mixer,
            shutdown: Some(shutdown_tx),
            join: Some(join),
        })
    }
}

impl Drop for RodioOutput {
    fn drop(&mut self) {
        self.shutdown.take();
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

impl AudioOutput for RodioOutput {
    fn open(&mut self, bytes: Arc<[u8]>) -> Result<Box<dyn PlayerHandle>, PlaybackError> {
        let (sink, decoded) = create_paused_sink(&self.mixer, &bytes)?;
        let duration = decoded
            .or_else(|| metadata::probe_duration(&bytes))
            .unwrap_or_else(|| {
                warn!("could not determine track duration");
                Duration::ZERO
            });
        Ok(Box::new(RodioHandle {
            sink,
            bytes,
            duration,
        }))
    }
}

struct RodioHandle {
    sink: Sink,
    bytes: Arc<[u8]>,
    duration: Duration,
}

impl RodioHandle {
    /// Once a track plays to the end the sink is empty; re-append the buffer
    /// so play/seek keep working.
    fn refill(&mut self) {
        if !self.sink.empty() {
            return;
        }
        match decode(&self.bytes) {
            Ok(source) => self.sink.append(source),
            Err(e) => warn!("cannot re-open finished track: {e}"),
        }
    }
}

impl PlayerHandle for RodioHandle {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn position(&self) -> Duration {
        if self.sink.empty() {
            return self.duration;
        }
        self.sink.get_pos()
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn play(&mut self) {
        self.refill();
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn seek(&mut self, to: Duration) {
        self.refill();
        if let Err(e) = self.sink.try_seek(to) {
            warn!("seek to {:?} failed: {e}", to);
        }
    }

    fn stop(&mut self) {
        self.sink.stop();
    }
}
