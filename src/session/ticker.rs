use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use super::shared::SharedSession;
use super::snapshot::SessionSnapshot;

/// Periodically reads the session and hands the snapshot to a callback.
///
/// The ticker never changes session state. Dropping it (or calling `stop`)
/// wakes the thread immediately and joins it.
pub struct ProgressTicker {
    stop: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    pub fn start<F>(session: SharedSession, interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(&SessionSnapshot) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<()>();
        let join = thread::spawn(move || {
            loop {
                match rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => on_tick(&session.snapshot()),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("progress ticker stopped");
        });

        Self {
            stop: Some(tx),
            join: Some(join),
        }
    }

    pub fn is_running(&self) -> bool {
        self.join.as_ref().is_some_and(|j| !j.is_finished())
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
