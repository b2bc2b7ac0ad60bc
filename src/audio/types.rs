//! Traits implemented by audio backends.

use std::sync::Arc;
use std::time::Duration;

use crate::error::PlaybackError;

/// Opens decoded player handles. One output serves the whole process.
pub trait AudioOutput: Send {
    /// Decode `bytes` into a paused handle positioned at zero.
    fn open(&mut self, bytes: Arc<[u8]>) -> Result<Box<dyn PlayerHandle>, PlaybackError>;
}

/// A single decoded track attached to the output.
pub trait PlayerHandle: Send {
    /// Total length; zero when the container does not say.
    fn duration(&self) -> Duration;
    /// Elapsed playback position.
    fn position(&self) -> Duration;
    /// True once the track has played through to its end.
    fn is_finished(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, to: Duration);
    /// Silence the handle; it is dropped right after.
    fn stop(&mut self);
}
