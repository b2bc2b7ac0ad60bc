//! Audio output: the seam between the playback session and the decoder.
//!
//! `AudioOutput` turns a byte buffer into a `PlayerHandle`; the rodio-backed
//! implementation keeps the OS output stream alive on its own thread.

mod output;
mod sink;
mod types;

pub use output::RodioOutput;
pub use types::{AudioOutput, PlayerHandle};
