//! tunebox: a local music library with a single playback session and
//! MPRIS now-playing integration.

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod library;
pub mod mpris;
pub mod now_playing;
pub mod runtime;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Error, Result};
