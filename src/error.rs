//! Error types for tunebox.
//!
//! Each layer has its own enum so callers can tell a storage failure from a
//! decode failure; `Error` wraps all of them for the binary.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionState;

/// Failures of the on-disk library directory.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("cannot create library directory {path:?}: {source}")]
    CreateRoot { path: PathBuf, source: io::Error },

    #[error("cannot enumerate {path:?}: {source}")]
    Enumerate { path: PathBuf, source: walkdir::Error },

    #[error("no such track: {0}")]
    NotFound(String),

    #[error("cannot read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot delete {path:?}: {source}")]
    Delete { path: PathBuf, source: io::Error },

    #[error("invalid track file name: {0:?}")]
    InvalidName(String),
}

/// Failures while copying a user-chosen file into the library.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("access to {0} was not granted")]
    AccessDenied(String),

    #[error("import source has no file name")]
    MissingFileName,

    #[error("invalid import file name: {0:?}")]
    InvalidFileName(String),

    #[error("cannot open {name}: {source}")]
    Open { name: String, source: io::Error },

    #[error("cannot copy {name} into the library: {source}")]
    Copy { name: String, source: io::Error },
}

/// The audio bytes could not be turned into a playable handle.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("cannot decode audio: {0}")]
    Decode(String),

    #[error("audio output unavailable: {0}")]
    Output(String),
}

/// A transport command was issued in a state that forbids it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot {operation} while {state}")]
pub struct InvalidStateError {
    pub operation: &'static str,
    pub state: SessionState,
}

/// Errors surfaced by session transitions.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
}

/// Top-level error type for the binary and for callers that chain layers.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
