//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to drive the library,
//! playback and now-playing layers, and helpers to load it from disk.

mod load;
mod schema;

pub use load::{default_config_path, default_library_root, resolve_config_path};
pub use schema::*;
