//! The on-disk track library: metadata extraction, import sources and the
//! flat-directory store.

pub mod metadata;
mod model;
mod source;
mod store;

pub use metadata::{TrackMetadata, UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_TITLE};
pub use model::{Artwork, Track};
pub use source::{LocalFile, ScopedSource};
pub use store::{LibraryStore, RESERVED_SCRATCH_NAME};

#[cfg(test)]
mod tests;
