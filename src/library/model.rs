use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::metadata::TrackMetadata;

/// Embedded cover art bytes, shared between the listing and the session.
pub type Artwork = Arc<[u8]>;

/// One imported audio file with its display metadata.
///
/// `id` is generated per process and never persisted; `file_name` is the
/// stable identifier inside the library directory.
#[derive(Clone, Debug)]
pub struct Track {
    pub id: Uuid,
    pub file_name: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork: Option<Artwork>,
    pub duration: Option<Duration>,
}

impl Track {
    pub fn new(file_name: impl Into<String>, metadata: TrackMetadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            title: metadata.title,
            artist: metadata.artist,
            album: metadata.album,
            artwork: metadata.artwork,
            duration: metadata.duration,
        }
    }

    /// "Artist - Title", the way lists and the status line show a track.
    pub fn display(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}
