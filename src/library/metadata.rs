//! Tag extraction from in-memory audio buffers.
//!
//! Extraction never fails: anything missing or unreadable falls back to the
//! `UNKNOWN_*` defaults and absent artwork.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use lofty::file::{AudioFile, TaggedFile, TaggedFileExt};
use lofty::picture::PictureType;
use lofty::probe::Probe;
use lofty::tag::{Accessor, Tag};
use tracing::debug;

use super::model::Artwork;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

#[derive(Clone, Debug, PartialEq)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork: Option<Artwork>,
    pub duration: Option<Duration>,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            title: UNKNOWN_TITLE.to_string(),
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            artwork: None,
            duration: None,
        }
    }
}

#[derive(Default)]
struct Scan {
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    artwork: Option<Artwork>,
}

impl Scan {
    fn absorb(&mut self, tag: &Tag) {
        if let Some(v) = non_blank(tag.title()) {
            self.title = Some(v);
        }
        if let Some(v) = non_blank(tag.artist()) {
            self.artist = Some(v);
        }
        if let Some(v) = non_blank(tag.album()) {
            self.album = Some(v);
        }
        let picture = tag
            .pictures()
            .iter()
            .find(|p| p.pic_type() == PictureType::CoverFront)
            .or_else(|| tag.pictures().first());
        if let Some(p) = picture.filter(|p| !p.data().is_empty()) {
            self.artwork = Some(Arc::from(p.data()));
        }
    }
}

fn non_blank(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn probe(bytes: &[u8]) -> Option<TaggedFile> {
    let probe = match Probe::new(Cursor::new(bytes)).guess_file_type() {
        Ok(p) => p,
        Err(e) => {
            debug!("metadata probe failed: {e}");
            return None;
        }
    };
    match probe.read() {
        Ok(tagged) => Some(tagged),
        Err(e) => {
            debug!("metadata read failed: {e}");
            None
        }
    }
}

/// Extract title, artist, album and artwork from `bytes`.
///
/// Every tag in the container is visited once, in file order; for duplicate
/// keys the last value seen wins.
pub fn extract(bytes: &[u8]) -> TrackMetadata {
    let Some(tagged) = probe(bytes) else {
        return TrackMetadata::default();
    };

    let mut scan = Scan::default();
    for tag in tagged.tags() {
        scan.absorb(tag);
    }

    let duration = Some(tagged.properties().duration()).filter(|d| !d.is_zero());

    TrackMetadata {
        title: scan.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        artist: scan.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        album: scan.album.unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
        artwork: scan.artwork,
        duration,
    }
}

/// Container duration, if the header carries one.
pub fn probe_duration(bytes: &[u8]) -> Option<Duration> {
    probe(bytes)
        .map(|t| t.properties().duration())
        .filter(|d| !d.is_zero())
}
