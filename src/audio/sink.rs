//! Utilities for creating `rodio` sinks from in-memory buffers.
//!
//! The helper here encapsulates decoding and preparing a paused `Sink`.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::mixer::Mixer;
use rodio::{Decoder, Sink, Source};

use crate::error::PlaybackError;

pub(super) type ByteSource = Decoder<Cursor<Arc<[u8]>>>;

pub(super) fn decode(bytes: &Arc<[u8]>) -> Result<ByteSource, PlaybackError> {
    Decoder::new(Cursor::new(bytes.clone())).map_err(|e| PlaybackError::Decode(e.to_string()))
}

/// Create a paused `Sink` holding `bytes`; also returns the decoder's duration.
pub(super) fn create_paused_sink(
    mixer: &Mixer,
    bytes: &Arc<[u8]>,
) -> Result<(Sink, Option<Duration>), PlaybackError> {
    let source = decode(bytes)?;
    let duration = source.total_duration();

    let sink = Sink::connect_new(mixer);
    sink.pause();
    sink.append(source);
    Ok((sink, duration))
}
