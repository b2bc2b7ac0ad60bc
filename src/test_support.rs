//! Fixtures shared by the unit tests: tiny MP3 buffers and a fake audio
//! output with a manually advanced clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::audio::{AudioOutput, PlayerHandle};
use crate::error::PlaybackError;

/// ID3v2.3 tag holding ISO-8859-1 text frames.
pub(crate) fn id3v23(frames: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (id, text) in frames {
        let mut payload = vec![0u8];
        payload.extend_from_slice(text.as_bytes());
        body.extend_from_slice(id.as_bytes());
        body.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        body.extend_from_slice(&[0, 0]);
        body.extend_from_slice(&payload);
    }
    let size = body.len() as u32;
    let syncsafe = [
        ((size >> 21) & 0x7f) as u8,
        ((size >> 14) & 0x7f) as u8,
        ((size >> 7) & 0x7f) as u8,
        (size & 0x7f) as u8,
    ];
    let mut out = b"ID3\x03\x00\x00".to_vec();
    out.extend_from_slice(&syncsafe);
    out.extend_from_slice(&body);
    out
}

/// Silent MPEG-1 Layer III frames (128 kbps, 44.1 kHz).
pub(crate) fn mpeg_frames(count: usize) -> Vec<u8> {
    const FRAME_LEN: usize = 417;
    let mut out = Vec::with_capacity(count * FRAME_LEN);
    for _ in 0..count {
        let mut frame = vec![0u8; FRAME_LEN];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
        out.extend_from_slice(&frame);
    }
    out
}

pub(crate) fn mp3_with_tags(frames: &[(&str, &str)]) -> Vec<u8> {
    let mut out = id3v23(frames);
    out.extend_from_slice(&mpeg_frames(16));
    out
}

/// Buffers starting with this marker fail to "decode" in `FakeOutput`.
pub(crate) const CORRUPT: &[u8] = b"CORRUPT";

#[derive(Debug, Default)]
pub(crate) struct FakeClock {
    pub position: Duration,
    pub playing: bool,
    pub live_handles: usize,
    pub opened: usize,
}

pub(crate) type SharedClock = Arc<Mutex<FakeClock>>;

/// Advance the clock of every playing fake handle by `by`.
pub(crate) fn advance(clock: &SharedClock, by: Duration) {
    let mut c = clock.lock().unwrap();
    if c.playing {
        c.position += by;
    }
}

pub(crate) struct FakeOutput {
    pub clock: SharedClock,
    pub duration: Duration,
}

impl FakeOutput {
    pub(crate) fn new(duration: Duration) -> (Self, SharedClock) {
        let clock = SharedClock::default();
        (
            Self {
                clock: clock.clone(),
                duration,
            },
            clock,
        )
    }
}

impl AudioOutput for FakeOutput {
    fn open(&mut self, bytes: Arc<[u8]>) -> Result<Box<dyn PlayerHandle>, PlaybackError> {
        if bytes.is_empty() || bytes.starts_with(CORRUPT) {
            return Err(PlaybackError::Decode("unrecognised format".into()));
        }
        let mut c = self.clock.lock().unwrap();
        c.position = Duration::ZERO;
        c.playing = false;
        c.live_handles += 1;
        c.opened += 1;
        Ok(Box::new(FakeHandle {
            clock: self.clock.clone(),
            duration: self.duration,
        }))
    }
}

struct FakeHandle {
    clock: SharedClock,
    duration: Duration,
}

impl PlayerHandle for FakeHandle {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn position(&self) -> Duration {
        self.clock.lock().unwrap().position
    }

    fn is_finished(&self) -> bool {
        self.clock.lock().unwrap().position >= self.duration
    }

    fn play(&mut self) {
        self.clock.lock().unwrap().playing = true;
    }

    fn pause(&mut self) {
        self.clock.lock().unwrap().playing = false;
    }

    fn seek(&mut self, to: Duration) {
        self.clock.lock().unwrap().position = to;
    }

    fn stop(&mut self) {
        let mut c = self.clock.lock().unwrap();
        c.playing = false;
        c.position = Duration::ZERO;
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        if let Ok(mut c) = self.clock.lock() {
            c.live_handles -= 1;
        }
    }
}
