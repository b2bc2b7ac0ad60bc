use std::fmt;
use std::time::Duration;

use uuid::Uuid;

use crate::library::Artwork;

/// Where the session is in its lifecycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No track loaded.
    #[default]
    Idle,
    /// Track loaded, paused.
    Loaded,
    /// Track loaded, position advancing.
    Playing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Idle => "idle",
            SessionState::Loaded => "paused",
            SessionState::Playing => "playing",
        })
    }
}

/// What is loaded right now, as shown on the now-playing surface.
#[derive(Clone, Debug, PartialEq)]
pub struct NowPlaying {
    pub track_id: Uuid,
    pub file_name: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork: Option<Artwork>,
    pub duration: Duration,
    pub elapsed: Duration,
}

impl NowPlaying {
    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed)
    }
}

/// Read-only view of the session for binding to a front end.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub now_playing: Option<NowPlaying>,
}

impl SessionSnapshot {
    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }

    /// Elapsed position in seconds; 0 when idle.
    pub fn position_secs(&self) -> f64 {
        self.now_playing
            .as_ref()
            .map_or(0.0, |n| n.elapsed.as_secs_f64())
    }

    pub fn duration_secs(&self) -> f64 {
        self.now_playing
            .as_ref()
            .map_or(0.0, |n| n.duration.as_secs_f64())
    }
}

/// Render a position as `mm:ss`, zero padded; minutes keep growing past an hour.
pub fn format_time(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
