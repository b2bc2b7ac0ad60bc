//! The playback session: one loaded track at a time, transport commands, and
//! the snapshot observers see after every change.

mod shared;
mod snapshot;
mod state;
mod ticker;

pub use shared::SharedSession;
pub use snapshot::{NowPlaying, SessionSnapshot, SessionState, format_time};
pub use state::PlaybackSession;
pub use ticker::ProgressTicker;

/// Receives the full session snapshot after each transition.
pub trait SessionObserver: Send + Sync {
    fn session_changed(&self, snapshot: &SessionSnapshot);
}
