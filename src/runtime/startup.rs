use std::sync::Arc;

use tracing::debug;

use crate::audio::AudioOutput;
use crate::config;
use crate::mpris::spawn_mpris;
use crate::now_playing::{NowPlayingPublisher, RemoteCommands};
use crate::session::SharedSession;

/// A session wired to its now-playing publisher.
pub struct Player {
    pub session: SharedSession,
    pub publisher: Option<Arc<NowPlayingPublisher>>,
}

/// Build the shared session and, when enabled, export it over MPRIS with the
/// session registered as the remote-command handler.
pub fn start_player(output: Box<dyn AudioOutput>, settings: &config::Settings) -> Player {
    let session = SharedSession::new(output);

    let publisher = settings.now_playing.enabled.then(|| {
        let commands = RemoteCommands::new(Arc::new(session.clone()));
        let surface = spawn_mpris(&settings.now_playing.identity, commands);
        let publisher = Arc::new(NowPlayingPublisher::new(Arc::new(surface)));
        session.add_observer(publisher.clone());
        debug!("now-playing publisher attached");
        publisher
    });

    Player { session, publisher }
}
