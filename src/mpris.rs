//! MPRIS (`org.mpris.MediaPlayer2`) now-playing surface over the session bus.

use std::collections::HashMap;
use std::fs;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};

use std::time::Duration;

use async_io::{Timer, block_on};
use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;
use zbus::{Connection, fdo, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::now_playing::{CommandStatus, NowPlayingSurface, RemoteCommand, RemoteCommands};
use crate::session::{NowPlaying, SessionSnapshot, SessionState};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const NO_TRACK: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";
const SIGNAL_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct SharedState {
    status: SessionState,
    now_playing: Option<NowPlaying>,
    art_url: Option<String>,
}

/// Handle used by the publisher; the D-Bus service itself runs on its own thread.
pub struct MprisSurface {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
    art_dir: Option<TempDir>,
}

impl MprisSurface {
    /// Write the cover for `np` next to the previous one and return its URL.
    fn store_art(&self, np: &NowPlaying) -> Option<String> {
        let dir = self.art_dir.as_ref()?;
        let art = np.artwork.as_ref()?;
        let path = dir.path().join(format!("{}.img", np.track_id.simple()));
        if !path.exists() {
            if let Err(e) = fs::write(&path, art) {
                warn!("MPRIS: cannot write cover art: {e}");
                return None;
            }
        }
        Some(format!("file://{}", path.display()))
    }
}

impl NowPlayingSurface for MprisSurface {
    fn publish(&self, snapshot: &SessionSnapshot) {
        let art_url = snapshot.now_playing.as_ref().and_then(|np| self.store_art(np));

        let Ok(mut s) = self.state.lock() else {
            return;
        };
        let changed = s.status != snapshot.state
            || s.now_playing.as_ref().map(|n| n.track_id)
                != snapshot.now_playing.as_ref().map(|n| n.track_id);

        let previous_art = std::mem::replace(
            &mut *s,
            SharedState {
                status: snapshot.state,
                now_playing: snapshot.now_playing.clone(),
                art_url,
            },
        )
        .art_url;
        let current_art = s.art_url.clone();
        drop(s);

        if let Some(old) = previous_art.filter(|old| Some(old) != current_art.as_ref()) {
            let _ = fs::remove_file(old.trim_start_matches("file://"));
        }

        if changed {
            let _ = self.notify.send(());
        }
    }
}

struct RootIface {
    identity: String,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No window to raise.
    }

    fn quit(&self) {}

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        &self.identity
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec!["audio/mpeg".to_string()]
    }
}

struct PlayerIface {
    commands: RemoteCommands,
    state: Arc<Mutex<SharedState>>,
}

fn into_reply(status: CommandStatus) -> fdo::Result<()> {
    match status {
        CommandStatus::Success => Ok(()),
        CommandStatus::Failed(reason) => Err(fdo::Error::Failed(reason)),
        CommandStatus::Unimplemented => Err(fdo::Error::NotSupported(
            "command not supported yet".to_string(),
        )),
    }
}

fn owned(v: Value<'_>) -> Option<OwnedValue> {
    OwnedValue::try_from(v).ok()
}

fn track_path(id: Uuid) -> Option<ObjectPath<'static>> {
    ObjectPath::try_from(format!("/org/tunebox/track/{}", id.simple())).ok()
}

fn metadata_map(s: &SharedState) -> HashMap<String, OwnedValue> {
    let mut map = HashMap::new();

    let Some(np) = s.now_playing.as_ref() else {
        if let Some(v) = ObjectPath::try_from(NO_TRACK)
            .ok()
            .and_then(|p| owned(Value::from(p)))
        {
            map.insert("mpris:trackid".to_string(), v);
        }
        return map;
    };

    let entries = [
        (
            "mpris:trackid",
            track_path(np.track_id).and_then(|p| owned(Value::from(p))),
        ),
        ("xesam:title", owned(Value::from(np.title.clone()))),
        ("xesam:artist", owned(Value::from(vec![np.artist.clone()]))),
        ("xesam:album", owned(Value::from(np.album.clone()))),
        (
            "mpris:length",
            owned(Value::from(np.duration.as_micros() as i64)),
        ),
        (
            "mpris:artUrl",
            s.art_url.clone().and_then(|u| owned(Value::from(u))),
        ),
    ];
    for (key, value) in entries {
        if let Some(v) = value {
            map.insert(key.to_string(), v);
        }
    }
    map
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) -> fdo::Result<()> {
        into_reply(self.commands.dispatch(RemoteCommand::Next))
    }

    fn previous(&self) -> fdo::Result<()> {
        into_reply(self.commands.dispatch(RemoteCommand::Previous))
    }

    fn play(&self) -> fdo::Result<()> {
        into_reply(self.commands.dispatch(RemoteCommand::Play))
    }

    fn pause(&self) -> fdo::Result<()> {
        into_reply(self.commands.dispatch(RemoteCommand::Pause))
    }

    fn play_pause(&self) -> fdo::Result<()> {
        into_reply(self.commands.dispatch(RemoteCommand::TogglePlayPause))
    }

    fn stop(&self) -> fdo::Result<()> {
        into_reply(self.commands.dispatch(RemoteCommand::Stop))
    }

    // CanSeek is false; clients must not call these, so they are no-ops.
    fn seek(&self, _offset: i64) {}

    fn set_position(&self, _track_id: OwnedObjectPath, _position: i64) {}

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.status {
            SessionState::Idle => "Stopped",
            SessionState::Playing => "Playing",
            SessionState::Loaded => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        self.state
            .lock()
            .map(|s| s.now_playing.is_some())
            .unwrap_or(false)
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        self.can_play()
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        RemoteCommands::supports(RemoteCommand::Next)
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        RemoteCommands::supports(RemoteCommand::Previous)
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn minimum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn maximum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.now_playing.as_ref().map(|n| n.elapsed.as_micros() as i64))
            .unwrap_or(0)
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        self.state
            .lock()
            .map(|s| metadata_map(&s))
            .unwrap_or_default()
    }
}

/// Keep only characters allowed in a bus name element.
fn bus_name_element(identity: &str) -> String {
    let cleaned: String = identity
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    match cleaned.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{cleaned}"),
        Some(_) => cleaned,
        None => "tunebox".to_string(),
    }
}

/// Collapse queued change notifications. `None` once the surface is gone.
fn pending_change(rx: &Receiver<()>) -> Option<bool> {
    let mut changed = false;
    loop {
        match rx.try_recv() {
            Ok(()) => changed = true,
            Err(TryRecvError::Empty) => return Some(changed),
            Err(TryRecvError::Disconnected) => return None,
        }
    }
}

/// Export the player on the session bus and return the publishing handle.
///
/// Bus failures are logged; the returned surface still accepts snapshots.
pub fn spawn_mpris(identity: &str, commands: RemoteCommands) -> MprisSurface {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();
    let art_dir = tempfile::Builder::new()
        .prefix("tunebox-art")
        .tempdir()
        .map_err(|e| warn!("MPRIS: no cover art directory: {e}"))
        .ok();

    let identity = identity.to_string();
    let bus_name = format!("org.mpris.MediaPlayer2.{}", bus_name_element(&identity));
    let state_for_thread = state.clone();

    std::thread::spawn(move || {
        block_on(async move {
            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!("MPRIS: failed to connect to session bus: {e}");
                    return;
                }
            };

            if let Err(e) = connection.request_name(bus_name.as_str()).await {
                warn!("MPRIS: failed to acquire name {bus_name}: {e}");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server.at(OBJECT_PATH, RootIface { identity }).await {
                warn!("MPRIS: failed to register root iface: {e}");
                return;
            }

            if let Err(e) = object_server
                .at(
                    OBJECT_PATH,
                    PlayerIface {
                        commands,
                        state: state_for_thread,
                    },
                )
                .await
            {
                warn!("MPRIS: failed to register player iface: {e}");
                return;
            }

            let iface_ref = match object_server
                .interface::<_, PlayerIface>(OBJECT_PATH)
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    warn!("MPRIS: player iface lookup failed: {e}");
                    return;
                }
            };
            debug!("MPRIS: exported as {bus_name}");

            // Serve until the surface is dropped.
            while let Some(changed) = pending_change(&notify_rx) {
                if !changed {
                    Timer::after(SIGNAL_POLL).await;
                    continue;
                }
                let iface = iface_ref.get().await;
                let emitter = iface_ref.signal_emitter();
                let _ = iface.playback_status_changed(emitter).await;
                let _ = iface.metadata_changed(emitter).await;
                let _ = iface.can_play_changed(emitter).await;
                let _ = iface.can_pause_changed(emitter).await;
            }
        });
    });

    MprisSurface {
        state,
        notify: notify_tx,
        art_dir,
    }
}
