//! Now-playing publishing and remote transport commands.
//!
//! The publisher pushes whole session snapshots to a `NowPlayingSurface`
//! (the OS media display). Commands coming back from that surface go through
//! a `RemoteCommands` registration built once at start-up.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::session::{SessionObserver, SessionSnapshot};

/// Transport commands an OS media surface can send.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RemoteCommand {
    Play,
    Pause,
    TogglePlayPause,
    Next,
    Previous,
    Stop,
}

/// Outcome reported back to the surface for a remote command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failed(String),
    /// The command is recognised but not supported yet.
    Unimplemented,
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandStatus::Success => f.write_str("success"),
            CommandStatus::Failed(reason) => write!(f, "failed: {reason}"),
            CommandStatus::Unimplemented => f.write_str("unimplemented"),
        }
    }
}

/// Carries out remote commands; implemented by the shared session.
pub trait RemoteCommandHandler: Send + Sync {
    fn handle(&self, command: RemoteCommand) -> CommandStatus;
}

/// The handler registered for remote commands.
#[derive(Clone)]
pub struct RemoteCommands {
    handler: Arc<dyn RemoteCommandHandler>,
}

impl RemoteCommands {
    pub fn new(handler: Arc<dyn RemoteCommandHandler>) -> Self {
        Self { handler }
    }

    pub fn dispatch(&self, command: RemoteCommand) -> CommandStatus {
        let status = self.handler.handle(command);
        match &status {
            CommandStatus::Failed(reason) => warn!(?command, "remote command failed: {reason}"),
            _ => debug!(?command, %status, "remote command"),
        }
        status
    }

    /// Whether the surface should advertise `command` as available.
    pub fn supports(command: RemoteCommand) -> bool {
        !matches!(command, RemoteCommand::Next)
    }
}

/// An OS-level now-playing display.
pub trait NowPlayingSurface: Send + Sync {
    /// Replace everything the surface shows with `snapshot`.
    fn publish(&self, snapshot: &SessionSnapshot);
}

/// Forwards session snapshots to a surface.
pub struct NowPlayingPublisher {
    surface: Arc<dyn NowPlayingSurface>,
}

impl NowPlayingPublisher {
    pub fn new(surface: Arc<dyn NowPlayingSurface>) -> Self {
        Self { surface }
    }

    pub fn publish(&self, snapshot: &SessionSnapshot) {
        self.surface.publish(snapshot);
    }
}

impl SessionObserver for NowPlayingPublisher {
    fn session_changed(&self, snapshot: &SessionSnapshot) {
        self.publish(snapshot);
    }
}
