use std::io::{Write, stdout};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, execute, style::Print};
use tracing::{debug, warn};

use crate::config;
use crate::error::Result;
use crate::now_playing::{CommandStatus, RemoteCommand, RemoteCommandHandler};
use crate::session::{
    ProgressTicker, SessionSnapshot, SessionState, SharedSession, format_time,
};

use super::startup::Player;

/// What a key press asks the player to do.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Action {
    Remote(RemoteCommand),
    SeekBy(f64),
    Restart,
    Quit,
}

/// Map a key to an action; `scrub_seconds` is the `h`/`l` step.
pub fn key_action(key: KeyEvent, scrub_seconds: u64) -> Option<Action> {
    let scrub = scrub_seconds as f64;
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(' ') => Some(Action::Remote(RemoteCommand::TogglePlayPause)),
        KeyCode::Char('h') | KeyCode::Left => Some(Action::SeekBy(-scrub)),
        KeyCode::Char('l') | KeyCode::Right => Some(Action::SeekBy(scrub)),
        KeyCode::Char('0') => Some(Action::Restart),
        KeyCode::Char('p') => Some(Action::Remote(RemoteCommand::Previous)),
        KeyCode::Char('n') => Some(Action::Remote(RemoteCommand::Next)),
        _ => None,
    }
}

/// One-line rendering of the session for the terminal.
pub fn status_line(snapshot: &SessionSnapshot) -> String {
    let Some(np) = snapshot.now_playing.as_ref() else {
        return "No song playing".to_string();
    };
    let icon = match snapshot.state {
        SessionState::Playing => "▶",
        _ => "⏸",
    };
    format!(
        "{icon} {} - {}  {} / {} (-{})",
        np.artist,
        np.title,
        format_time(np.elapsed),
        format_time(np.duration),
        format_time(np.remaining()),
    )
}

fn draw(line: &str) {
    let mut out = stdout();
    let _ = execute!(
        out,
        cursor::MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(line)
    );
    let _ = out.flush();
}

/// Apply `action`; returns `true` when the loop should end.
fn apply(action: Action, session: &SharedSession) -> bool {
    let outcome = match action {
        Action::Quit => return true,
        Action::Remote(cmd) => session.handle(cmd),
        Action::SeekBy(delta) => {
            let target = session.snapshot().position_secs() + delta;
            match session.seek(target) {
                Ok(()) => CommandStatus::Success,
                Err(e) => CommandStatus::Failed(e.to_string()),
            }
        }
        Action::Restart => match session.restart_current_track() {
            Ok(()) => CommandStatus::Success,
            Err(e) => CommandStatus::Failed(e.to_string()),
        },
    };

    match outcome {
        CommandStatus::Success => draw(&status_line(&session.snapshot())),
        CommandStatus::Unimplemented => draw("Next track is not supported yet"),
        CommandStatus::Failed(reason) => {
            warn!(?action, "{reason}");
            draw(&format!("Couldn't do that: {reason}"));
        }
    }
    false
}

/// Keyboard loop for a loaded player. Returns when the user quits.
pub fn run(player: &Player, settings: &config::Settings) -> Result<()> {
    let session = player.session.clone();
    let publisher = player.publisher.clone();

    // The ticker lives exactly as long as this view.
    let ticker = ProgressTicker::start(
        session.clone(),
        Duration::from_millis(settings.playback.tick_interval_ms),
        move |snapshot| {
            if let Some(p) = &publisher {
                p.publish(snapshot);
            }
            draw(&status_line(snapshot));
        },
    );

    draw(&status_line(&session.snapshot()));

    loop {
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let Some(action) = key_action(key, settings.playback.scrub_seconds) else {
            continue;
        };
        debug!(?action, "key");
        if apply(action, &session) {
            break;
        }
    }

    ticker.stop();
    session.stop();
    Ok(())
}
