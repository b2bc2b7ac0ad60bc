//! Binary entry points: settings resolution, library subcommands and the
//! interactive player.

use std::path::PathBuf;

use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::info;

use crate::audio::RodioOutput;
use crate::cli::{Cli, Command};
use crate::config;
use crate::error::{Error, Result, SessionError, StorageError};
use crate::library::LibraryStore;

mod commands;
mod event_loop;
mod settings;
mod startup;

pub use event_loop::{Action, key_action, status_line};
pub use settings::resolve_settings;
pub use startup::{Player, start_player};

fn library_root(cli: &Cli, settings: &config::Settings) -> Result<PathBuf> {
    cli.library
        .clone()
        .or_else(|| settings.library_root())
        .ok_or_else(|| Error::Config("cannot determine a library directory; pass --library".into()))
}

pub fn run(cli: Cli, settings: config::Settings) -> Result<()> {
    let root = library_root(&cli, &settings)?;
    let mut store = LibraryStore::open(root, settings.library.clone())?;

    match &cli.command {
        Command::List => commands::list(&mut store),
        Command::Import { files } => commands::import(&mut store, files),
        Command::Delete { name } => commands::delete(&mut store, name),
        Command::Play { name } => play(&mut store, name, &settings),
    }
}

fn play(store: &mut LibraryStore, name: &str, settings: &config::Settings) -> Result<()> {
    store.list_tracks();
    let track = store
        .find(name)
        .cloned()
        .ok_or_else(|| StorageError::NotFound(name.to_string()))?;
    let bytes = store.load_bytes(name)?;

    let output = RodioOutput::open_default()?;
    let player = start_player(Box::new(output), settings);

    player
        .session
        .select_track(track, bytes)
        .map_err(SessionError::from)?;
    if settings.playback.autoplay_on_select {
        player.session.play().map_err(SessionError::from)?;
    }
    info!(file = %name, "playing");

    enable_raw_mode()?;
    let run_result = event_loop::run(&player, settings);

    disable_raw_mode()?;
    execute!(std::io::stdout(), crossterm::style::Print("\r\n"))?;

    run_result
}
