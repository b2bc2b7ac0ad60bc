//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tunebox")]
#[command(about = "Import, list and play tracks from a local music library")]
pub struct Cli {
    /// Library directory (overrides `library.root` from the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub library: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the tracks in the library
    List,
    /// Copy audio files into the library, overwriting same-named tracks
    Import {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },
    /// Delete a track by file name
    Delete { name: String },
    /// Play a track by file name with keyboard transport controls
    Play { name: String },
}
