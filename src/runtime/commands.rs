use crate::error::{Error, Result};
use crate::library::{LibraryStore, LocalFile, Track};
use crate::session::format_time;

fn describe(track: &Track) -> String {
    let length = track
        .duration
        .map(format_time)
        .unwrap_or_else(|| "--:--".to_string());
    format!("{:<40} {} [{}]", track.file_name, track.display(), length)
}

pub fn list(store: &mut LibraryStore) -> Result<()> {
    let tracks = store.list_tracks();
    if tracks.is_empty() {
        println!("Library is empty: {}", store.root().display());
        return Ok(());
    }
    for t in tracks {
        println!("{}", describe(t));
    }
    Ok(())
}

/// Import every file, reporting each outcome; fails if any import failed.
pub fn import(store: &mut LibraryStore, files: &[std::path::PathBuf]) -> Result<()> {
    let mut first_error: Option<Error> = None;
    for file in files {
        match store.import_file(&LocalFile::new(file)) {
            Ok(track) => println!("imported {}", describe(&track)),
            Err(e) => {
                eprintln!("couldn't import {}: {e}", file.display());
                first_error.get_or_insert(e.into());
            }
        }
    }
    first_error.map_or(Ok(()), Err)
}

pub fn delete(store: &mut LibraryStore, name: &str) -> Result<()> {
    store.list_tracks();
    store.delete_track(name)?;
    println!("deleted {name}");
    Ok(())
}
