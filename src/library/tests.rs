use std::cell::Cell;
use std::fs;
use std::io::{self, Read};

use tempfile::tempdir;

use super::*;
use crate::config::LibrarySettings;
use crate::error::{ImportError, StorageError};
use crate::test_support::mp3_with_tags;

fn open_store(dir: &std::path::Path) -> LibraryStore {
    LibraryStore::open(dir, LibrarySettings::default()).unwrap()
}

/// Records grant/release calls so tests can check the grant never leaks.
struct Picked {
    name: Option<String>,
    bytes: Vec<u8>,
    grant: bool,
    fail_open: bool,
    started: Cell<u32>,
    stopped: Cell<u32>,
}

impl Picked {
    fn new(name: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: Some(name.to_string()),
            bytes,
            grant: true,
            fail_open: false,
            started: Cell::new(0),
            stopped: Cell::new(0),
        }
    }
}

impl ScopedSource for Picked {
    fn file_name(&self) -> Option<String> {
        self.name.clone()
    }

    fn start_access(&self) -> bool {
        self.started.set(self.started.get() + 1);
        self.grant
    }

    fn stop_access(&self) {
        self.stopped.set(self.stopped.get() + 1);
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        if self.fail_open {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "nope"));
        }
        Ok(Box::new(self.bytes.as_slice()))
    }
}

#[test]
fn open_creates_missing_root() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("nested").join("library");
    let store = LibraryStore::open(&root, LibrarySettings::default()).unwrap();
    assert!(root.is_dir());
    assert_eq!(store.root(), root.as_path());
    assert!(store.tracks().is_empty());
}

#[test]
fn list_filters_extensions_hidden_and_reserved_scratch_name() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.mp3"), b"not a real mp3").unwrap();
    fs::write(dir.path().join("A.MP3"), b"not a real mp3").unwrap();
    fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();
    fs::write(dir.path().join(".hidden.mp3"), b"ignore me").unwrap();
    fs::write(dir.path().join(RESERVED_SCRATCH_NAME), b"scratch").unwrap();
    fs::create_dir(dir.path().join("sub.mp3")).unwrap();

    let mut store = open_store(dir.path());
    let names: Vec<String> = store
        .list_tracks()
        .iter()
        .map(|t| t.file_name.clone())
        .collect();
    assert_eq!(names, vec!["A.MP3".to_string(), "b.mp3".to_string()]);
}

#[test]
fn list_uses_defaults_for_untagged_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("raw.mp3"), b"no tags here").unwrap();

    let mut store = open_store(dir.path());
    let tracks = store.list_tracks();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].title, UNKNOWN_TITLE);
    assert_eq!(tracks[0].artist, UNKNOWN_ARTIST);
    assert_eq!(tracks[0].album, UNKNOWN_ALBUM);
    assert!(tracks[0].artwork.is_none());
}

#[test]
fn list_of_vanished_root_is_empty_not_an_error() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("lib");
    let mut store = open_store(&root);
    fs::remove_dir(&root).unwrap();
    assert!(store.list_tracks().is_empty());
}

#[test]
fn track_ids_are_unique_per_listing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.mp3"), b"x").unwrap();
    let mut store = open_store(dir.path());
    let first = store.list_tracks()[0].id;
    let second = store.list_tracks()[0].id;
    assert_ne!(first, second);
}

#[test]
fn import_then_list_has_exactly_one_entry_with_original_name() {
    let dir = tempdir().unwrap();
    let mut store = open_store(dir.path());
    let source = Picked::new("Song.mp3", mp3_with_tags(&[("TIT2", "Song Title")]));

    let imported = store.import_file(&source).unwrap();
    assert_eq!(imported.file_name, "Song.mp3");
    assert_eq!(imported.title, "Song Title");
    assert_eq!(source.started.get(), 1);
    assert_eq!(source.stopped.get(), 1);

    let listed = store.list_tracks();
    assert_eq!(listed.iter().filter(|t| t.file_name == "Song.mp3").count(), 1);
    assert_eq!(listed.len(), 1);
}

#[test]
fn reimport_overwrites_existing_file() {
    let dir = tempdir().unwrap();
    let mut store = open_store(dir.path());

    store
        .import_file(&Picked::new("dup.mp3", b"first".to_vec()))
        .unwrap();
    store
        .import_file(&Picked::new("dup.mp3", b"second".to_vec()))
        .unwrap();

    assert_eq!(store.tracks().len(), 1);
    assert_eq!(store.load_bytes("dup.mp3").unwrap(), b"second");
    assert_eq!(store.list_tracks().len(), 1);
}

#[test]
fn import_leaves_no_temp_files_behind() {
    let dir = tempdir().unwrap();
    let mut store = open_store(dir.path());
    store
        .import_file(&Picked::new("one.mp3", b"bytes".to_vec()))
        .unwrap();

    let entries: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("one.mp3")]);
}

#[test]
fn import_refused_grant_is_access_denied() {
    let dir = tempdir().unwrap();
    let mut store = open_store(dir.path());
    let mut source = Picked::new("x.mp3", b"x".to_vec());
    source.grant = false;

    let err = store.import_file(&source).unwrap_err();
    assert!(matches!(err, ImportError::AccessDenied(ref n) if n == "x.mp3"));
    assert_eq!(source.stopped.get(), 0);
    assert!(store.tracks().is_empty());
}

#[test]
fn import_open_failure_still_releases_grant() {
    let dir = tempdir().unwrap();
    let mut store = open_store(dir.path());
    let mut source = Picked::new("x.mp3", b"x".to_vec());
    source.fail_open = true;

    let err = store.import_file(&source).unwrap_err();
    assert!(matches!(err, ImportError::Open { .. }));
    assert_eq!(source.started.get(), 1);
    assert_eq!(source.stopped.get(), 1);
    assert!(!dir.path().join("x.mp3").exists());
}

#[test]
fn import_rejects_unusable_names() {
    let dir = tempdir().unwrap();
    let mut store = open_store(dir.path());

    let mut nameless = Picked::new("", b"x".to_vec());
    nameless.name = None;
    assert!(matches!(
        store.import_file(&nameless),
        Err(ImportError::MissingFileName)
    ));

    let traversal = Picked::new("../escape.mp3", b"x".to_vec());
    assert!(matches!(
        store.import_file(&traversal),
        Err(ImportError::InvalidFileName(_))
    ));
    assert_eq!(traversal.started.get(), 0);

    let scratch = Picked::new(RESERVED_SCRATCH_NAME, b"x".to_vec());
    assert!(matches!(
        store.import_file(&scratch),
        Err(ImportError::InvalidFileName(_))
    ));
}

#[test]
fn import_refuses_names_the_listing_would_hide() {
    let dir = tempdir().unwrap();
    let mut store = open_store(dir.path());

    for name in ["song.wav", ".hidden.mp3", "no-extension"] {
        let source = Picked::new(name, b"x".to_vec());
        assert!(
            matches!(store.import_file(&source), Err(ImportError::InvalidFileName(_))),
            "{name} should be refused"
        );
        assert_eq!(source.started.get(), 0);
        assert!(!dir.path().join(name).exists());
    }
    assert!(store.tracks().is_empty());
    assert!(store.list_tracks().is_empty());
}

#[test]
fn import_honours_configured_extensions_and_hidden_files() {
    let dir = tempdir().unwrap();
    let settings = LibrarySettings {
        extensions: vec!["mp3".into(), "wav".into()],
        include_hidden: true,
        ..LibrarySettings::default()
    };
    let mut store = LibraryStore::open(dir.path(), settings).unwrap();

    store.import_file(&Picked::new("song.wav", b"x".to_vec())).unwrap();
    store.import_file(&Picked::new(".hidden.mp3", b"x".to_vec())).unwrap();
    let imported: Vec<String> = store.tracks().iter().map(|t| t.file_name.clone()).collect();

    let listed: Vec<String> = store
        .list_tracks()
        .iter()
        .map(|t| t.file_name.clone())
        .collect();
    assert_eq!(listed, vec![".hidden.mp3", "song.wav"]);
    assert_eq!(imported, listed);
}

#[test]
fn import_local_file_copies_bytes() {
    let src_dir = tempdir().unwrap();
    let src = src_dir.path().join("picked.mp3");
    fs::write(&src, b"local bytes").unwrap();

    let dir = tempdir().unwrap();
    let mut store = open_store(dir.path());
    let track = store.import_file(&LocalFile::new(&src)).unwrap();
    assert_eq!(track.file_name, "picked.mp3");
    assert_eq!(store.load_bytes("picked.mp3").unwrap(), b"local bytes");
}

#[test]
fn import_missing_local_file_is_access_denied() {
    let dir = tempdir().unwrap();
    let mut store = open_store(dir.path());
    let err = store
        .import_file(&LocalFile::new(dir.path().join("nope.mp3")))
        .unwrap_err();
    assert!(matches!(err, ImportError::AccessDenied(_)));
}

#[test]
fn delete_then_list_excludes_name() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("keep.mp3"), b"x").unwrap();
    fs::write(dir.path().join("drop.mp3"), b"x").unwrap();
    let mut store = open_store(dir.path());
    store.list_tracks();

    store.delete_track("drop.mp3").unwrap();
    assert!(store.find("drop.mp3").is_none());
    assert!(!dir.path().join("drop.mp3").exists());

    let names: Vec<String> = store
        .list_tracks()
        .iter()
        .map(|t| t.file_name.clone())
        .collect();
    assert_eq!(names, vec!["keep.mp3".to_string()]);
}

#[test]
fn delete_missing_name_errors_and_keeps_listing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("keep.mp3"), b"x").unwrap();
    let mut store = open_store(dir.path());
    store.list_tracks();
    let before: Vec<_> = store.tracks().iter().map(|t| t.id).collect();

    let err = store.delete_track("ghost.mp3").unwrap_err();
    assert!(matches!(err, StorageError::NotFound(ref n) if n == "ghost.mp3"));

    let after: Vec<_> = store.tracks().iter().map(|t| t.id).collect();
    assert_eq!(before, after);
}

#[test]
fn delete_of_listed_but_vanished_file_keeps_entry() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("gone.mp3"), b"x").unwrap();
    let mut store = open_store(dir.path());
    store.list_tracks();
    fs::remove_file(dir.path().join("gone.mp3")).unwrap();

    assert!(store.delete_track("gone.mp3").is_err());
    assert!(store.find("gone.mp3").is_some());
}

#[test]
fn delete_rejects_path_like_names() {
    let dir = tempdir().unwrap();
    let mut store = open_store(dir.path());
    assert!(matches!(
        store.delete_track("../outside.mp3"),
        Err(StorageError::InvalidName(_))
    ));
}

#[test]
fn load_bytes_reports_missing_file() {
    let dir = tempdir().unwrap();
    let store = open_store(dir.path());
    assert!(matches!(
        store.load_bytes("missing.mp3"),
        Err(StorageError::NotFound(_))
    ));
}
