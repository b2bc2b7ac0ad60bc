use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::{ImportError, StorageError};

use super::metadata;
use super::model::Track;
use super::source::{ScopedAccess, ScopedSource};

/// Scratch name older builds wrote the playing buffer to. Never listed.
pub const RESERVED_SCRATCH_NAME: &str = "temp.mp3";

/// Flat directory of imported audio files plus the in-memory listing.
pub struct LibraryStore {
    root: PathBuf,
    settings: LibrarySettings,
    tracks: Vec<Track>,
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// A usable track name is exactly one normal path component.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    ) && !name.contains('/')
        && !name.contains('\\')
}

impl LibraryStore {
    /// Open (creating if needed) the library directory at `root`.
    pub fn open(root: impl Into<PathBuf>, settings: LibrarySettings) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::CreateRoot {
            path: root.clone(),
            source,
        })?;
        debug!(root = ?root, "library opened");
        Ok(Self {
            root,
            settings,
            tracks: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The listing as of the last `list_tracks`, import or delete.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn find(&self, file_name: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.file_name == file_name)
    }

    fn path_for(&self, file_name: &str) -> Result<PathBuf, StorageError> {
        if !is_plain_file_name(file_name) {
            return Err(StorageError::InvalidName(file_name.to_string()));
        }
        Ok(self.root.join(file_name))
    }

    fn is_listable(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            return false;
        };
        name != RESERVED_SCRATCH_NAME
            && (self.settings.include_hidden || !is_hidden(name))
            && is_audio_file(path, &self.settings)
    }

    /// Re-enumerate the library directory and rebuild the listing.
    ///
    /// Read failures are logged and skipped, so the result may be partial or
    /// empty but the call itself never fails.
    pub fn list_tracks(&mut self) -> &[Track] {
        let mut tracks = Vec::new();

        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(e) => e,
                Err(source) => {
                    let err = StorageError::Enumerate {
                        path: self.root.clone(),
                        source,
                    };
                    warn!("{err}");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !self.is_listable(path) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };

            match fs::read(path) {
                Ok(bytes) => tracks.push(Track::new(file_name, metadata::extract(&bytes))),
                Err(source) => {
                    let err = StorageError::Read {
                        path: path.to_path_buf(),
                        source,
                    };
                    warn!("{err}");
                }
            }
        }

        tracks.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        debug!(count = tracks.len(), "library listed");
        self.tracks = tracks;
        &self.tracks
    }

    /// Copy a user-chosen file into the library under its original name.
    ///
    /// An existing file with the same name is overwritten. Names the listing
    /// would skip are refused before access is requested. The access grant is
    /// held only while the source is read and is released on every path.
    pub fn import_file(&mut self, source: &dyn ScopedSource) -> Result<Track, ImportError> {
        let name = source.file_name().ok_or(ImportError::MissingFileName)?;
        if !is_plain_file_name(&name) || !self.is_listable(Path::new(&name)) {
            return Err(ImportError::InvalidFileName(name));
        }

        let bytes = {
            let _access =
                ScopedAccess::acquire(source).ok_or_else(|| ImportError::AccessDenied(name.clone()))?;
            let mut reader = source.open().map_err(|e| ImportError::Open {
                name: name.clone(),
                source: e,
            })?;
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).map_err(|e| ImportError::Open {
                name: name.clone(),
                source: e,
            })?;
            bytes
        };

        self.persist(&name, &bytes).map_err(|e| ImportError::Copy {
            name: name.clone(),
            source: e,
        })?;

        let track = Track::new(name.clone(), metadata::extract(&bytes));
        match self.tracks.iter_mut().find(|t| t.file_name == name) {
            Some(existing) => *existing = track.clone(),
            None => {
                self.tracks.push(track.clone());
                self.tracks.sort_by(|a, b| a.file_name.cmp(&b.file_name));
            }
        }
        info!(file = %name, title = %track.title, "imported track");
        Ok(track)
    }

    fn persist(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.root.join(name)).map_err(|e| e.error)?;
        Ok(())
    }

    /// Remove a track's file, then its listing entry.
    ///
    /// On failure the listing is left untouched.
    pub fn delete_track(&mut self, file_name: &str) -> Result<(), StorageError> {
        let path = self.path_for(file_name)?;
        fs::remove_file(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(file_name.to_string()),
            _ => StorageError::Delete {
                path: path.clone(),
                source,
            },
        })?;
        self.tracks.retain(|t| t.file_name != file_name);
        info!(file = %file_name, "deleted track");
        Ok(())
    }

    /// Read a track's raw bytes.
    pub fn load_bytes(&self, file_name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(file_name)?;
        fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(file_name.to_string()),
            _ => StorageError::Read { path, source },
        })
    }
}
