//! Import sources: user-chosen files that may live outside the library and
//! need an explicit access grant while they are read.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use tracing::debug;

/// A transient, access-scoped reference to a file chosen by the user.
pub trait ScopedSource {
    /// Original file name, used as the name inside the library.
    fn file_name(&self) -> Option<String>;

    /// Acquire read access. Returns `false` when the grant is refused.
    fn start_access(&self) -> bool;

    /// Release a grant obtained by `start_access`.
    fn stop_access(&self);

    fn open(&self) -> io::Result<Box<dyn Read + '_>>;
}

/// Holds a grant for as long as it lives; released on drop.
pub(crate) struct ScopedAccess<'a> {
    source: &'a dyn ScopedSource,
}

impl<'a> ScopedAccess<'a> {
    pub(crate) fn acquire(source: &'a dyn ScopedSource) -> Option<Self> {
        source.start_access().then(|| Self { source })
    }
}

impl Drop for ScopedAccess<'_> {
    fn drop(&mut self) {
        self.source.stop_access();
    }
}

/// A plain filesystem path. Access is granted when the path is a readable file.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScopedSource for LocalFile {
    fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .map(str::to_string)
    }

    fn start_access(&self) -> bool {
        let ok = self.path.is_file();
        debug!(path = ?self.path, granted = ok, "start access");
        ok
    }

    fn stop_access(&self) {
        debug!(path = ?self.path, "stop access");
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(&self.path)?))
    }
}
