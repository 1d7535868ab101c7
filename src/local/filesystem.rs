//! Local Filesystem Access
//!
//! Local imports are read through the [`FileSystem`] trait so restricted
//! execution environments can substitute a virtual filesystem for the
//! real one.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read-only filesystem collaborator.
pub trait FileSystem {
    /// Reads a whole file. A missing file is `io::ErrorKind::NotFound`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Returns true when `path` names an existing file.
    fn exists(&self, path: &Path) -> bool;
}

/// The process's real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// In-memory filesystem keyed by path.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use workflow_imports::local::{FileSystem, MemoryFileSystem};
///
/// let fs = MemoryFileSystem::new().with_file("/repo/.github/a.md", "# A");
/// assert!(fs.exists(Path::new("/repo/.github/a.md")));
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file and returns the filesystem (builder style).
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl AsRef<[u8]>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl AsRef<[u8]>) {
        self.files.insert(path.into(), content.as_ref().to_vec());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}
