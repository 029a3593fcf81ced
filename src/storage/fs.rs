//! Filesystem backends for golden files.
//!
//! [`OsFs`] is the real filesystem; [`MemFs`] keeps everything in memory for
//! testing the engine itself. Writes are whole-file and atomic: a reader sees
//! either the old contents or the new ones, never a mix.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub trait FileSystem: Send + Sync + fmt::Debug {
    /// Reads a whole file. A missing file is `io::ErrorKind::NotFound`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Reads the file as it is on the backing store, bypassing any cache
    /// layer. Read-modify-write cycles must use this.
    fn read_uncached(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.read(path)
    }

    /// Replaces the file's contents atomically. The parent directory must exist.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

impl<F: FileSystem + ?Sized> FileSystem for Arc<F> {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        (**self).read(path)
    }

    fn read_uncached(&self, path: &Path) -> io::Result<Vec<u8>> {
        (**self).read_uncached(path)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        (**self).write_atomic(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        (**self).create_dir_all(path)
    }
}

// ============================================================================
// OS FILESYSTEM
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl FileSystem for OsFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    /// Writes to a temporary file beside the target, then renames it over
    /// the target.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

// ============================================================================
// IN-MEMORY FILESYSTEM
// ============================================================================

#[derive(Debug, Default)]
struct MemState {
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: HashSet<PathBuf>,
}

/// In-memory filesystem. Counts reads and writes so tests can assert on
/// traffic.
#[derive(Debug, Default)]
pub struct MemFs {
    state: RwLock<MemState>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file (and its parent directories) without counting a write.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        let path = path.into();
        let mut state = self.state.write();
        if let Some(parent) = path.parent() {
            add_ancestors(&mut state.dirs, parent);
        }
        state.files.insert(path, contents.into());
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.state.read().files.get(path).cloned()
    }

    pub fn remove(&self, path: &Path) -> Option<Vec<u8>> {
        self.state.write().files.remove(path)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

fn add_ancestors(dirs: &mut HashSet<PathBuf>, path: &Path) {
    for ancestor in path.ancestors() {
        if !ancestor.as_os_str().is_empty() {
            dirs.insert(ancestor.to_path_buf());
        }
    }
}

impl FileSystem for MemFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.state.read().files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )
        })
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self.state.write();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !state.dirs.contains(parent) {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("directory {} does not exist", parent.display()),
                ));
            }
        }
        state.files.insert(path.to_path_buf(), contents.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        add_ancestors(&mut self.state.write().dirs, path);
        Ok(())
    }
}
