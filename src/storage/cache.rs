//! Time-bounded read cache over any [`FileSystem`].

use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

use super::fs::FileSystem;

#[derive(Debug)]
struct CacheEntry {
    fetched: Instant,
    contents: Vec<u8>,
}

/// Per-path cache state. `generation` moves on every write or invalidation;
/// a read only fills the slot if no write landed while it was in flight.
#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    cached: Option<CacheEntry>,
}

/// Caches successful reads for `ttl`. Writes go straight through and drop the
/// cached copy, and a read that raced with a write never caches what it saw.
/// Missing files are never cached.
#[derive(Debug)]
pub struct CachedFs<F> {
    inner: F,
    ttl: Duration,
    slots: RwLock<HashMap<PathBuf, Slot>>,
}

impl<F: FileSystem> CachedFs<F> {
    pub fn new(inner: F, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn invalidate(&self, path: &Path) {
        let mut slots = self.slots.write();
        let slot = slots.entry(path.to_path_buf()).or_default();
        slot.generation += 1;
        slot.cached = None;
    }

    /// Fresh cached contents, or the generation a new read starts from.
    fn lookup(&self, path: &Path) -> Result<Vec<u8>, u64> {
        let slots = self.slots.read();
        match slots.get(path) {
            Some(Slot {
                cached: Some(entry),
                ..
            }) if entry.fetched.elapsed() < self.ttl => Ok(entry.contents.clone()),
            Some(slot) => Err(slot.generation),
            None => Err(0),
        }
    }

    fn store(&self, path: &Path, generation: u64, contents: Vec<u8>) {
        let mut slots = self.slots.write();
        let slot = slots.entry(path.to_path_buf()).or_default();
        if slot.generation == generation {
            slot.cached = Some(CacheEntry {
                fetched: Instant::now(),
                contents,
            });
        } else {
            debug!(path = %path.display(), "discarding read that raced a write");
        }
    }
}

impl<F: FileSystem> FileSystem for CachedFs<F> {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let generation = match self.lookup(path) {
            Ok(contents) => {
                debug!(path = %path.display(), "golden file cache hit");
                return Ok(contents);
            }
            Err(generation) => generation,
        };
        let contents = self.inner.read(path)?;
        self.store(path, generation, contents.clone());
        Ok(contents)
    }

    fn read_uncached(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.inner.read_uncached(path)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let written = self.inner.write_atomic(path, contents);
        self.invalidate(path);
        written
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.inner.create_dir_all(path)
    }
}
