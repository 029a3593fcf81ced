//! Shared fixtures for the integration suites: matchers over a throwaway
//! directory on the real filesystem.

#![allow(dead_code)]

use goldsnap::prelude::*;
use goldsnap::storage::CachedFs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub struct Fixture {
    pub dir: TempDir,
    pub defaults: Defaults,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut defaults = Defaults::with_storage(Arc::new(GoldenStorage::new(OsFs)));
        defaults.differ = Arc::new(LineDiffer::plain());
        defaults.layout.fixture_dir = dir.path().join("testdata");
        Self { dir, defaults }
    }

    /// The storage stack the process-wide defaults install: a read cache over
    /// the real filesystem.
    pub fn cached() -> Self {
        let mut fx = Self::new();
        let fs = CachedFs::new(OsFs, Duration::from_secs(60));
        fx.defaults.storage = Arc::new(GoldenStorage::new(fs));
        fx
    }

    pub fn matcher(&self, test_name: &str, options: Vec<MatchOption>) -> Matcher {
        let location = TestLocation::new("tests/fixture_test.rs", test_name);
        Matcher::new(&self.defaults, location, options).expect("build matcher")
    }

    pub fn golden_path(&self) -> PathBuf {
        self.dir.path().join("testdata/fixture.golden")
    }

    pub fn golden_text(&self) -> String {
        read(&self.golden_path())
    }
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}
