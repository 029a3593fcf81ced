//! The golden matcher: record on first run, compare on every run after.
//!
//! A [`Matcher`] is built per assertion from [`Defaults`] plus any
//! [`MatchOption`]s, then driven through the three-operation
//! [`AssertionMatcher`] contract that assertion libraries expect.
//!
//! # Example
//!
//! ```rust
//! use goldsnap::prelude::*;
//! use std::sync::Arc;
//!
//! let storage = Arc::new(GoldenStorage::new(MemFs::new()));
//! let defaults = Defaults::with_storage(storage);
//! let location = TestLocation::new("tests/api_test.rs", "api::lists_users");
//!
//! let matcher = Matcher::new(&defaults, location.clone(), [with_serializer(JsonSerializer::default())]).unwrap();
//! // Nothing recorded yet: the first run records and passes.
//! assert!(matcher.matches(&vec!["ada", "grace"]).unwrap());
//!
//! let matcher = Matcher::new(&defaults, location, [with_serializer(JsonSerializer::default())]).unwrap();
//! assert!(matcher.matches(&vec!["ada", "grace"]).unwrap());
//! assert!(!matcher.matches(&vec!["ada"]).unwrap());
//! ```

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::config::Defaults;
use crate::differ::{Differ, LineDiffer};
use crate::errors::{Result, SnapshotError};
use crate::identity::{snapshot_name, PathLayout, SnapshotId, TestLocation};
use crate::serializer::Serializer;
use crate::storage::Storage;
use crate::transformer::Transformer;
use crate::value::to_value;

/// The contract a host assertion library needs from a matcher.
pub trait AssertionMatcher<T: ?Sized> {
    /// `Ok(true)` on a match or a fresh recording, `Ok(false)` on a mismatch,
    /// `Err` on any infrastructure failure.
    fn matches(&self, actual: &T) -> Result<bool>;

    fn failure_message(&self, actual: &T) -> String;

    fn negated_failure_message(&self, actual: &T) -> String;
}

// ============================================================================
// CONFIGURATION AND OPTIONS
// ============================================================================

/// Everything a matcher is built from. Options edit this before the snapshot
/// identity is derived.
pub struct MatcherConfig {
    pub serializer: Arc<dyn Serializer>,
    pub transformer: Arc<dyn Transformer>,
    pub differ: Arc<dyn Differ>,
    pub storage: Arc<dyn Storage>,
    pub update: bool,
    pub layout: PathLayout,
    pub source_file: String,
    pub test_name: Option<String>,
    pub description: Option<String>,
}

impl MatcherConfig {
    pub fn new(defaults: &Defaults, location: TestLocation) -> Self {
        Self {
            serializer: Arc::clone(&defaults.serializer),
            transformer: Arc::clone(&defaults.transformer),
            differ: Arc::clone(&defaults.differ),
            storage: Arc::clone(&defaults.storage),
            update: defaults.update,
            layout: defaults.layout.clone(),
            source_file: location.file,
            test_name: location.test_name,
            description: None,
        }
    }
}

/// One edit to a [`MatcherConfig`].
pub struct MatchOption(Box<dyn FnOnce(&mut MatcherConfig)>);

impl MatchOption {
    pub fn new(edit: impl FnOnce(&mut MatcherConfig) + 'static) -> Self {
        Self(Box::new(edit))
    }

    fn apply(self, config: &mut MatcherConfig) {
        (self.0)(config)
    }
}

pub fn with_serializer(serializer: impl Serializer + 'static) -> MatchOption {
    MatchOption::new(move |c| c.serializer = Arc::new(serializer))
}

pub fn with_transformer(transformer: impl Transformer + 'static) -> MatchOption {
    MatchOption::new(move |c| c.transformer = Arc::new(transformer))
}

pub fn with_differ(differ: impl Differ + 'static) -> MatchOption {
    MatchOption::new(move |c| c.differ = Arc::new(differ))
}

/// Shorthand for a [`LineDiffer`] with colour forced on or off.
pub fn with_color(color: bool) -> MatchOption {
    with_differ(LineDiffer { color })
}

pub fn with_storage(storage: impl Storage + 'static) -> MatchOption {
    MatchOption::new(move |c| c.storage = Arc::new(storage))
}

pub fn with_update(update: bool) -> MatchOption {
    MatchOption::new(move |c| c.update = update)
}

/// Appends a discriminator to the snapshot name so one test can record
/// several snapshots.
pub fn with_description(description: impl Into<String>) -> MatchOption {
    let description = description.into();
    MatchOption::new(move |c| c.description = Some(description))
}

pub fn with_test_name(name: impl Into<String>) -> MatchOption {
    let name = name.into();
    MatchOption::new(move |c| c.test_name = Some(name))
}

pub fn with_fixture_dir(dir: impl Into<PathBuf>) -> MatchOption {
    let dir = dir.into();
    MatchOption::new(move |c| c.layout.fixture_dir = dir)
}

pub fn with_file_prefix(prefix: impl Into<String>) -> MatchOption {
    let prefix = prefix.into();
    MatchOption::new(move |c| c.layout.file_prefix = prefix)
}

pub fn with_file_suffix(suffix: impl Into<String>) -> MatchOption {
    let suffix = suffix.into();
    MatchOption::new(move |c| c.layout.file_suffix = suffix)
}

// ============================================================================
// MATCHER
// ============================================================================

pub struct Matcher {
    id: SnapshotId,
    serializer: Arc<dyn Serializer>,
    transformer: Arc<dyn Transformer>,
    differ: Arc<dyn Differ>,
    storage: Arc<dyn Storage>,
    update: bool,
}

/// Builds a matcher from the process-wide defaults.
pub fn golden(
    location: TestLocation,
    options: impl IntoIterator<Item = MatchOption>,
) -> Result<Matcher> {
    Matcher::new(Defaults::global(), location, options)
}

impl Matcher {
    /// Applies `options` in order, then derives and validates the snapshot
    /// identity. An empty source file or test name is a configuration error.
    pub fn new(
        defaults: &Defaults,
        location: TestLocation,
        options: impl IntoIterator<Item = MatchOption>,
    ) -> Result<Self> {
        let mut config = MatcherConfig::new(defaults, location);
        for option in options {
            option.apply(&mut config);
        }
        Self::from_config(config)
    }

    pub fn from_config(config: MatcherConfig) -> Result<Self> {
        let path = config.layout.golden_path(&config.source_file)?;
        let name = snapshot_name(config.test_name.as_deref(), config.description.as_deref())?;
        Ok(Self {
            id: SnapshotId { path, name },
            serializer: config.serializer,
            transformer: config.transformer,
            differ: config.differ,
            storage: config.storage,
            update: config.update,
        })
    }

    pub fn id(&self) -> &SnapshotId {
        &self.id
    }

    pub fn is_update(&self) -> bool {
        self.update
    }

    /// Capture, transform, serialize.
    pub fn actual_content<T: Serialize + ?Sized>(&self, actual: &T) -> Result<String> {
        let captured = to_value(actual)?;
        let transformed = self.transformer.transform(captured)?;
        self.serializer.serialize(&transformed)
    }

    /// Recorded content, or `NotFound` when nothing is recorded or update mode
    /// is on.
    pub fn expected_content(&self) -> Result<String> {
        if self.update {
            return Err(SnapshotError::not_found(&self.id.path, &self.id.name));
        }
        self.storage.read(&self.id)
    }

    fn message<T: Serialize + ?Sized>(&self, actual: &T, verb: &str) -> String {
        let expected = self
            .expected_content()
            .unwrap_or_else(|e| panic!("cannot re-read snapshot {}: {e}", self.id));
        let actual = self
            .actual_content(actual)
            .unwrap_or_else(|e| panic!("cannot re-serialize value for {}: {e}", self.id));
        format!(
            "Expected {verb} match the golden file {:?}\n{}",
            self.id.path,
            self.differ.diff(&expected, &actual)
        )
    }

    /// Panics with the failure message on a mismatch, or with the raw error
    /// on an infrastructure failure.
    #[track_caller]
    pub fn assert<T: Serialize + ?Sized>(&self, actual: &T) {
        match self.matches(actual) {
            Ok(true) => {}
            Ok(false) => panic!("{}", self.failure_message(actual)),
            Err(e) => panic!("{e}"),
        }
    }

    /// Negated assertion: panics when the value does match.
    #[track_caller]
    pub fn assert_not<T: Serialize + ?Sized>(&self, actual: &T) {
        match self.matches(actual) {
            Ok(false) => {}
            Ok(true) => panic!("{}", self.negated_failure_message(actual)),
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T: Serialize + ?Sized> AssertionMatcher<T> for Matcher {
    fn matches(&self, actual: &T) -> Result<bool> {
        let actual_content = self.actual_content(actual)?;

        match self.expected_content() {
            Ok(expected) => {
                let matched = expected == actual_content;
                debug!(snapshot = %self.id, matched, "compared against golden file");
                Ok(matched)
            }
            Err(e) if e.is_not_found() => {
                debug!(snapshot = %self.id, update = self.update, "recording snapshot");
                self.storage.write(&self.id, &actual_content)?;
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }

    fn failure_message(&self, actual: &T) -> String {
        self.message(actual, "to")
    }

    fn negated_failure_message(&self, actual: &T) -> String {
        self.message(actual, "not to")
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("id", &self.id)
            .field("serializer", &self.serializer.format())
            .field("update", &self.update)
            .finish_non_exhaustive()
    }
}
