//! Process-wide defaults for matchers.
//!
//! [`Defaults`] is built explicitly (or once from the environment through
//! [`Defaults::global`]) and never mutated afterwards; per-assertion changes go
//! through [`crate::matcher::MatchOption`]s on a copy.

use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::differ::{Differ, LineDiffer};
use crate::identity::PathLayout;
use crate::serializer::{DumpSerializer, Serializer};
use crate::storage::{CachedFs, GoldenStorage, OsFs, Storage};
use crate::transformer::{Identity, Transformer};

/// Environment variable that forces every assertion to re-record.
pub const UPDATE_ENV: &str = "UPDATE_GOLDEN";
pub const DEFAULT_FIXTURE_DIR: &str = "testdata";
pub const DEFAULT_FILE_PREFIX: &str = "";
pub const DEFAULT_FILE_SUFFIX: &str = ".golden";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

static GLOBAL: Lazy<Defaults> = Lazy::new(Defaults::from_env);

#[derive(Clone)]
pub struct Defaults {
    pub serializer: Arc<dyn Serializer>,
    pub transformer: Arc<dyn Transformer>,
    pub differ: Arc<dyn Differ>,
    pub storage: Arc<dyn Storage>,
    pub update: bool,
    pub layout: PathLayout,
}

impl Defaults {
    /// Defaults over the given storage, with update mode off and colour
    /// decided by whether stdout is a terminal.
    pub fn with_storage(storage: Arc<dyn Storage>) -> Self {
        Self {
            serializer: Arc::new(DumpSerializer),
            transformer: Arc::new(Identity),
            differ: Arc::new(LineDiffer::auto()),
            storage,
            update: false,
            layout: PathLayout {
                fixture_dir: PathBuf::from(DEFAULT_FIXTURE_DIR),
                file_prefix: DEFAULT_FILE_PREFIX.to_string(),
                file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
            },
        }
    }

    /// Real filesystem behind a read cache, update mode from `UPDATE_GOLDEN`.
    pub fn from_env() -> Self {
        let storage = GoldenStorage::new(CachedFs::new(OsFs, DEFAULT_CACHE_TTL));
        let mut defaults = Self::with_storage(Arc::new(storage));
        defaults.update = update_from_env();
        defaults
    }

    /// The process-wide defaults, read from the environment on first use.
    pub fn global() -> &'static Defaults {
        &GLOBAL
    }
}

impl std::fmt::Debug for Defaults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Defaults")
            .field("serializer", &self.serializer.format())
            .field("update", &self.update)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

fn update_from_env() -> bool {
    match std::env::var(UPDATE_ENV) {
        Ok(raw) => parse_bool(&raw).unwrap_or_else(|| {
            warn!(value = %raw, "ignoring unrecognised {} value", UPDATE_ENV);
            false
        }),
        Err(_) => false,
    }
}

/// Boolean grammar of the update flag: `1 t T TRUE true True` and
/// `0 f F FALSE false False`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
