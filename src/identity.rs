//! Snapshot identity: which golden file, and which entry inside it.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::{Result, SnapshotError};

/// A (golden-file path, snapshot name) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotId {
    pub path: PathBuf,
    pub name: String,
}

impl SnapshotId {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.path.display(), self.name)
    }
}

/// Where an assertion runs: the test's source file and its libtest name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestLocation {
    pub file: String,
    pub test_name: Option<String>,
}

impl TestLocation {
    /// Captures the current libtest test name from the thread name. The test
    /// harness names each test thread after the test path; the main thread
    /// and unnamed threads yield no name.
    pub fn current(file: &str) -> Self {
        let test_name = std::thread::current()
            .name()
            .filter(|name| *name != "main")
            .map(str::to_string);
        Self {
            file: file.to_string(),
            test_name,
        }
    }

    pub fn new(file: impl Into<String>, test_name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            test_name: Some(test_name.into()),
        }
    }
}

/// How golden file paths are laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathLayout {
    pub fixture_dir: PathBuf,
    pub file_prefix: String,
    pub file_suffix: String,
}

impl PathLayout {
    /// `<fixture_dir>/<prefix><stem><suffix>` for the given test source file.
    pub fn golden_path(&self, source_file: &str) -> Result<PathBuf> {
        let stem = file_stem(source_file)?;
        Ok(self
            .fixture_dir
            .join(format!("{}{}{}", self.file_prefix, stem, self.file_suffix)))
    }
}

/// Base name of a test source file without its extension or `_test` suffix.
pub fn file_stem(source_file: &str) -> Result<String> {
    if source_file.trim().is_empty() {
        return Err(SnapshotError::configuration(
            "current test file name is empty",
            Some("build the matcher with the test_location! macro or pass the source file explicitly"),
        ));
    }
    let path = Path::new(source_file);
    let base = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            SnapshotError::configuration(
                format!("cannot derive a golden file name from {source_file:?}"),
                None,
            )
        })?;
    let stem = if path.extension().is_some() {
        base.strip_suffix("_tests")
            .or_else(|| base.strip_suffix("_test"))
            .unwrap_or(base)
    } else {
        base
    };
    Ok(stem.to_string())
}

/// Snapshot name for a test, with an optional discriminator appended so one
/// test can record several snapshots.
pub fn snapshot_name(test_name: Option<&str>, description: Option<&str>) -> Result<String> {
    let test_name = test_name.map(str::trim).filter(|n| !n.is_empty()).ok_or_else(|| {
        SnapshotError::configuration(
            "current test name is empty",
            Some("golden assertions must run inside a #[test] thread, or set a name with with_test_name"),
        )
    })?;
    Ok(match description.filter(|d| !d.is_empty()) {
        Some(description) => format!("{test_name} {description}"),
        None => test_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn layout() -> PathLayout {
        PathLayout {
            fixture_dir: PathBuf::from("testdata"),
            file_prefix: String::new(),
            file_suffix: ".golden".to_string(),
        }
    }

    #[test]
    fn path_uses_the_source_file_stem() {
        assert_eq!(
            layout().golden_path("tests/matcher_test.rs").unwrap(),
            PathBuf::from("testdata/matcher.golden")
        );
        assert_eq!(
            layout().golden_path("src/storage/store.rs").unwrap(),
            PathBuf::from("testdata/store.golden")
        );
        assert_eq!(
            layout().golden_path("tests/integration_tests.rs").unwrap(),
            PathBuf::from("testdata/integration.golden")
        );
    }

    #[test]
    fn prefix_and_suffix_are_applied() {
        let layout = PathLayout {
            fixture_dir: PathBuf::from("fixtures/snap"),
            file_prefix: "v2-".to_string(),
            file_suffix: ".snap.yaml".to_string(),
        };
        assert_eq!(
            layout.golden_path("tests/api.rs").unwrap(),
            PathBuf::from("fixtures/snap/v2-api.snap.yaml")
        );
    }

    #[test]
    fn empty_source_file_is_a_configuration_error() {
        let err = layout().golden_path("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn names_append_the_description() {
        assert_eq!(snapshot_name(Some("a::b"), None).unwrap(), "a::b");
        assert_eq!(
            snapshot_name(Some("a::b"), Some("first")).unwrap(),
            "a::b first"
        );
        assert_eq!(snapshot_name(Some("a::b"), Some("")).unwrap(), "a::b");
    }

    #[test]
    fn missing_test_name_fails_fast() {
        for name in [None, Some(""), Some("   ")] {
            let err = snapshot_name(name, None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration);
            assert!(err.to_string().contains("test name is empty"));
        }
    }

    #[test]
    fn current_location_uses_the_test_thread_name() {
        let location = TestLocation::current(file!());
        assert_eq!(
            location.test_name.as_deref(),
            Some("identity::tests::current_location_uses_the_test_thread_name")
        );
        assert!(location.file.ends_with("identity.rs"));
    }

    #[test]
    fn display_joins_path_and_name() {
        let id = SnapshotId::new("testdata/a.golden", "t");
        assert_eq!(id.to_string(), "testdata/a.golden#t");
    }
}
