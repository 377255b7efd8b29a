//! Shared test utilities for wsync crates.
//!
//! Env var guards for tests that touch process configuration, and a
//! workspace fixture that lays out the YAML documents in a temp directory.

use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = wsync_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is set to "value"
/// // When _guard drops, MY_VAR is restored to its original value
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Empty but valid documents, used for any file a test does not set.
pub const EMPTY_CHANNELS: &str = "channels: []\n";
pub const EMPTY_USERGROUPS: &str = "usergroups: []\n";
pub const EMPTY_BOOKMARKS: &str = "bookmarks: {}\n";

/// A temp directory holding `channels.yaml`, `usergroups.yaml` and
/// `bookmarks.yaml`.
///
/// All three documents exist from the start with empty contents; the
/// `write_*` methods replace one. The directory is removed on drop.
pub struct WorkspaceFixture {
    pub tempdir: tempfile::TempDir,
    /// Directory holding the documents
    pub workspace: PathBuf,
}

impl WorkspaceFixture {
    /// Creates `<tmp>/workspace` with the three empty documents.
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let workspace = tempdir.path().join("workspace");
        std::fs::create_dir_all(&workspace)?;
        let fixture = Self { tempdir, workspace };
        fixture.write_channels(EMPTY_CHANNELS)?;
        fixture.write_usergroups(EMPTY_USERGROUPS)?;
        fixture.write_bookmarks(EMPTY_BOOKMARKS)?;
        Ok(fixture)
    }

    /// The temp root; `workspace/` sits inside it, so it can serve as a
    /// working directory for the default document location.
    pub fn root(&self) -> &Path {
        self.tempdir.path()
    }

    pub fn write_channels(&self, yaml: &str) -> std::io::Result<PathBuf> {
        self.write("channels.yaml", yaml)
    }

    pub fn write_usergroups(&self, yaml: &str) -> std::io::Result<PathBuf> {
        self.write("usergroups.yaml", yaml)
    }

    pub fn write_bookmarks(&self, yaml: &str) -> std::io::Result<PathBuf> {
        self.write("bookmarks.yaml", yaml)
    }

    /// Removes one document, for tests of missing configuration.
    pub fn remove(&self, file: &str) -> std::io::Result<()> {
        std::fs::remove_file(self.workspace.join(file))
    }

    fn write(&self, file: &str, yaml: &str) -> std::io::Result<PathBuf> {
        let path = self.workspace.join(file);
        std::fs::write(&path, yaml)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_guard_serializes_tests() {
        let _g = env_guard();
    }

    #[test]
    fn test_set_env_var_sets_and_restores() {
        let _g = env_guard();

        const KEY: &str = "WSYNC_TEST_UTILS_TEST_VAR";
        std::env::remove_var(KEY);

        {
            let _guard = set_env_var(KEY, Some("test_value"));
            assert_eq!(std::env::var(KEY).ok(), Some("test_value".to_string()));
        }
        // Did not exist before, so it is removed again
        assert!(std::env::var(KEY).is_err());
    }

    #[test]
    fn test_set_env_var_restores_previous_value() {
        let _g = env_guard();

        const KEY: &str = "WSYNC_TEST_RESTORE_VAR";
        std::env::set_var(KEY, "original");

        {
            let _guard = set_env_var(KEY, None);
            assert!(std::env::var(KEY).is_err());
        }
        assert_eq!(std::env::var(KEY).ok(), Some("original".to_string()));

        std::env::remove_var(KEY);
    }

    #[test]
    fn test_fixture_starts_with_empty_documents() {
        let fixture = WorkspaceFixture::new().expect("fixture creation");
        let channels = std::fs::read_to_string(fixture.workspace.join("channels.yaml")).unwrap();
        assert_eq!(channels, EMPTY_CHANNELS);
        assert!(fixture.workspace.join("usergroups.yaml").is_file());
        assert!(fixture.workspace.join("bookmarks.yaml").is_file());
        assert!(fixture.workspace.starts_with(fixture.root()));
    }

    #[test]
    fn test_fixture_write_and_remove() {
        let fixture = WorkspaceFixture::new().expect("fixture creation");
        let path = fixture.write_bookmarks("bookmarks:\n  general: []\n").unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("general"));

        fixture.remove("bookmarks.yaml").unwrap();
        assert!(!path.exists());
    }
}
