use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

/// Bot token used for every directory call.
pub const TOKEN_ENV: &str = "SLACK_BOT_TOKEN";
/// Overrides the Web API endpoint.
pub const API_BASE_ENV: &str = "SLACK_API_BASE_URL";
/// Overrides where the YAML documents are read from.
pub const WORKSPACE_DIR_ENV: &str = "WSYNC_WORKSPACE_DIR";

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";
pub const DEFAULT_WORKSPACE_DIR: &str = "workspace";

/// Returns the bot token from `SLACK_BOT_TOKEN`, if set and non-empty.
pub fn token_from_env() -> Option<String> {
    non_empty_var(TOKEN_ENV)
}

/// Returns the API endpoint from `SLACK_API_BASE_URL`, or the public endpoint.
pub fn api_base_from_env() -> String {
    non_empty_var(API_BASE_ENV).unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

/// Returns the document directory from `WSYNC_WORKSPACE_DIR`, or `./workspace`.
pub fn workspace_dir_from_env() -> PathBuf {
    non_empty_var(WORKSPACE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE_DIR))
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Loads `.env` from the working directory or one of its parents.
///
/// Variables already present in the environment win. A missing file is not
/// an error; `Ok(None)` is returned instead.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    ignore_missing(dotenvy::dotenv())
}

/// Loads a specific env file. Same rules as [`load_dotenv`].
pub fn load_dotenv_from(path: &Path) -> Result<Option<PathBuf>> {
    ignore_missing(dotenvy::from_path(path).map(|()| path.to_path_buf()))
}

fn ignore_missing(loaded: dotenvy::Result<PathBuf>) -> Result<Option<PathBuf>> {
    match loaded {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded .env");
            Ok(Some(path))
        }
        Err(dotenvy::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow!("failed to load .env file: {e}")),
    }
}

/// Process configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding `channels.yaml`, `usergroups.yaml` and `bookmarks.yaml`
    pub workspace_dir: PathBuf,
    pub api_base: String,
    token: Option<String>,
}

impl Settings {
    /// Reads every setting from the environment.
    pub fn from_env() -> Self {
        Self {
            workspace_dir: workspace_dir_from_env(),
            api_base: api_base_from_env(),
            token: token_from_env(),
        }
    }

    pub fn new(
        workspace_dir: impl Into<PathBuf>,
        api_base: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
            api_base: api_base.into(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Replaces the workspace directory when `dir` is given.
    pub fn with_workspace_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.workspace_dir = dir;
        }
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// The bot token, required by every command that contacts the directory.
    pub fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| anyhow!("{TOKEN_ENV} environment variable is required"))
    }
}
