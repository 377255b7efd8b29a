//! Loading of the declarative workspace documents.
//!
//! Documents live side by side in one directory (by default `./workspace`).
//! A missing or malformed document is a fatal error for whatever needs it.

use crate::common::{BookmarksFile, ChannelsFile, UserGroupsFile};
use crate::report::ResourceKind;
use crate::Result;
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub const CHANNELS_FILE: &str = "channels.yaml";
pub const USERGROUPS_FILE: &str = "usergroups.yaml";
pub const BOOKMARKS_FILE: &str = "bookmarks.yaml";

/// File name of the document describing a resource kind.
pub fn document_name(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Channels => CHANNELS_FILE,
        ResourceKind::UserGroups => USERGROUPS_FILE,
        ResourceKind::Bookmarks => BOOKMARKS_FILE,
    }
}

/// Directory holding the workspace documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDir {
    root: PathBuf,
}

impl ConfigDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document for `kind`.
    pub fn path_for(&self, kind: ResourceKind) -> PathBuf {
        self.root.join(document_name(kind))
    }

    pub fn load_channels(&self) -> Result<ChannelsFile> {
        load_document(&self.path_for(ResourceKind::Channels))
    }

    pub fn load_usergroups(&self) -> Result<UserGroupsFile> {
        load_document(&self.path_for(ResourceKind::UserGroups))
    }

    pub fn load_bookmarks(&self) -> Result<BookmarksFile> {
        load_document(&self.path_for(ResourceKind::Bookmarks))
    }
}

/// Reads and parses one YAML document.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let doc = serde_yaml::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded workspace document");
    Ok(doc)
}
