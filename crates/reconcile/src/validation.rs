//! Offline validation of the workspace documents.
//!
//! Loads every document without contacting the directory and reports what
//! a sync would act on. Duplicate keys are reported as warnings: lookups
//! during reconciliation keep the last definition, which is rarely intended.

use crate::common::{BookmarksFile, ChannelsFile, UserGroupsFile};
use crate::config::ConfigDir;
use crate::Result;
use std::collections::HashSet;

/// What the documents declare.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub channels: usize,
    pub channels_to_archive: usize,
    pub usergroups: usize,
    pub usergroups_to_disable: usize,
    pub bookmark_channels: usize,
    pub bookmarks: usize,
    /// Non-fatal findings such as duplicate keys
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Lines printed by the `validate` command, per document.
    pub fn lines(&self) -> Vec<String> {
        let mut out = vec![
            "Checking channels.yaml...".to_string(),
            format!("  Found {} channel definitions", self.channels),
        ];
        if self.channels_to_archive > 0 {
            out.push(format!(
                "  Found {} channels to archive",
                self.channels_to_archive
            ));
        }
        out.push(String::new());
        out.push("Checking usergroups.yaml...".to_string());
        out.push(format!(
            "  Found {} user group definitions",
            self.usergroups
        ));
        if self.usergroups_to_disable > 0 {
            out.push(format!(
                "  Found {} groups to disable",
                self.usergroups_to_disable
            ));
        }
        out.push(String::new());
        out.push("Checking bookmarks.yaml...".to_string());
        out.push(format!(
            "  Found {} bookmarks across {} channels",
            self.bookmarks, self.bookmark_channels
        ));
        out
    }
}

/// Loads all three documents and summarises them.
///
/// Any unreadable or malformed document is returned as an error.
pub fn validate_workspace(config: &ConfigDir) -> Result<ValidationReport> {
    let channels = config.load_channels()?;
    let usergroups = config.load_usergroups()?;
    let bookmarks = config.load_bookmarks()?;
    Ok(summarize(&channels, &usergroups, &bookmarks))
}

/// Summarises already-loaded documents.
pub fn summarize(
    channels: &ChannelsFile,
    usergroups: &UserGroupsFile,
    bookmarks: &BookmarksFile,
) -> ValidationReport {
    let mut warnings = Vec::new();

    for name in duplicates(channels.channels.iter().map(|c| c.name.as_str())) {
        warnings.push(format!("channel #{name} is defined more than once"));
    }
    for handle in duplicates(usergroups.usergroups.iter().map(|g| g.handle.as_str())) {
        warnings.push(format!("user group @{handle} is defined more than once"));
    }
    for (channel, list) in &bookmarks.bookmarks {
        for title in duplicates(list.iter().map(|b| b.title.as_str())) {
            warnings.push(format!(
                "bookmark \"{title}\" is defined more than once in #{channel}"
            ));
        }
    }

    ValidationReport {
        channels: channels.channels.len(),
        channels_to_archive: channels.archive.len(),
        usergroups: usergroups.usergroups.len(),
        usergroups_to_disable: usergroups.disable.len(),
        bookmark_channels: bookmarks.bookmarks.len(),
        bookmarks: bookmarks.bookmark_count(),
        warnings,
    }
}

/// Keys seen more than once, each reported once, in first-repeat order.
fn duplicates<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut out = Vec::new();
    for key in keys {
        if !seen.insert(key) && reported.insert(key) {
            out.push(key);
        }
    }
    out
}
