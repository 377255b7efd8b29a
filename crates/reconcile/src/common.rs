//! Desired-state documents and observed-state snapshots shared by every
//! reconciler.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// A channel as declared in `channels.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelSpec {
    /// Channel name without the leading `#`
    pub name: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    /// Visibility used when the channel is created (public when unset)
    #[serde(default)]
    pub is_private: Option<bool>,
}

/// Contents of `channels.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelsFile {
    pub channels: Vec<ChannelSpec>,
    /// Channel names to archive if they still exist
    #[serde(default, deserialize_with = "null_as_empty")]
    pub archive: Vec<String>,
}

// `archive:` with no entries parses as null
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A user group as declared in `usergroups.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserGroupSpec {
    /// Mention handle without the leading `@`
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// User ids or email addresses
    #[serde(default)]
    pub members: Option<Vec<String>>,
}

/// Contents of `usergroups.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserGroupsFile {
    pub usergroups: Vec<UserGroupSpec>,
    /// Handles to disable if they still exist
    #[serde(default, deserialize_with = "null_as_empty")]
    pub disable: Vec<String>,
}

/// A bookmark as declared under a channel key in `bookmarks.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookmarkSpec {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub emoji: Option<String>,
}

/// Contents of `bookmarks.yaml`: channel name to bookmark list, in document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookmarksFile {
    #[serde(deserialize_with = "null_lists_as_empty")]
    pub bookmarks: IndexMap<String, Vec<BookmarkSpec>>,
}

// A channel key with no entries parses as null
fn null_lists_as_empty<'de, D, T>(deserializer: D) -> Result<IndexMap<String, Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw = IndexMap::<String, Option<Vec<T>>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(channel, list)| (channel, list.unwrap_or_default()))
        .collect())
}

impl BookmarksFile {
    /// Total bookmarks across all channels.
    pub fn bookmark_count(&self) -> usize {
        self.bookmarks.values().map(Vec::len).sum()
    }
}

/// A channel as it currently exists in the workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelObservation {
    pub id: String,
    pub name: String,
    pub is_private: bool,
    pub member_count: u64,
}

/// A user group as it currently exists in the workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserGroupObservation {
    pub id: String,
    pub handle: String,
    pub name: String,
    pub disabled: bool,
    pub member_count: u64,
}

/// A bookmark as it currently exists in a channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookmarkObservation {
    pub id: String,
    /// Id of the channel the bookmark belongs to
    pub channel_id: String,
    pub title: String,
    pub link: String,
    pub emoji: Option<String>,
}

/// Fields for creating a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChannel {
    pub name: String,
    pub is_private: bool,
}

/// Fields written when creating or updating a user group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGroupFields {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<&UserGroupSpec> for UserGroupFields {
    fn from(spec: &UserGroupSpec) -> Self {
        Self {
            handle: spec.handle.clone(),
            name: spec.name.clone(),
            description: spec.description.clone(),
        }
    }
}

/// Fields for adding or editing a link bookmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkFields {
    pub title: String,
    pub link: String,
    pub emoji: Option<String>,
}

impl From<&BookmarkSpec> for BookmarkFields {
    fn from(spec: &BookmarkSpec) -> Self {
        Self {
            title: spec.title.clone(),
            link: spec.link.clone(),
            emoji: spec.emoji.clone(),
        }
    }
}

/// How a configured group member is identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRef<'a> {
    /// Already a user id (`U…` or `W…`)
    UserId(&'a str),
    /// Email address to resolve with a lookup
    Email(&'a str),
}

impl<'a> MemberRef<'a> {
    /// Classifies a member token. Returns `None` for tokens of neither shape.
    pub fn classify(token: &'a str) -> Option<Self> {
        let token = token.trim();
        if looks_like_user_id(token) {
            Some(Self::UserId(token))
        } else if token.contains('@') {
            Some(Self::Email(token))
        } else {
            None
        }
    }
}

fn looks_like_user_id(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some('U' | 'W'))
        && token.len() > 1
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}
