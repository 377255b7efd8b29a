//! Trait definition for the workspace directory.

use crate::common::{
    BookmarkFields, BookmarkObservation, ChannelObservation, NewChannel, UserGroupFields,
    UserGroupObservation,
};
use crate::error::DirectoryResult;
use async_trait::async_trait;

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the next page; `None` or empty on the last page
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// A page with no successor.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }
}

#[cfg(test)]
use mockall::automock;

/// Remote capability the reconcilers converge against.
///
/// Every method maps to a single API call. Implementations do not retry;
/// failures are returned as [`DirectoryError`](crate::DirectoryError) and the
/// caller decides what to do with them.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WorkspaceDirectory: Send + Sync {
    // --- Channels ---

    /// One page of non-archived public and private channels.
    ///
    /// Prefer [`crate::directory::channels`], which walks every page.
    async fn list_channels_page(
        &self,
        cursor: Option<String>,
    ) -> DirectoryResult<Page<ChannelObservation>>;

    /// Creates a channel and returns its id.
    async fn create_channel(&self, channel: &NewChannel) -> DirectoryResult<String>;

    async fn set_topic(&self, channel_id: &str, topic: &str) -> DirectoryResult<()>;

    async fn set_purpose(&self, channel_id: &str, purpose: &str) -> DirectoryResult<()>;

    async fn archive_channel(&self, channel_id: &str) -> DirectoryResult<()>;

    // --- User groups ---

    /// Every user group. Disabled groups are only present when
    /// `include_disabled` is set; member counts need `include_users`.
    async fn list_usergroups(
        &self,
        include_disabled: bool,
        include_users: bool,
    ) -> DirectoryResult<Vec<UserGroupObservation>>;

    /// Creates a user group and returns its id.
    async fn create_usergroup(&self, fields: &UserGroupFields) -> DirectoryResult<String>;

    async fn update_usergroup(
        &self,
        usergroup_id: &str,
        fields: &UserGroupFields,
    ) -> DirectoryResult<()>;

    async fn enable_usergroup(&self, usergroup_id: &str) -> DirectoryResult<()>;

    async fn disable_usergroup(&self, usergroup_id: &str) -> DirectoryResult<()>;

    /// Replaces the full membership of a user group.
    async fn set_usergroup_members(
        &self,
        usergroup_id: &str,
        user_ids: &[String],
    ) -> DirectoryResult<()>;

    // --- Users ---

    /// Resolves an email address to a user id.
    async fn lookup_user_by_email(&self, email: &str) -> DirectoryResult<String>;

    // --- Bookmarks ---

    async fn list_bookmarks(&self, channel_id: &str) -> DirectoryResult<Vec<BookmarkObservation>>;

    /// Adds a link bookmark and returns its id.
    async fn add_bookmark(
        &self,
        channel_id: &str,
        bookmark: &BookmarkFields,
    ) -> DirectoryResult<String>;

    /// Rewrites the link and emoji of an existing bookmark.
    async fn edit_bookmark(
        &self,
        channel_id: &str,
        bookmark_id: &str,
        bookmark: &BookmarkFields,
    ) -> DirectoryResult<()>;
}
