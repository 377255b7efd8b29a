//! In-memory directory for tests and rehearsals.

use super::traits::{Page, WorkspaceDirectory};
use crate::common::{
    BookmarkFields, BookmarkObservation, ChannelObservation, NewChannel, UserGroupFields,
    UserGroupObservation,
};
use crate::error::{DirectoryError, DirectoryResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// A directory call as recorded by [`MemoryDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListChannels { cursor: Option<String> },
    CreateChannel { name: String, is_private: bool },
    SetTopic { channel_id: String, topic: String },
    SetPurpose { channel_id: String, purpose: String },
    ArchiveChannel { channel_id: String },
    ListUserGroups { include_disabled: bool },
    CreateUserGroup { handle: String, name: String },
    UpdateUserGroup { usergroup_id: String, name: String },
    EnableUserGroup { usergroup_id: String },
    DisableUserGroup { usergroup_id: String },
    SetUserGroupMembers { usergroup_id: String, user_ids: Vec<String> },
    LookupUserByEmail { email: String },
    ListBookmarks { channel_id: String },
    AddBookmark { channel_id: String, title: String, link: String },
    EditBookmark { channel_id: String, bookmark_id: String, link: String },
}

impl Call {
    /// API method name of the call.
    pub fn method(&self) -> &'static str {
        match self {
            Self::ListChannels { .. } => "conversations.list",
            Self::CreateChannel { .. } => "conversations.create",
            Self::SetTopic { .. } => "conversations.setTopic",
            Self::SetPurpose { .. } => "conversations.setPurpose",
            Self::ArchiveChannel { .. } => "conversations.archive",
            Self::ListUserGroups { .. } => "usergroups.list",
            Self::CreateUserGroup { .. } => "usergroups.create",
            Self::UpdateUserGroup { .. } => "usergroups.update",
            Self::EnableUserGroup { .. } => "usergroups.enable",
            Self::DisableUserGroup { .. } => "usergroups.disable",
            Self::SetUserGroupMembers { .. } => "usergroups.users.update",
            Self::LookupUserByEmail { .. } => "users.lookupByEmail",
            Self::ListBookmarks { .. } => "bookmarks.list",
            Self::AddBookmark { .. } => "bookmarks.add",
            Self::EditBookmark { .. } => "bookmarks.edit",
        }
    }

    /// Whether the call changes workspace state.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Self::ListChannels { .. }
                | Self::ListUserGroups { .. }
                | Self::LookupUserByEmail { .. }
                | Self::ListBookmarks { .. }
        )
    }
}

#[derive(Debug, Clone)]
struct StoredChannel {
    observation: ChannelObservation,
    topic: Option<String>,
    purpose: Option<String>,
    archived: bool,
}

#[derive(Debug, Clone)]
struct StoredGroup {
    observation: UserGroupObservation,
    description: Option<String>,
    members: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    channels: Vec<StoredChannel>,
    groups: Vec<StoredGroup>,
    users: HashMap<String, String>,
    bookmarks: Vec<BookmarkObservation>,
    calls: Vec<Call>,
    failing: HashSet<&'static str>,
    failing_targets: HashSet<(&'static str, String)>,
    page_size: usize,
    next_id: u64,
}

impl State {
    fn fresh_id(&mut self, prefix: char) -> String {
        self.next_id += 1;
        format!("{prefix}{:06}", self.next_id)
    }

    /// Records the call and applies any injected failure.
    fn record(&mut self, call: Call, target: &str) -> DirectoryResult<()> {
        let method = call.method();
        self.calls.push(call);
        if self.failing.contains(method) || self.failing_targets.contains(&(method, target.to_string())) {
            return Err(DirectoryError::api(method, "injected_failure"));
        }
        Ok(())
    }

    fn channel_mut(&mut self, method: &'static str, id: &str) -> DirectoryResult<&mut StoredChannel> {
        self.channels
            .iter_mut()
            .find(|c| c.observation.id == id && !c.archived)
            .ok_or_else(|| DirectoryError::api(method, "channel_not_found"))
    }

    fn group_mut(&mut self, method: &'static str, id: &str) -> DirectoryResult<&mut StoredGroup> {
        self.groups
            .iter_mut()
            .find(|g| g.observation.id == id)
            .ok_or_else(|| DirectoryError::api(method, "no_such_subteam"))
    }
}

/// A [`WorkspaceDirectory`] held entirely in memory.
///
/// Records every call in order and can be told to fail specific methods,
/// optionally only for one target (channel name or id, group handle or id,
/// email, bookmark title).
pub struct MemoryDirectory {
    state: Mutex<State>,
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                page_size: 100,
                ..State::default()
            }),
        }
    }

    /// Items per `conversations.list` page.
    pub fn with_page_size(self, page_size: usize) -> Self {
        self.state.lock().page_size = page_size.max(1);
        self
    }

    /// Seeds an existing channel and returns `self` for chaining.
    pub fn with_channel(self, id: &str, name: &str, is_private: bool) -> Self {
        self.state.lock().channels.push(StoredChannel {
            observation: ChannelObservation {
                id: id.to_string(),
                name: name.to_string(),
                is_private,
                member_count: 0,
            },
            topic: None,
            purpose: None,
            archived: false,
        });
        self
    }

    pub fn with_usergroup(self, id: &str, handle: &str, name: &str, disabled: bool) -> Self {
        self.state.lock().groups.push(StoredGroup {
            observation: UserGroupObservation {
                id: id.to_string(),
                handle: handle.to_string(),
                name: name.to_string(),
                disabled,
                member_count: 0,
            },
            description: None,
            members: Vec::new(),
        });
        self
    }

    /// Registers a user resolvable by email.
    pub fn with_user(self, id: &str, email: &str) -> Self {
        self.state
            .lock()
            .users
            .insert(email.to_string(), id.to_string());
        self
    }

    pub fn with_bookmark(self, channel_id: &str, id: &str, title: &str, link: &str) -> Self {
        self.state.lock().bookmarks.push(BookmarkObservation {
            id: id.to_string(),
            channel_id: channel_id.to_string(),
            title: title.to_string(),
            link: link.to_string(),
            emoji: None,
        });
        self
    }

    /// Makes every call to `method` fail.
    pub fn fail_method(&self, method: &'static str) {
        self.state.lock().failing.insert(method);
    }

    /// Makes calls to `method` fail only for `target`.
    pub fn fail_for(&self, method: &'static str, target: &str) {
        self.state
            .lock()
            .failing_targets
            .insert((method, target.to_string()));
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Calls that change workspace state.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    /// Number of calls made to `method`.
    pub fn count(&self, method: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.method() == method)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Current topic of a channel, looked up by name.
    pub fn topic_of(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .channels
            .iter()
            .find(|c| c.observation.name == name)
            .and_then(|c| c.topic.clone())
    }

    pub fn purpose_of(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .channels
            .iter()
            .find(|c| c.observation.name == name)
            .and_then(|c| c.purpose.clone())
    }

    pub fn is_archived(&self, name: &str) -> bool {
        self.state
            .lock()
            .channels
            .iter()
            .any(|c| c.observation.name == name && c.archived)
    }

    /// Current state of a user group, looked up by handle.
    pub fn usergroup(&self, handle: &str) -> Option<UserGroupObservation> {
        self.state
            .lock()
            .groups
            .iter()
            .find(|g| g.observation.handle == handle)
            .map(|g| g.observation.clone())
    }

    pub fn members_of(&self, handle: &str) -> Vec<String> {
        self.state
            .lock()
            .groups
            .iter()
            .find(|g| g.observation.handle == handle)
            .map(|g| g.members.clone())
            .unwrap_or_default()
    }

    pub fn description_of(&self, handle: &str) -> Option<String> {
        self.state
            .lock()
            .groups
            .iter()
            .find(|g| g.observation.handle == handle)
            .and_then(|g| g.description.clone())
    }

    /// Bookmarks of a channel, looked up by channel id.
    pub fn bookmarks_in(&self, channel_id: &str) -> Vec<BookmarkObservation> {
        self.state
            .lock()
            .bookmarks
            .iter()
            .filter(|b| b.channel_id == channel_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl WorkspaceDirectory for MemoryDirectory {
    async fn list_channels_page(
        &self,
        cursor: Option<String>,
    ) -> DirectoryResult<Page<ChannelObservation>> {
        let mut state = self.state.lock();
        state.record(
            Call::ListChannels {
                cursor: cursor.clone(),
            },
            "",
        )?;
        let start: usize = match cursor.as_deref() {
            None => 0,
            Some(c) => c
                .parse()
                .map_err(|_| DirectoryError::api("conversations.list", "invalid_cursor"))?,
        };
        let live: Vec<ChannelObservation> = state
            .channels
            .iter()
            .filter(|c| !c.archived)
            .map(|c| c.observation.clone())
            .collect();
        let end = (start + state.page_size).min(live.len());
        let items = live.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_cursor = (end < live.len()).then(|| end.to_string());
        Ok(Page { items, next_cursor })
    }

    async fn create_channel(&self, channel: &NewChannel) -> DirectoryResult<String> {
        let mut state = self.state.lock();
        state.record(
            Call::CreateChannel {
                name: channel.name.clone(),
                is_private: channel.is_private,
            },
            &channel.name,
        )?;
        if state
            .channels
            .iter()
            .any(|c| c.observation.name == channel.name && !c.archived)
        {
            return Err(DirectoryError::api("conversations.create", "name_taken"));
        }
        let id = state.fresh_id('C');
        state.channels.push(StoredChannel {
            observation: ChannelObservation {
                id: id.clone(),
                name: channel.name.clone(),
                is_private: channel.is_private,
                member_count: 1,
            },
            topic: None,
            purpose: None,
            archived: false,
        });
        Ok(id)
    }

    async fn set_topic(&self, channel_id: &str, topic: &str) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.record(
            Call::SetTopic {
                channel_id: channel_id.to_string(),
                topic: topic.to_string(),
            },
            channel_id,
        )?;
        state.channel_mut("conversations.setTopic", channel_id)?.topic = Some(topic.to_string());
        Ok(())
    }

    async fn set_purpose(&self, channel_id: &str, purpose: &str) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.record(
            Call::SetPurpose {
                channel_id: channel_id.to_string(),
                purpose: purpose.to_string(),
            },
            channel_id,
        )?;
        state.channel_mut("conversations.setPurpose", channel_id)?.purpose =
            Some(purpose.to_string());
        Ok(())
    }

    async fn archive_channel(&self, channel_id: &str) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.record(
            Call::ArchiveChannel {
                channel_id: channel_id.to_string(),
            },
            channel_id,
        )?;
        state.channel_mut("conversations.archive", channel_id)?.archived = true;
        Ok(())
    }

    async fn list_usergroups(
        &self,
        include_disabled: bool,
        _include_users: bool,
    ) -> DirectoryResult<Vec<UserGroupObservation>> {
        let mut state = self.state.lock();
        state.record(Call::ListUserGroups { include_disabled }, "")?;
        Ok(state
            .groups
            .iter()
            .filter(|g| include_disabled || !g.observation.disabled)
            .map(|g| g.observation.clone())
            .collect())
    }

    async fn create_usergroup(&self, fields: &UserGroupFields) -> DirectoryResult<String> {
        let mut state = self.state.lock();
        state.record(
            Call::CreateUserGroup {
                handle: fields.handle.clone(),
                name: fields.name.clone(),
            },
            &fields.handle,
        )?;
        if state
            .groups
            .iter()
            .any(|g| g.observation.handle == fields.handle)
        {
            return Err(DirectoryError::api(
                "usergroups.create",
                "handle_already_exists",
            ));
        }
        let id = state.fresh_id('S');
        state.groups.push(StoredGroup {
            observation: UserGroupObservation {
                id: id.clone(),
                handle: fields.handle.clone(),
                name: fields.name.clone(),
                disabled: false,
                member_count: 0,
            },
            description: fields.description.clone(),
            members: Vec::new(),
        });
        Ok(id)
    }

    async fn update_usergroup(
        &self,
        usergroup_id: &str,
        fields: &UserGroupFields,
    ) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.record(
            Call::UpdateUserGroup {
                usergroup_id: usergroup_id.to_string(),
                name: fields.name.clone(),
            },
            usergroup_id,
        )?;
        let group = state.group_mut("usergroups.update", usergroup_id)?;
        group.observation.name = fields.name.clone();
        if fields.description.is_some() {
            group.description = fields.description.clone();
        }
        Ok(())
    }

    async fn enable_usergroup(&self, usergroup_id: &str) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.record(
            Call::EnableUserGroup {
                usergroup_id: usergroup_id.to_string(),
            },
            usergroup_id,
        )?;
        state
            .group_mut("usergroups.enable", usergroup_id)?
            .observation
            .disabled = false;
        Ok(())
    }

    async fn disable_usergroup(&self, usergroup_id: &str) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.record(
            Call::DisableUserGroup {
                usergroup_id: usergroup_id.to_string(),
            },
            usergroup_id,
        )?;
        state
            .group_mut("usergroups.disable", usergroup_id)?
            .observation
            .disabled = true;
        Ok(())
    }

    async fn set_usergroup_members(
        &self,
        usergroup_id: &str,
        user_ids: &[String],
    ) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.record(
            Call::SetUserGroupMembers {
                usergroup_id: usergroup_id.to_string(),
                user_ids: user_ids.to_vec(),
            },
            usergroup_id,
        )?;
        let group = state.group_mut("usergroups.users.update", usergroup_id)?;
        group.members = user_ids.to_vec();
        group.observation.member_count = user_ids.len() as u64;
        Ok(())
    }

    async fn lookup_user_by_email(&self, email: &str) -> DirectoryResult<String> {
        let mut state = self.state.lock();
        state.record(
            Call::LookupUserByEmail {
                email: email.to_string(),
            },
            email,
        )?;
        state
            .users
            .get(email)
            .cloned()
            .ok_or_else(|| DirectoryError::api("users.lookupByEmail", "users_not_found"))
    }

    async fn list_bookmarks(&self, channel_id: &str) -> DirectoryResult<Vec<BookmarkObservation>> {
        let mut state = self.state.lock();
        state.record(
            Call::ListBookmarks {
                channel_id: channel_id.to_string(),
            },
            channel_id,
        )?;
        Ok(state
            .bookmarks
            .iter()
            .filter(|b| b.channel_id == channel_id)
            .cloned()
            .collect())
    }

    async fn add_bookmark(
        &self,
        channel_id: &str,
        bookmark: &BookmarkFields,
    ) -> DirectoryResult<String> {
        let mut state = self.state.lock();
        state.record(
            Call::AddBookmark {
                channel_id: channel_id.to_string(),
                title: bookmark.title.clone(),
                link: bookmark.link.clone(),
            },
            &bookmark.title,
        )?;
        let id = state.fresh_id('B');
        state.bookmarks.push(BookmarkObservation {
            id: id.clone(),
            channel_id: channel_id.to_string(),
            title: bookmark.title.clone(),
            link: bookmark.link.clone(),
            emoji: bookmark.emoji.clone(),
        });
        Ok(id)
    }

    async fn edit_bookmark(
        &self,
        channel_id: &str,
        bookmark_id: &str,
        bookmark: &BookmarkFields,
    ) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.record(
            Call::EditBookmark {
                channel_id: channel_id.to_string(),
                bookmark_id: bookmark_id.to_string(),
                link: bookmark.link.clone(),
            },
            &bookmark.title,
        )?;
        let stored = state
            .bookmarks
            .iter_mut()
            .find(|b| b.id == bookmark_id && b.channel_id == channel_id)
            .ok_or_else(|| DirectoryError::api("bookmarks.edit", "bookmark_not_found"))?;
        stored.link = bookmark.link.clone();
        stored.emoji = bookmark.emoji.clone();
        Ok(())
    }
}
