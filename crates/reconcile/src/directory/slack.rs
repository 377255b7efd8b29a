//! Slack Web API implementation of [`WorkspaceDirectory`].

use super::traits::{Page, WorkspaceDirectory};
use crate::common::{
    BookmarkFields, BookmarkObservation, ChannelObservation, NewChannel, UserGroupFields,
    UserGroupObservation,
};
use crate::error::{DirectoryError, DirectoryResult};
use async_trait::async_trait;
use reqwest::header::{RETRY_AFTER, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Production API endpoint.
pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

const CHANNEL_TYPES: &str = "public_channel,private_channel";
const PAGE_LIMIT: &str = "200";
const CLIENT_AGENT: &str = concat!("wsync/", env!("CARGO_PKG_VERSION"));

type Params = Vec<(&'static str, String)>;

/// Web API client authenticated with a bot token.
///
/// Every request is a form-encoded `POST {api_base}/{method}`. The JSON
/// envelope's `ok` flag decides success; `error` codes become
/// [`DirectoryError::Api`].
#[derive(Debug, Clone)]
pub struct SlackDirectory {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl SlackDirectory {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_base, token)
    }

    /// Uses a preconfigured HTTP client (proxies, timeouts).
    pub fn with_client(
        http: reqwest::Client,
        api_base: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            http,
            api_base,
            token: token.into(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: &Params,
    ) -> DirectoryResult<R> {
        tracing::debug!(method, "calling Slack API");
        let response = self
            .http
            .post(format!("{}/{}", self.api_base, method))
            .bearer_auth(&self.token)
            .header(USER_AGENT, CLIENT_AGENT)
            .form(params)
            .send()
            .await
            .map_err(|source| DirectoryError::Transport { method, source })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            return Err(DirectoryError::RateLimited {
                method,
                retry_after,
            });
        }
        if !status.is_success() {
            return Err(DirectoryError::Status {
                method,
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DirectoryError::protocol(method, e.to_string()))?;
        if !body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            let code = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error");
            if code == "ratelimited" {
                return Err(DirectoryError::RateLimited {
                    method,
                    retry_after: None,
                });
            }
            return Err(DirectoryError::api(method, code));
        }
        serde_json::from_value(body).map_err(|e| DirectoryError::protocol(method, e.to_string()))
    }
}

#[derive(Deserialize)]
struct Ack {}

#[derive(Deserialize)]
struct IdOnly {
    id: String,
}

#[derive(Deserialize)]
struct ChannelList {
    #[serde(default)]
    channels: Vec<RawChannel>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct RawChannel {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    is_private: bool,
    #[serde(default)]
    num_members: u64,
}

#[derive(Deserialize)]
struct CreatedChannel {
    channel: IdOnly,
}

#[derive(Deserialize)]
struct UserGroupList {
    #[serde(default)]
    usergroups: Vec<RawUserGroup>,
}

#[derive(Deserialize)]
struct RawUserGroup {
    id: String,
    #[serde(default)]
    handle: String,
    #[serde(default)]
    name: String,
    /// Non-zero once the group is disabled
    #[serde(default)]
    date_delete: i64,
    #[serde(default)]
    users: Option<Vec<String>>,
    #[serde(default)]
    user_count: Option<Value>,
}

impl RawUserGroup {
    fn member_count(&self) -> u64 {
        if let Some(users) = &self.users {
            return users.len() as u64;
        }
        // user_count arrives as a number or a numeric string
        match &self.user_count {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(Value::String(s)) => s.parse().unwrap_or(0),
            _ => 0,
        }
    }
}

#[derive(Deserialize)]
struct CreatedUserGroup {
    usergroup: IdOnly,
}

#[derive(Deserialize)]
struct UserLookup {
    user: IdOnly,
}

#[derive(Deserialize)]
struct BookmarkList {
    #[serde(default)]
    bookmarks: Vec<RawBookmark>,
}

#[derive(Deserialize)]
struct RawBookmark {
    id: String,
    #[serde(default)]
    channel_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    emoji: Option<String>,
}

#[derive(Deserialize)]
struct CreatedBookmark {
    bookmark: IdOnly,
}

fn flag(value: bool) -> String {
    value.to_string()
}

fn push_opt(params: &mut Params, key: &'static str, value: &Option<String>) {
    if let Some(value) = value {
        params.push((key, value.clone()));
    }
}

#[async_trait]
impl WorkspaceDirectory for SlackDirectory {
    async fn list_channels_page(
        &self,
        cursor: Option<String>,
    ) -> DirectoryResult<Page<ChannelObservation>> {
        let mut params: Params = vec![
            ("types", CHANNEL_TYPES.to_string()),
            ("exclude_archived", flag(true)),
            ("limit", PAGE_LIMIT.to_string()),
        ];
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor));
        }
        let list: ChannelList = self.call("conversations.list", &params).await?;
        let items: Vec<ChannelObservation> = list
            .channels
            .into_iter()
            .filter(|c| !c.name.is_empty() && !c.id.is_empty())
            .map(|c| ChannelObservation {
                id: c.id,
                name: c.name,
                is_private: c.is_private,
                member_count: c.num_members,
            })
            .collect();
        let next_cursor = list.response_metadata.and_then(|m| m.next_cursor);
        tracing::debug!(count = items.len(), more = next_cursor.is_some(), "fetched channel page");
        Ok(Page { items, next_cursor })
    }

    async fn create_channel(&self, channel: &NewChannel) -> DirectoryResult<String> {
        let params: Params = vec![
            ("name", channel.name.clone()),
            ("is_private", flag(channel.is_private)),
        ];
        let created: CreatedChannel = self.call("conversations.create", &params).await?;
        Ok(created.channel.id)
    }

    async fn set_topic(&self, channel_id: &str, topic: &str) -> DirectoryResult<()> {
        let params: Params = vec![("channel", channel_id.to_string()), ("topic", topic.to_string())];
        self.call::<Ack>("conversations.setTopic", &params).await?;
        Ok(())
    }

    async fn set_purpose(&self, channel_id: &str, purpose: &str) -> DirectoryResult<()> {
        let params: Params = vec![
            ("channel", channel_id.to_string()),
            ("purpose", purpose.to_string()),
        ];
        self.call::<Ack>("conversations.setPurpose", &params).await?;
        Ok(())
    }

    async fn archive_channel(&self, channel_id: &str) -> DirectoryResult<()> {
        let params: Params = vec![("channel", channel_id.to_string())];
        self.call::<Ack>("conversations.archive", &params).await?;
        Ok(())
    }

    async fn list_usergroups(
        &self,
        include_disabled: bool,
        include_users: bool,
    ) -> DirectoryResult<Vec<UserGroupObservation>> {
        let params: Params = vec![
            ("include_disabled", flag(include_disabled)),
            ("include_users", flag(include_users)),
            ("include_count", flag(true)),
        ];
        let list: UserGroupList = self.call("usergroups.list", &params).await?;
        Ok(list
            .usergroups
            .into_iter()
            .filter(|g| !g.handle.is_empty() && !g.id.is_empty())
            .map(|g| {
                let member_count = g.member_count();
                UserGroupObservation {
                    disabled: g.date_delete > 0,
                    id: g.id,
                    handle: g.handle,
                    name: g.name,
                    member_count,
                }
            })
            .collect())
    }

    async fn create_usergroup(&self, fields: &UserGroupFields) -> DirectoryResult<String> {
        let mut params: Params = vec![
            ("name", fields.name.clone()),
            ("handle", fields.handle.clone()),
        ];
        push_opt(&mut params, "description", &fields.description);
        let created: CreatedUserGroup = self.call("usergroups.create", &params).await?;
        Ok(created.usergroup.id)
    }

    async fn update_usergroup(
        &self,
        usergroup_id: &str,
        fields: &UserGroupFields,
    ) -> DirectoryResult<()> {
        let mut params: Params = vec![
            ("usergroup", usergroup_id.to_string()),
            ("name", fields.name.clone()),
        ];
        push_opt(&mut params, "description", &fields.description);
        self.call::<Ack>("usergroups.update", &params).await?;
        Ok(())
    }

    async fn enable_usergroup(&self, usergroup_id: &str) -> DirectoryResult<()> {
        let params: Params = vec![("usergroup", usergroup_id.to_string())];
        self.call::<Ack>("usergroups.enable", &params).await?;
        Ok(())
    }

    async fn disable_usergroup(&self, usergroup_id: &str) -> DirectoryResult<()> {
        let params: Params = vec![("usergroup", usergroup_id.to_string())];
        self.call::<Ack>("usergroups.disable", &params).await?;
        Ok(())
    }

    async fn set_usergroup_members(
        &self,
        usergroup_id: &str,
        user_ids: &[String],
    ) -> DirectoryResult<()> {
        let params: Params = vec![
            ("usergroup", usergroup_id.to_string()),
            ("users", user_ids.join(",")),
        ];
        self.call::<Ack>("usergroups.users.update", &params).await?;
        Ok(())
    }

    async fn lookup_user_by_email(&self, email: &str) -> DirectoryResult<String> {
        let params: Params = vec![("email", email.to_string())];
        let found: UserLookup = self.call("users.lookupByEmail", &params).await?;
        Ok(found.user.id)
    }

    async fn list_bookmarks(&self, channel_id: &str) -> DirectoryResult<Vec<BookmarkObservation>> {
        let params: Params = vec![("channel_id", channel_id.to_string())];
        let list: BookmarkList = self.call("bookmarks.list", &params).await?;
        Ok(list
            .bookmarks
            .into_iter()
            .filter(|b| !b.title.is_empty() && !b.id.is_empty())
            .map(|b| BookmarkObservation {
                channel_id: if b.channel_id.is_empty() {
                    channel_id.to_string()
                } else {
                    b.channel_id
                },
                id: b.id,
                title: b.title,
                link: b.link,
                emoji: b.emoji.filter(|e| !e.is_empty()),
            })
            .collect())
    }

    async fn add_bookmark(
        &self,
        channel_id: &str,
        bookmark: &BookmarkFields,
    ) -> DirectoryResult<String> {
        let mut params: Params = vec![
            ("channel_id", channel_id.to_string()),
            ("title", bookmark.title.clone()),
            ("type", "link".to_string()),
            ("link", bookmark.link.clone()),
        ];
        push_opt(&mut params, "emoji", &bookmark.emoji);
        let created: CreatedBookmark = self.call("bookmarks.add", &params).await?;
        Ok(created.bookmark.id)
    }

    async fn edit_bookmark(
        &self,
        channel_id: &str,
        bookmark_id: &str,
        bookmark: &BookmarkFields,
    ) -> DirectoryResult<()> {
        let mut params: Params = vec![
            ("bookmark_id", bookmark_id.to_string()),
            ("channel_id", channel_id.to_string()),
            ("link", bookmark.link.clone()),
        ];
        push_opt(&mut params, "emoji", &bookmark.emoji);
        self.call::<Ack>("bookmarks.edit", &params).await?;
        Ok(())
    }
}
