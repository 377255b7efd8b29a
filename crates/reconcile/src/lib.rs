//! Declarative sync of a Slack workspace for wsync.
//!
//! Channels, user groups and channel bookmarks are described in YAML
//! documents. Each run enumerates what exists, then creates, updates,
//! archives or disables until the workspace matches the documents. Nothing
//! is remembered between runs.
//!
//! The remote side sits behind the [`WorkspaceDirectory`] trait.
//! [`SlackDirectory`] talks to the Slack Web API; [`MemoryDirectory`] keeps
//! everything in memory and records calls, which makes it handy for tests
//! and rehearsals.
//!
//! # Examples
//!
//! ```
//! use wsync_reconcile::{
//!     reconcile_channels, ChannelSpec, ChannelsFile, MemoryDirectory,
//! };
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let directory = MemoryDirectory::new().with_channel("C1", "general", false);
//! let config = ChannelsFile {
//!     channels: vec![
//!         ChannelSpec {
//!             name: "general".into(),
//!             topic: Some("Company-wide announcements".into()),
//!             purpose: None,
//!             is_private: None,
//!         },
//!         ChannelSpec {
//!             name: "new-team".into(),
//!             topic: None,
//!             purpose: None,
//!             is_private: Some(true),
//!         },
//!     ],
//!     archive: vec![],
//! };
//!
//! let result = reconcile_channels(&directory, &config).await;
//! assert_eq!(result.updated, vec!["general".to_string()]);
//! assert_eq!(result.created, vec!["new-team".to_string()]);
//! assert_eq!(
//!     directory.topic_of("general").as_deref(),
//!     Some("Company-wide announcements")
//! );
//! # });
//! ```

#![deny(unsafe_code)]

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub mod common;
pub mod config;
pub mod directory;
pub mod error;
pub mod orchestrator;
pub mod reconcilers;
pub mod report;
pub mod validation;

pub use common::{
    BookmarkFields, BookmarkObservation, BookmarkSpec, BookmarksFile, ChannelObservation,
    ChannelSpec, ChannelsFile, MemberRef, NewChannel, UserGroupFields, UserGroupObservation,
    UserGroupSpec, UserGroupsFile,
};
pub use config::ConfigDir;
pub use directory::{
    all_channels, channel_ids_by_name, Call, MemoryDirectory, Page, SlackDirectory,
    WorkspaceDirectory, DEFAULT_API_BASE,
};
pub use error::{DirectoryError, DirectoryResult, ErrorKind};
pub use orchestrator::{SyncOrchestrator, SyncParams};
pub use reconcilers::{
    reconcile_bookmarks, reconcile_channels, reconcile_usergroups, resolve_members,
};
pub use report::{ReconcileResult, ResourceCounts, ResourceKind, SyncReport};
pub use validation::{validate_workspace, ValidationReport};
