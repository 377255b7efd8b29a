//! Sync orchestrator that loads documents and runs the selected reconcilers.

use crate::common::{BookmarksFile, ChannelsFile, UserGroupsFile};
use crate::config::ConfigDir;
use crate::directory::WorkspaceDirectory;
use crate::reconcilers::{reconcile_bookmarks, reconcile_channels, reconcile_usergroups};
use crate::report::{ResourceKind, SyncReport};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Parameters for a sync operation.
///
/// ```
/// use wsync_reconcile::SyncParams;
///
/// let params = SyncParams { dry_run: true, ..Default::default() };
/// assert!(params.dry_run);
/// assert!(params.sync_channels);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncParams {
    /// Load documents but make no directory calls
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "default_true")]
    pub sync_channels: bool,
    #[serde(default = "default_true")]
    pub sync_usergroups: bool,
    #[serde(default = "default_true")]
    pub sync_bookmarks: bool,
}

impl Default for SyncParams {
    fn default() -> Self {
        Self {
            dry_run: false,
            sync_channels: true,
            sync_usergroups: true,
            sync_bookmarks: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl SyncParams {
    /// Builds parameters from command-line selection flags.
    ///
    /// With no kind flag, or with `all`, every kind is selected.
    ///
    /// ```
    /// use wsync_reconcile::SyncParams;
    ///
    /// let only_groups = SyncParams::from_flags(false, true, false, false, false);
    /// assert!(!only_groups.sync_channels && only_groups.sync_usergroups);
    ///
    /// let nothing_named = SyncParams::from_flags(false, false, false, false, true);
    /// assert!(nothing_named.sync_channels && nothing_named.sync_bookmarks);
    /// ```
    pub fn from_flags(
        channels: bool,
        usergroups: bool,
        bookmarks: bool,
        all: bool,
        dry_run: bool,
    ) -> Self {
        let everything = all || !(channels || usergroups || bookmarks);
        Self {
            dry_run,
            sync_channels: everything || channels,
            sync_usergroups: everything || usergroups,
            sync_bookmarks: everything || bookmarks,
        }
    }

    pub fn includes(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Channels => self.sync_channels,
            ResourceKind::UserGroups => self.sync_usergroups,
            ResourceKind::Bookmarks => self.sync_bookmarks,
        }
    }

    /// Selected kinds in processing order.
    pub fn selected(&self) -> Vec<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .filter(|kind| self.includes(*kind))
            .collect()
    }
}

/// Documents for the selected kinds, loaded up front.
#[derive(Debug, Default)]
struct Documents {
    channels: Option<ChannelsFile>,
    usergroups: Option<UserGroupsFile>,
    bookmarks: Option<BookmarksFile>,
}

impl Documents {
    fn load(config: &ConfigDir, params: &SyncParams) -> Result<Self> {
        let mut docs = Self::default();
        if params.sync_channels {
            docs.channels = Some(config.load_channels()?);
        }
        if params.sync_usergroups {
            docs.usergroups = Some(config.load_usergroups()?);
        }
        if params.sync_bookmarks {
            docs.bookmarks = Some(config.load_bookmarks()?);
        }
        Ok(docs)
    }
}

/// Runs reconcilers against one directory.
pub struct SyncOrchestrator<D: WorkspaceDirectory> {
    directory: D,
    config: ConfigDir,
}

impl<D: WorkspaceDirectory> SyncOrchestrator<D> {
    pub fn new(directory: D, config: ConfigDir) -> Self {
        Self { directory, config }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn config(&self) -> &ConfigDir {
        &self.config
    }

    /// Performs the sync operation.
    ///
    /// Every selected document is loaded before the first directory call; a
    /// load failure is returned as an error. Per-item failures end up in the
    /// report instead. A dry run stops after loading.
    pub async fn sync(&self, params: &SyncParams) -> Result<SyncReport> {
        let docs = Documents::load(&self.config, params)?;
        let mut report = SyncReport::new(params.dry_run);

        if params.dry_run {
            tracing::info!("Dry run: documents loaded, no changes made");
            return Ok(report);
        }

        if let Some(channels) = &docs.channels {
            tracing::info!("Syncing {}...", ResourceKind::Channels.heading());
            let result = reconcile_channels(&self.directory, channels).await;
            report.record(ResourceKind::Channels, result);
        }
        if let Some(usergroups) = &docs.usergroups {
            tracing::info!("Syncing {}...", ResourceKind::UserGroups.heading());
            let result = reconcile_usergroups(&self.directory, usergroups).await;
            report.record(ResourceKind::UserGroups, result);
        }
        if let Some(bookmarks) = &docs.bookmarks {
            tracing::info!("Syncing {}...", ResourceKind::Bookmarks.heading());
            let result = reconcile_bookmarks(&self.directory, bookmarks).await;
            report.record(ResourceKind::Bookmarks, result);
        }

        tracing::debug!(errors = report.total_errors(), "sync finished");
        Ok(report)
    }
}
