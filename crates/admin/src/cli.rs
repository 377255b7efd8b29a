use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface for the `wsync` application.
#[derive(Debug, Parser)]
#[command(
    name = "wsync",
    version,
    about = "Declarative channel, user group and bookmark sync for a Slack workspace"
)]
pub struct Cli {
    /// Directory holding channels.yaml, usergroups.yaml and bookmarks.yaml
    /// (overrides `WSYNC_WORKSPACE_DIR`; default `./workspace`).
    #[arg(long, global = true, value_name = "DIR")]
    pub workspace_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

/// Available `wsync` commands.
#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Commands {
    /// Lists every non-archived channel, sorted by name.
    ListChannels,
    /// Lists user groups, including disabled ones.
    #[command(alias = "list-user-groups")]
    ListUsergroups,
    /// Lists the bookmarks of one channel.
    ListBookmarks {
        /// Channel name, with or without the leading `#`.
        channel: String,
    },
    /// Checks the workspace documents without contacting Slack.
    Validate,
    /// Applies the workspace documents to Slack.
    ///
    /// Without a kind flag every kind is synced.
    Sync {
        /// Sync channels.
        #[arg(long, default_value_t = false)]
        channels: bool,
        /// Sync user groups.
        #[arg(long, default_value_t = false)]
        usergroups: bool,
        /// Sync bookmarks.
        #[arg(long, default_value_t = false)]
        bookmarks: bool,
        /// Sync every kind (same as giving no kind flag).
        #[arg(long, default_value_t = false)]
        all: bool,
        /// Load and check the documents but make no Slack calls.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
}
