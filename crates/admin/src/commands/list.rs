use super::connect;
use anyhow::{bail, Result};
use std::fmt::Write as _;
use std::process::ExitCode;
use wsync_reconcile::{
    all_channels, channel_ids_by_name, BookmarkObservation, ChannelObservation,
    UserGroupObservation, WorkspaceDirectory,
};
use wsync_state::Settings;

pub(crate) async fn handle_list_channels_command(settings: &Settings) -> Result<ExitCode> {
    let directory = connect(settings)?;
    tracing::info!("Fetching channels...");
    print!("{}", channel_listing(&directory).await?);
    Ok(ExitCode::SUCCESS)
}

pub(crate) async fn handle_list_usergroups_command(settings: &Settings) -> Result<ExitCode> {
    let directory = connect(settings)?;
    tracing::info!("Fetching user groups...");
    print!("{}", usergroup_listing(&directory).await?);
    Ok(ExitCode::SUCCESS)
}

pub(crate) async fn handle_list_bookmarks_command(
    settings: &Settings,
    channel: &str,
) -> Result<ExitCode> {
    let directory = connect(settings)?;
    print!("{}", bookmark_listing(&directory, channel).await?);
    Ok(ExitCode::SUCCESS)
}

async fn channel_listing<D>(directory: &D) -> Result<String>
where
    D: WorkspaceDirectory + ?Sized,
{
    let mut channels = all_channels(directory).await?;
    channels.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(render_channels(&channels))
}

async fn usergroup_listing<D>(directory: &D) -> Result<String>
where
    D: WorkspaceDirectory + ?Sized,
{
    let groups = directory.list_usergroups(true, true).await?;
    Ok(render_usergroups(&groups))
}

/// Resolves `channel` by name (a leading `#` is ignored) and renders its
/// bookmarks. An unknown channel is an error.
async fn bookmark_listing<D>(directory: &D, channel: &str) -> Result<String>
where
    D: WorkspaceDirectory + ?Sized,
{
    let name = channel.trim().trim_start_matches('#');
    let ids = channel_ids_by_name(directory).await?;
    let Some(id) = ids.get(name) else {
        bail!("Channel not found: #{name}");
    };
    let bookmarks = directory.list_bookmarks(id).await?;
    Ok(render_bookmarks(name, &bookmarks))
}

fn render_channels(channels: &[ChannelObservation]) -> String {
    let mut out = String::from("Channels:\n");
    for channel in channels {
        let visibility = if channel.is_private {
            "(private)"
        } else {
            "(public)"
        };
        let _ = writeln!(
            out,
            "  #{} {} - {} members",
            channel.name, visibility, channel.member_count
        );
    }
    let _ = writeln!(out, "\nTotal: {} channels", channels.len());
    out
}

fn render_usergroups(groups: &[UserGroupObservation]) -> String {
    let mut out = String::from("User Groups:\n");
    for group in groups {
        let status = if group.disabled {
            "(disabled)"
        } else {
            "(active)"
        };
        let _ = writeln!(
            out,
            "  @{} - {} {} - {} members",
            group.handle, group.name, status, group.member_count
        );
    }
    let _ = writeln!(out, "\nTotal: {} user groups", groups.len());
    out
}

fn render_bookmarks(channel: &str, bookmarks: &[BookmarkObservation]) -> String {
    let mut out = format!("Bookmarks in #{channel}:\n");
    for bookmark in bookmarks {
        let _ = writeln!(
            out,
            "  {} {}: {}",
            bookmark.emoji.as_deref().unwrap_or(""),
            bookmark.title,
            bookmark.link
        );
    }
    let _ = writeln!(out, "\nTotal: {} bookmarks", bookmarks.len());
    out
}
