//! CLI command handlers for the wsync application.

mod list;
mod sync;
mod validate;

pub(crate) use list::{
    handle_list_bookmarks_command, handle_list_channels_command, handle_list_usergroups_command,
};
pub(crate) use sync::handle_sync_command;
pub(crate) use validate::handle_validate_command;

use anyhow::Result;
use std::process::ExitCode;
use wsync_reconcile::SlackDirectory;
use wsync_state::Settings;

/// Client for commands that talk to Slack. Fails without a token.
fn connect(settings: &Settings) -> Result<SlackDirectory> {
    let token = settings.token()?;
    Ok(SlackDirectory::new(settings.api_base.as_str(), token))
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
