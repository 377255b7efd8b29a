use crate::cli::{Cli, Commands};
use crate::commands::{
    handle_list_bookmarks_command, handle_list_channels_command, handle_list_usergroups_command,
    handle_sync_command, handle_validate_command,
};
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wsync_reconcile::SyncParams;
use wsync_state::{load_dotenv, Settings};

/// Runs the `wsync` command line.
///
/// Returns the process exit code: success, or failure when a sync recorded
/// errors. Fatal problems (missing token, broken documents, failed listings)
/// are returned as errors.
pub fn run() -> Result<ExitCode> {
    // .env must be applied before anything reads the environment
    let dotenv = load_dotenv();
    init_tracing();
    if let Err(e) = dotenv {
        tracing::warn!("{e:#}");
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let failed = e.use_stderr();
            e.print()?;
            return Ok(if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            });
        }
    };

    let settings = Settings::from_env().with_workspace_dir(cli.workspace_dir);
    tracing::debug!(
        workspace_dir = %settings.workspace_dir.display(),
        api_base = %settings.api_base,
        "resolved settings"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(cli.command, &settings))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(command: Commands, settings: &Settings) -> Result<ExitCode> {
    match command {
        Commands::ListChannels => handle_list_channels_command(settings).await,
        Commands::ListUsergroups => handle_list_usergroups_command(settings).await,
        Commands::ListBookmarks { channel } => {
            handle_list_bookmarks_command(settings, &channel).await
        }
        Commands::Validate => handle_validate_command(settings),
        Commands::Sync {
            channels,
            usergroups,
            bookmarks,
            all,
            dry_run,
        } => {
            let params = SyncParams::from_flags(channels, usergroups, bookmarks, all, dry_run);
            handle_sync_command(settings, &params).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsync_test_utils::WorkspaceFixture;

    fn settings(fixture: &WorkspaceFixture, token: Option<&str>) -> Settings {
        Settings::new(
            &fixture.workspace,
            "http://127.0.0.1:9/api",
            token.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn directory_commands_need_a_token() {
        let fixture = WorkspaceFixture::new().unwrap();
        let err = dispatch(Commands::ListChannels, &settings(&fixture, None))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "SLACK_BOT_TOKEN environment variable is required"
        );
    }

    #[tokio::test]
    async fn validate_runs_without_a_token() {
        let fixture = WorkspaceFixture::new().unwrap();
        let code = dispatch(Commands::Validate, &settings(&fixture, None))
            .await
            .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn dry_run_never_reaches_the_network() {
        let fixture = WorkspaceFixture::new().unwrap();
        fixture
            .write_channels("channels:\n  - name: general\n")
            .unwrap();
        let command = Commands::Sync {
            channels: false,
            usergroups: false,
            bookmarks: false,
            all: false,
            dry_run: true,
        };
        // Port 9 is unreachable; any call would fail the run
        let code = dispatch(command, &settings(&fixture, Some("xoxb-test")))
            .await
            .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }
}
