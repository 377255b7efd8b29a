use super::{connect, exit_code};
use anyhow::Result;
use std::process::ExitCode;
use wsync_reconcile::{ConfigDir, SyncOrchestrator, SyncParams, SyncReport, WorkspaceDirectory};
use wsync_state::Settings;

/// Handle the `sync` command.
///
/// The token is required even for a dry run, so a dry run also checks that
/// the process is configured to reach Slack.
pub(crate) async fn handle_sync_command(
    settings: &Settings,
    params: &SyncParams,
) -> Result<ExitCode> {
    let directory = connect(settings)?;
    if params.dry_run {
        println!("DRY RUN MODE - No changes will be made\n");
    }
    println!("Starting workspace sync...\n");

    let report = run_sync(directory, ConfigDir::new(&settings.workspace_dir), params).await?;
    print!("{}", report.format_summary());
    Ok(exit_code(report.success()))
}

async fn run_sync<D: WorkspaceDirectory>(
    directory: D,
    config: ConfigDir,
    params: &SyncParams,
) -> Result<SyncReport> {
    let selected: Vec<&str> = params.selected().iter().map(|k| k.as_str()).collect();
    tracing::debug!(kinds = ?selected, dry_run = params.dry_run, "starting sync");
    SyncOrchestrator::new(directory, config).sync(params).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsync_reconcile::{MemoryDirectory, ResourceKind};
    use wsync_test_utils::WorkspaceFixture;

    #[tokio::test]
    async fn selected_kinds_only_are_reported() {
        let fixture = WorkspaceFixture::new().unwrap();
        fixture
            .write_channels("channels:\n  - name: general\n")
            .unwrap();

        let report = run_sync(
            MemoryDirectory::new(),
            ConfigDir::new(&fixture.workspace),
            &SyncParams::from_flags(true, false, false, false, false),
        )
        .await
        .unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(
            report.get(ResourceKind::Channels).unwrap().created,
            vec!["general".to_string()]
        );
        let summary = report.format_summary();
        assert!(summary.contains("channels:\n  Created: 1\n  Updated: 0\n  Archived: 0\n"));
        assert!(summary.ends_with("Sync completed successfully!\n"));
    }

    #[tokio::test]
    async fn missing_document_is_fatal() {
        let fixture = WorkspaceFixture::new().unwrap();
        fixture.remove("usergroups.yaml").unwrap();

        let err = run_sync(
            MemoryDirectory::new(),
            ConfigDir::new(&fixture.workspace),
            &SyncParams::default(),
        )
        .await
        .unwrap_err();
        assert!(format!("{err:#}").contains("usergroups.yaml"));
    }

    #[tokio::test]
    async fn recorded_errors_fail_the_run() {
        let fixture = WorkspaceFixture::new().unwrap();
        fixture
            .write_channels("channels: []\narchive: [old]\n")
            .unwrap();
        let directory = MemoryDirectory::new().with_channel("C1", "old", false);
        directory.fail_method("conversations.archive");

        let report = run_sync(
            directory,
            ConfigDir::new(&fixture.workspace),
            &SyncParams::default(),
        )
        .await
        .unwrap();

        assert!(!report.success());
        assert_eq!(exit_code(report.success()), ExitCode::FAILURE);
        assert!(report.format_summary().contains("  Errors: 1\n"));
    }
}
