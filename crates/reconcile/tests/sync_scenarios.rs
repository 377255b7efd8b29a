//! End-to-end reconciliation scenarios against the in-memory directory.
//!
//! Documents are written to a temp workspace and synced through the
//! orchestrator, so these cover loading, ordering and reporting together.

use wsync_reconcile::{
    Call, ConfigDir, MemoryDirectory, ResourceKind, SyncOrchestrator, SyncParams,
};
use wsync_test_utils::WorkspaceFixture;

fn orchestrator(
    fixture: &WorkspaceFixture,
    directory: MemoryDirectory,
) -> SyncOrchestrator<MemoryDirectory> {
    SyncOrchestrator::new(directory, ConfigDir::new(&fixture.workspace))
}

fn only(kind: ResourceKind) -> SyncParams {
    SyncParams::from_flags(
        kind == ResourceKind::Channels,
        kind == ResourceKind::UserGroups,
        kind == ResourceKind::Bookmarks,
        false,
        false,
    )
}

#[tokio::test]
async fn given_existing_and_new_channel_when_synced_then_update_and_create() {
    let fixture = WorkspaceFixture::new().unwrap();
    fixture
        .write_channels(
            "channels:\n  - name: general\n    topic: t\n  - name: new-team\n    is_private: true\n",
        )
        .unwrap();
    let sync = orchestrator(
        &fixture,
        MemoryDirectory::new().with_channel("C1", "general", false),
    );

    let report = sync.sync(&only(ResourceKind::Channels)).await.unwrap();
    let channels = report.get(ResourceKind::Channels).unwrap();

    assert_eq!(channels.created, vec!["new-team".to_string()]);
    assert_eq!(channels.updated, vec!["general".to_string()]);
    assert!(channels.archived.is_empty());
    assert!(channels.errors.is_empty());

    assert_eq!(
        sync.directory().mutations(),
        vec![
            Call::SetTopic {
                channel_id: "C1".to_string(),
                topic: "t".to_string(),
            },
            Call::CreateChannel {
                name: "new-team".to_string(),
                is_private: true,
            },
        ]
    );
}

#[tokio::test]
async fn given_unchanged_config_when_synced_twice_then_second_run_only_updates() {
    let fixture = WorkspaceFixture::new().unwrap();
    fixture
        .write_channels("channels:\n  - name: eng\n    purpose: Build things\n")
        .unwrap();
    fixture
        .write_usergroups(
            "usergroups:\n  - handle: oncall\n    name: On-call\n    members: [U1]\n",
        )
        .unwrap();
    let sync = orchestrator(&fixture, MemoryDirectory::new());
    let params = SyncParams::from_flags(true, true, false, false, false);

    let first = sync.sync(&params).await.unwrap();
    assert_eq!(
        first.get(ResourceKind::Channels).unwrap().created,
        vec!["eng".to_string()]
    );
    assert_eq!(
        first.get(ResourceKind::UserGroups).unwrap().created,
        vec!["oncall".to_string()]
    );

    sync.directory().clear_calls();
    let second = sync.sync(&params).await.unwrap();
    for kind in [ResourceKind::Channels, ResourceKind::UserGroups] {
        let result = second.get(kind).unwrap();
        assert!(result.created.is_empty(), "{kind} created again");
        assert_eq!(result.updated.len(), 1);
    }
    assert_eq!(sync.directory().count("conversations.create"), 0);
    assert_eq!(sync.directory().count("usergroups.create"), 0);
}

#[tokio::test]
async fn given_archive_list_when_synced_then_only_present_channels_archived() {
    let fixture = WorkspaceFixture::new().unwrap();
    fixture
        .write_channels("channels: []\narchive:\n  - old-project\n  - long-gone\n")
        .unwrap();
    let sync = orchestrator(
        &fixture,
        MemoryDirectory::new().with_channel("C7", "old-project", false),
    );

    let report = sync.sync(&only(ResourceKind::Channels)).await.unwrap();
    let channels = report.get(ResourceKind::Channels).unwrap();

    assert_eq!(channels.archived, vec!["old-project".to_string()]);
    assert!(channels.errors.is_empty());
    assert_eq!(sync.directory().count("conversations.archive"), 1);
    assert!(sync.directory().is_archived("old-project"));
}

#[tokio::test]
async fn given_unknown_email_when_synced_then_group_keeps_remaining_members() {
    let fixture = WorkspaceFixture::new().unwrap();
    fixture
        .write_usergroups(
            "usergroups:\n  - handle: design\n    name: Design\n    members:\n      - U100\n      - known@example.com\n      - missing@example.com\n",
        )
        .unwrap();
    let sync = orchestrator(
        &fixture,
        MemoryDirectory::new().with_user("U200", "known@example.com"),
    );

    let report = sync.sync(&only(ResourceKind::UserGroups)).await.unwrap();
    let groups = report.get(ResourceKind::UserGroups).unwrap();

    assert_eq!(groups.created, vec!["design".to_string()]);
    assert!(groups.errors.is_empty());
    assert_eq!(
        sync.directory().members_of("design"),
        vec!["U100".to_string(), "U200".to_string()]
    );
}

#[tokio::test]
async fn given_disabled_group_in_config_when_synced_then_it_is_reenabled() {
    let fixture = WorkspaceFixture::new().unwrap();
    fixture
        .write_usergroups(
            "usergroups:\n  - handle: eng\n    name: Engineering\n    description: Builders\ndisable:\n  - legacy\n",
        )
        .unwrap();
    let sync = orchestrator(
        &fixture,
        MemoryDirectory::new()
            .with_usergroup("S1", "eng", "Eng", true)
            .with_usergroup("S2", "legacy", "Legacy", false),
    );

    let report = sync.sync(&only(ResourceKind::UserGroups)).await.unwrap();
    let groups = report.get(ResourceKind::UserGroups).unwrap();

    assert_eq!(groups.updated, vec!["eng".to_string()]);
    assert_eq!(groups.archived, vec!["legacy".to_string()]);

    let eng = sync.directory().usergroup("eng").unwrap();
    assert!(!eng.disabled);
    assert_eq!(eng.name, "Engineering");
    assert_eq!(
        sync.directory().description_of("eng").as_deref(),
        Some("Builders")
    );
    assert!(sync.directory().usergroup("legacy").unwrap().disabled);
    // No members configured, so membership is left alone
    assert_eq!(sync.directory().count("usergroups.users.update"), 0);
}

#[tokio::test]
async fn given_unlisted_bookmarks_when_synced_then_nothing_is_deleted() {
    let fixture = WorkspaceFixture::new().unwrap();
    fixture
        .write_bookmarks(
            "bookmarks:\n  general:\n    - title: Handbook\n      link: https://example.com/v2\n      emoji: \":book:\"\n",
        )
        .unwrap();
    let sync = orchestrator(
        &fixture,
        MemoryDirectory::new()
            .with_channel("C1", "general", false)
            .with_bookmark("C1", "Bk1", "Handbook", "https://example.com/v1")
            .with_bookmark("C1", "Bk2", "Hand-made", "https://example.com/craft"),
    );

    let report = sync.sync(&only(ResourceKind::Bookmarks)).await.unwrap();
    let bookmarks = report.get(ResourceKind::Bookmarks).unwrap();

    assert_eq!(bookmarks.updated, vec!["general/Handbook".to_string()]);
    let stored = sync.directory().bookmarks_in("C1");
    assert_eq!(stored.len(), 2);
    let handbook = stored.iter().find(|b| b.title == "Handbook").unwrap();
    assert_eq!(handbook.link, "https://example.com/v2");
    assert_eq!(handbook.emoji.as_deref(), Some(":book:"));
}

#[tokio::test]
async fn given_failing_channel_when_synced_then_later_kinds_still_run() {
    let fixture = WorkspaceFixture::new().unwrap();
    fixture
        .write_channels("channels:\n  - name: broken\n  - name: fine\n")
        .unwrap();
    fixture
        .write_usergroups("usergroups:\n  - handle: eng\n    name: Engineering\n")
        .unwrap();
    let directory = MemoryDirectory::new();
    directory.fail_for("conversations.create", "broken");
    let sync = orchestrator(&fixture, directory);

    let report = sync.sync(&SyncParams::default()).await.unwrap();

    let channels = report.get(ResourceKind::Channels).unwrap();
    assert_eq!(channels.created, vec!["fine".to_string()]);
    assert_eq!(
        channels.errors,
        vec!["Failed to sync channel broken: conversations.create: injected_failure".to_string()]
    );
    assert_eq!(
        report.get(ResourceKind::UserGroups).unwrap().created,
        vec!["eng".to_string()]
    );
    assert!(!report.success());
    assert!(report
        .format_summary()
        .ends_with("\nCompleted with 1 error(s)\n"));
}

#[tokio::test]
async fn given_failing_listing_when_synced_then_one_error_for_that_kind() {
    let fixture = WorkspaceFixture::new().unwrap();
    fixture
        .write_usergroups("usergroups:\n  - handle: eng\n    name: Engineering\n")
        .unwrap();
    let directory = MemoryDirectory::new();
    directory.fail_method("usergroups.list");
    let sync = orchestrator(&fixture, directory);

    let report = sync.sync(&SyncParams::default()).await.unwrap();

    assert_eq!(report.get(ResourceKind::UserGroups).unwrap().errors.len(), 1);
    assert!(report.get(ResourceKind::Channels).unwrap().errors.is_empty());
    assert!(report.get(ResourceKind::Bookmarks).unwrap().errors.is_empty());
    assert_eq!(report.total_errors(), 1);
}

#[tokio::test]
async fn given_dry_run_with_default_selection_then_zero_calls_and_no_sections() {
    let fixture = WorkspaceFixture::new().unwrap();
    fixture
        .write_channels("channels:\n  - name: general\n    topic: t\n")
        .unwrap();
    let sync = orchestrator(
        &fixture,
        MemoryDirectory::new().with_channel("C1", "general", false),
    );

    let report = sync
        .sync(&SyncParams::from_flags(false, false, false, false, true))
        .await
        .unwrap();

    assert!(sync.directory().calls().is_empty());
    assert_eq!(
        report.format_summary(),
        "=== Sync Summary ===\n\nSync completed successfully!\n"
    );
}

#[tokio::test]
async fn given_many_channels_when_synced_then_every_page_is_read() {
    let fixture = WorkspaceFixture::new().unwrap();
    fixture
        .write_channels("channels:\n  - name: c5\n    topic: last\n")
        .unwrap();
    let mut directory = MemoryDirectory::new().with_page_size(2);
    for i in 1..=5 {
        directory = directory.with_channel(&format!("C{i}"), &format!("c{i}"), false);
    }
    let sync = orchestrator(&fixture, directory);

    let report = sync.sync(&only(ResourceKind::Channels)).await.unwrap();

    assert_eq!(
        report.get(ResourceKind::Channels).unwrap().updated,
        vec!["c5".to_string()]
    );
    assert_eq!(sync.directory().count("conversations.list"), 3);
    assert_eq!(sync.directory().topic_of("c5").as_deref(), Some("last"));
}
