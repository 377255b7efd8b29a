//! Bookmark reconciliation. Bookmarks are added or edited, never removed.

use super::Applied;
use crate::common::{BookmarkFields, BookmarkSpec, BookmarksFile};
use crate::directory::{channel_ids_by_name, WorkspaceDirectory};
use crate::error::DirectoryResult;
use crate::report::ReconcileResult;
use std::collections::HashMap;

/// Converges each channel's bookmarks to `config`, matching by title.
///
/// Channels are visited in document order. A channel that does not exist is
/// skipped with a warning. Result entries read `<channel>/<title>`.
pub async fn reconcile_bookmarks<D>(directory: &D, config: &BookmarksFile) -> ReconcileResult
where
    D: WorkspaceDirectory + ?Sized,
{
    let mut result = ReconcileResult::new();

    let channel_ids = match channel_ids_by_name(directory).await {
        Ok(map) => map,
        Err(e) => {
            result.push_error(format!("Failed to list channels: {e}"));
            return result;
        }
    };

    for (channel, specs) in &config.bookmarks {
        let Some(channel_id) = channel_ids.get(channel) else {
            tracing::warn!("Channel not found: #{channel}, skipping bookmarks");
            continue;
        };

        let existing: HashMap<String, String> = match directory.list_bookmarks(channel_id).await {
            Ok(list) => list.into_iter().map(|b| (b.title, b.id)).collect(),
            Err(e) => {
                result.push_error(format!("Failed to sync bookmarks for #{channel}: {e}"));
                continue;
            }
        };

        for spec in specs {
            let entry = format!("{channel}/{}", spec.title);
            match sync_bookmark(directory, channel_id, spec, &existing).await {
                Ok(Applied::Created) => {
                    tracing::info!("Created bookmark: #{channel} - {}", spec.title);
                    result.created.push(entry);
                }
                Ok(Applied::Updated) => {
                    tracing::info!("Updated bookmark: #{channel} - {}", spec.title);
                    result.updated.push(entry);
                }
                Err(e) => result.push_error(format!(
                    "Failed to sync bookmark {} in #{channel}: {e}",
                    spec.title
                )),
            }
        }
    }

    result
}

async fn sync_bookmark<D>(
    directory: &D,
    channel_id: &str,
    spec: &BookmarkSpec,
    existing: &HashMap<String, String>,
) -> DirectoryResult<Applied>
where
    D: WorkspaceDirectory + ?Sized,
{
    let fields = BookmarkFields::from(spec);
    match existing.get(&spec.title) {
        Some(bookmark_id) => {
            directory
                .edit_bookmark(channel_id, bookmark_id, &fields)
                .await?;
            Ok(Applied::Updated)
        }
        None => {
            let id = directory.add_bookmark(channel_id, &fields).await?;
            tracing::debug!(bookmark_id = %id, "bookmark added");
            Ok(Applied::Created)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{BookmarkObservation, ChannelObservation};
    use crate::directory::{MockWorkspaceDirectory, Page};
    use crate::error::DirectoryError;
    use indexmap::IndexMap;
    use mockall::predicate::eq;

    fn channel(id: &str, name: &str) -> ChannelObservation {
        ChannelObservation {
            id: id.to_string(),
            name: name.to_string(),
            is_private: false,
            member_count: 1,
        }
    }

    fn bookmark(title: &str, link: &str) -> BookmarkSpec {
        BookmarkSpec {
            title: title.to_string(),
            link: link.to_string(),
            emoji: Some(":link:".to_string()),
        }
    }

    fn config(entries: Vec<(&str, Vec<BookmarkSpec>)>) -> BookmarksFile {
        let mut bookmarks = IndexMap::new();
        for (channel, specs) in entries {
            bookmarks.insert(channel.to_string(), specs);
        }
        BookmarksFile { bookmarks }
    }

    #[tokio::test]
    async fn matching_title_is_edited_and_others_added() {
        let mut mock = MockWorkspaceDirectory::new();
        mock.expect_list_channels_page()
            .returning(|_| Ok(Page::last(vec![channel("C1", "general")])));
        mock.expect_list_bookmarks()
            .with(eq("C1"))
            .times(1)
            .returning(|_| {
                Ok(vec![BookmarkObservation {
                    id: "Bk1".to_string(),
                    channel_id: "C1".to_string(),
                    title: "Handbook".to_string(),
                    link: "https://old".to_string(),
                    emoji: None,
                }])
            });
        mock.expect_edit_bookmark()
            .withf(|c, b, f| c == "C1" && b == "Bk1" && f.link == "https://new")
            .times(1)
            .returning(|_, _, _| Ok(()));
        mock.expect_add_bookmark()
            .withf(|c, f| c == "C1" && f.title == "Wiki")
            .times(1)
            .returning(|_, _| Ok("Bk2".to_string()));

        let result = reconcile_bookmarks(
            &mock,
            &config(vec![(
                "general",
                vec![bookmark("Handbook", "https://new"), bookmark("Wiki", "https://wiki")],
            )]),
        )
        .await;

        assert_eq!(result.updated, vec!["general/Handbook".to_string()]);
        assert_eq!(result.created, vec!["general/Wiki".to_string()]);
        assert!(result.archived.is_empty());
    }

    #[tokio::test]
    async fn failing_bookmark_does_not_stop_the_next_in_channel() {
        let mut mock = MockWorkspaceDirectory::new();
        mock.expect_list_channels_page()
            .returning(|_| Ok(Page::last(vec![channel("C1", "general")])));
        mock.expect_list_bookmarks()
            .with(eq("C1"))
            .returning(|_| Ok(vec![]));
        mock.expect_add_bookmark()
            .withf(|_, f| f.title == "A")
            .times(1)
            .returning(|_, _| Err(DirectoryError::api("bookmarks.add", "invalid_link")));
        mock.expect_add_bookmark()
            .withf(|_, f| f.title == "B")
            .times(1)
            .returning(|_, _| Ok("Bk3".to_string()));

        let result = reconcile_bookmarks(
            &mock,
            &config(vec![(
                "general",
                vec![bookmark("A", "https://a"), bookmark("B", "https://b")],
            )]),
        )
        .await;

        assert_eq!(result.created, vec!["general/B".to_string()]);
        assert_eq!(
            result.errors,
            vec!["Failed to sync bookmark A in #general: bookmarks.add: invalid_link".to_string()]
        );
    }

    #[tokio::test]
    async fn unknown_channel_is_skipped_without_error() {
        let mut mock = MockWorkspaceDirectory::new();
        mock.expect_list_channels_page()
            .returning(|_| Ok(Page::last(vec![])));
        mock.expect_list_bookmarks().never();

        let result = reconcile_bookmarks(
            &mock,
            &config(vec![("nowhere", vec![bookmark("A", "https://a")])]),
        )
        .await;
        assert_eq!(result, ReconcileResult::default());
    }

    #[tokio::test]
    async fn listing_failure_skips_only_that_channel() {
        let mut mock = MockWorkspaceDirectory::new();
        mock.expect_list_channels_page().returning(|_| {
            Ok(Page::last(vec![channel("C1", "a"), channel("C2", "b")]))
        });
        mock.expect_list_bookmarks()
            .with(eq("C1"))
            .returning(|_| Err(DirectoryError::api("bookmarks.list", "not_in_channel")));
        mock.expect_list_bookmarks()
            .with(eq("C2"))
            .returning(|_| Ok(vec![]));
        mock.expect_add_bookmark()
            .withf(|c, _| c == "C2")
            .times(1)
            .returning(|_, _| Ok("Bk9".to_string()));

        let result = reconcile_bookmarks(
            &mock,
            &config(vec![
                ("a", vec![bookmark("X", "https://x")]),
                ("b", vec![bookmark("Y", "https://y")]),
            ]),
        )
        .await;

        assert_eq!(
            result.errors,
            vec!["Failed to sync bookmarks for #a: bookmarks.list: not_in_channel".to_string()]
        );
        assert_eq!(result.created, vec!["b/Y".to_string()]);
    }
}
