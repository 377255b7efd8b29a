//! Cursor pagination as a lazy stream.
//!
//! Callers see a flat `Stream` of items. Each call to [`paginate`] starts
//! from the first page, and the stream ends at the first page without a
//! non-empty `next_cursor`.

use super::traits::{Page, WorkspaceDirectory};
use crate::common::ChannelObservation;
use crate::error::{DirectoryError, DirectoryResult};
use futures::stream::{self, Stream, TryStreamExt};
use std::collections::HashMap;
use std::future::Future;

/// Turns a page fetcher into a stream of items.
///
/// `fetch` receives `None` for the first page and the previous page's cursor
/// afterwards. An error ends the stream after being yielded.
pub fn paginate<'a, T, F, Fut>(
    fetch: F,
) -> impl Stream<Item = DirectoryResult<T>> + Send + 'a
where
    T: Send + 'a,
    F: FnMut(Option<String>) -> Fut + Send + 'a,
    Fut: Future<Output = DirectoryResult<Page<T>>> + Send + 'a,
{
    // Some(cursor) = page still to fetch, None = exhausted
    stream::try_unfold((fetch, Some(None::<String>)), |(mut fetch, pending)| async move {
        let Some(cursor) = pending else {
            return Ok(None);
        };
        let page = fetch(cursor).await?;
        let next = page.next_cursor.filter(|c| !c.is_empty()).map(Some);
        let items = stream::iter(page.items.into_iter().map(Ok::<T, DirectoryError>));
        Ok::<_, DirectoryError>(Some((items, (fetch, next))))
    })
    .try_flatten()
}

/// Every non-archived channel in the workspace.
pub fn channels<D>(
    directory: &D,
) -> impl Stream<Item = DirectoryResult<ChannelObservation>> + Send + '_
where
    D: WorkspaceDirectory + ?Sized,
{
    paginate(move |cursor| directory.list_channels_page(cursor))
}

/// Drains the channel listing into a list.
pub async fn all_channels<D>(directory: &D) -> DirectoryResult<Vec<ChannelObservation>>
where
    D: WorkspaceDirectory + ?Sized,
{
    channels(directory).try_collect().await
}

/// Name to id map of every channel. Later duplicates win.
pub async fn channel_ids_by_name<D>(directory: &D) -> DirectoryResult<HashMap<String, String>>
where
    D: WorkspaceDirectory + ?Sized,
{
    channels(directory)
        .try_fold(HashMap::new(), |mut map, channel| async move {
            map.insert(channel.name, channel.id);
            Ok::<_, DirectoryError>(map)
        })
        .await
}
