use std::future::Future;

use futures::stream::{self, Stream, TryStreamExt};
use log::debug;

use crate::clients::{
    api::SpotifyApi,
    entities::Page,
    errors::{Error, Result},
};

/// Walks a paginated listing lazily, following `next` offsets until the last page.
///
/// Items are yielded in arrival order. The traversal reads the collection as it
/// is while it is being walked, so concurrent edits on the remote side may
/// cause items to be skipped or seen twice. A page that announces a successor
/// but carries no items ends the walk.
pub fn paginate<T, F, Fut>(list_page: F) -> impl Stream<Item = Result<T>>
where
    F: FnMut(Option<u32>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    stream::try_unfold(
        (list_page, Some(None::<u32>)),
        |(mut list_page, cursor)| async move {
            let Some(offset) = cursor else {
                return Ok(None);
            };
            let page = list_page(offset).await?;
            debug!(
                "Fetched page at offset {} with {} items",
                offset.unwrap_or(0),
                page.items.len()
            );
            let next = if page.items.is_empty() {
                None
            } else {
                page.next.map(Some)
            };
            let items = stream::iter(page.items.into_iter().map(Ok::<T, Error>));
            Ok::<_, Error>(Some((items, (list_page, next))))
        },
    )
    .try_flatten()
}

/// Collects the URIs of every entry of a playlist that can be copied into
/// another playlist. Local files and entries without URI are skipped.
pub async fn fetch_track_uris<A>(api: &A, playlist_id: &str) -> Result<Vec<String>>
where
    A: SpotifyApi + ?Sized,
{
    paginate(|offset| api.playlist_entries(playlist_id, offset))
        .try_filter_map(|entry| async move { Ok(entry.eligible_uri()) })
        .try_collect()
        .await
}
