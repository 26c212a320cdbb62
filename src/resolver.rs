use std::pin::pin;

use futures::TryStreamExt;
use log::{debug, info};

use crate::{
    clients::{
        api::SpotifyApi,
        errors::{Error, Result},
        pagination::paginate,
    },
    settings::{ArchiveSettings, PLAYLIST_VAR},
};

/// Finds the id of the playlist to archive.
///
/// An explicitly configured playlist wins. Otherwise the user's playlists are
/// scanned page by page for the first one whose name and owner match the
/// configured target, ignoring case. Scanning stops at the first match.
pub async fn resolve_source_playlist<A>(api: &A, settings: &ArchiveSettings) -> Result<String>
where
    A: SpotifyApi + ?Sized,
{
    if let Some(source) = &settings.source {
        debug!("Using configured source playlist {source}");
        return Ok(source.id().to_string());
    }

    let name = settings.target_name.to_lowercase();
    let owner = settings.target_owner.to_lowercase();
    debug!("Looking up {name:?} owned by {owner:?} in the user's playlists ...");

    let playlists = paginate(|offset| api.current_user_playlists(offset)).try_filter(|p| {
        let found = p.name.to_lowercase() == name && p.owner_id.to_lowercase() == owner;
        async move { found }
    });
    let mut playlists = pin!(playlists);

    match playlists.try_next().await? {
        Some(playlist) => {
            info!("Found {:?} with id {}", playlist.name, playlist.id);
            Ok(playlist.id)
        }
        None => Err(Error::NotFoundError(format!(
            "Couldn't find '{}' owned by '{}' among your playlists. Set {PLAYLIST_VAR} to the playlist id, URI or link.",
            settings.target_name, settings.target_owner
        ))),
    }
}
