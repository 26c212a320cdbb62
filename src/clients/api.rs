use async_trait::async_trait;

use crate::clients::{
    entities::{NewPlaylist, Page, PlaylistEntry, PlaylistSummary},
    errors::Result,
};

/// Spotify Web API capabilities the archiver relies on.
///
/// Listing calls take the offset of the page to fetch (`None` for the first
/// page) and return the offset of the following page, if there is one.
/// `RemoteSpotify` is the production implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// Spotify user id of the account the access token belongs to
    async fn current_user_id(&self) -> Result<String>;

    /// One page of the playlists in the current user's collection
    async fn current_user_playlists(&self, offset: Option<u32>) -> Result<Page<PlaylistSummary>>;

    /// One page of the items of `playlist_id`
    async fn playlist_entries(
        &self,
        playlist_id: &str,
        offset: Option<u32>,
    ) -> Result<Page<PlaylistEntry>>;

    /// Creates a playlist owned by `user_id` and returns its id
    async fn create_playlist(&self, user_id: &str, playlist: &NewPlaylist) -> Result<String>;

    /// Appends `uris` to the end of the playlist. At most 100 per call.
    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<()>;
}
