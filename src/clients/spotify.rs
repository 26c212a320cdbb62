use async_trait::async_trait;
use log::{debug, info};
use serde::de::DeserializeOwned;

use crate::clients::{
    api::SpotifyApi,
    auth::AccessToken,
    entities::{NewPlaylist, Page, PlaylistEntry, PlaylistSummary},
    errors::{Error, Result, TransportError},
};
use rspotify::{
    AuthCodeSpotify, ClientError, ClientResult, Config, Credentials as ClientPair, OAuth, Token,
    http::HttpError,
    model::{
        EpisodeId, PlayableId, PlayableItem, PlaylistId, PlaylistItem, SimplifiedPlaylist,
        TrackId, UserId,
    },
    prelude::*,
    scopes,
};

/// Redirect URI registered for the app, used when none is given
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";

const PLAYLISTS_PAGE_SIZE: u32 = 50;
const ITEMS_PAGE_SIZE: u32 = 100;

impl From<SimplifiedPlaylist> for PlaylistSummary {
    fn from(p: SimplifiedPlaylist) -> PlaylistSummary {
        PlaylistSummary {
            id: p.id.id().to_string(),
            name: p.name,
            owner_id: p.owner.id.id().to_string(),
        }
    }
}

impl From<PlaylistItem> for PlaylistEntry {
    fn from(item: PlaylistItem) -> PlaylistEntry {
        let (uri, track_is_local) = match item.track {
            Some(PlayableItem::Track(track)) => (track.id.map(|id| id.uri()), track.is_local),
            Some(PlayableItem::Episode(episode)) => (Some(episode.id.uri()), false),
            #[allow(unreachable_patterns)]
            _ => (None, false),
        };
        PlaylistEntry {
            uri,
            is_local: item.is_local || track_is_local,
        }
    }
}

/// Offset of the page after `page`, if the service announced one
fn next_offset<T: DeserializeOwned>(page: &rspotify::model::Page<T>) -> Option<u32> {
    page.next.as_ref().map(|_| {
        let fetched = u32::try_from(page.items.len()).unwrap_or(u32::MAX);
        page.offset.saturating_add(fetched)
    })
}

/// Converts rspotify failures, reading the body of HTTP status errors so the
/// status code stays visible to callers.
async fn transport_error(err: ClientError) -> Error {
    match err {
        ClientError::Http(http) => match *http {
            HttpError::StatusCode(response) => {
                let status = response.status().as_u16();
                let body = response
                    .text()
                    .await
                    .unwrap_or("Failed to get error text".to_string());
                Error::from(TransportError::Status { status, body })
            }
            other => Error::from(ClientError::Http(Box::new(other))),
        },
        other => Error::from(other),
    }
}

async fn checked<T>(result: ClientResult<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => Err(transport_error(err).await),
    }
}

fn parse_playlist_id(id: &str) -> Result<PlaylistId<'_>> {
    PlaylistId::from_id(id).map_err(|e| Error::ParseError(format!("playlist id {id:?}: {e}")))
}

fn playable_id(uri: &str) -> Result<PlayableId<'_>> {
    let parsed = if uri.starts_with("spotify:episode:") {
        EpisodeId::from_uri(uri).map(PlayableId::Episode)
    } else {
        TrackId::from_uri(uri).map(PlayableId::Track)
    };
    parsed.map_err(|e| Error::ParseError(format!("item uri {uri:?}: {e}")))
}

/// `SpotifyApi` backed by the Spotify Web API through rspotify
pub struct RemoteSpotify {
    /// Underlying rspotify client
    pub spotify: AuthCodeSpotify,
}

impl RemoteSpotify {
    /// Wraps an already authorized rspotify client
    pub fn new(spotify: AuthCodeSpotify) -> Self {
        RemoteSpotify { spotify }
    }

    /// Client using `token` for every call. The token is never cached or refreshed.
    pub fn from_access_token(token: &AccessToken) -> Self {
        let token = Token {
            access_token: token.access_token.clone(),
            expires_in: token.expires_in(),
            expires_at: Some(token.expires_at),
            ..Default::default()
        };
        RemoteSpotify::new(AuthCodeSpotify::from_token(token))
    }
}

/// Client running the authorization code flow for the scopes the archiver needs.
/// Tokens are kept in memory only.
pub fn authorization_client(
    client_id: &str,
    client_secret: &str,
    redirect_uri: &str,
) -> AuthCodeSpotify {
    let creds = ClientPair::new(client_id, client_secret);
    let oauth = OAuth {
        redirect_uri: redirect_uri.to_string(),
        scopes: scopes!(
            "playlist-read-private",
            "playlist-read-collaborative",
            "playlist-modify-private",
            "playlist-modify-public"
        ),
        ..Default::default()
    };
    AuthCodeSpotify::with_config(
        creds,
        oauth,
        Config {
            token_cached: false,
            ..Default::default()
        },
    )
}

/// Walks the user through the authorization code flow on the terminal and
/// returns the refresh token Spotify granted.
// This function requires the `cli` feature of rspotify.
pub async fn authorize_refresh_token(
    client_id: &str,
    client_secret: &str,
    redirect_uri: &str,
) -> Result<String> {
    debug!("Starting Spotify authorization ...");
    let spotify = authorization_client(client_id, client_secret, redirect_uri);
    let url = spotify.get_authorize_url(false)?;
    checked(spotify.prompt_for_token(&url).await).await?;
    info!("Authorization granted");

    let token = spotify
        .token
        .lock()
        .await
        .map_err(|_| Error::AuthenticationError {
            status: None,
            reason: "token storage is unavailable".into(),
        })?;
    token
        .as_ref()
        .and_then(|t| t.refresh_token.clone())
        .ok_or_else(|| Error::AuthenticationError {
            status: None,
            reason: "no refresh token returned, were all scopes approved?".into(),
        })
}

#[async_trait]
impl SpotifyApi for RemoteSpotify {
    async fn current_user_id(&self) -> Result<String> {
        let user = checked(self.spotify.me().await).await?;
        debug!("Authenticated as user: {:?}", user.display_name);
        Ok(user.id.id().to_string())
    }

    async fn current_user_playlists(&self, offset: Option<u32>) -> Result<Page<PlaylistSummary>> {
        let page = checked(
            self.spotify
                .current_user_playlists_manual(Some(PLAYLISTS_PAGE_SIZE), offset)
                .await,
        )
        .await?;
        let next = next_offset(&page);
        Ok(Page::new(
            page.items.into_iter().map(PlaylistSummary::from).collect(),
            next,
        ))
    }

    async fn playlist_entries(
        &self,
        playlist_id: &str,
        offset: Option<u32>,
    ) -> Result<Page<PlaylistEntry>> {
        let id = parse_playlist_id(playlist_id)?;
        let page = checked(
            self.spotify
                .playlist_items_manual(id, None, None, Some(ITEMS_PAGE_SIZE), offset)
                .await,
        )
        .await?;
        let next = next_offset(&page);
        Ok(Page::new(
            page.items.into_iter().map(PlaylistEntry::from).collect(),
            next,
        ))
    }

    async fn create_playlist(&self, user_id: &str, playlist: &NewPlaylist) -> Result<String> {
        let user = UserId::from_id(user_id)
            .map_err(|e| Error::ParseError(format!("user id {user_id:?}: {e}")))?;
        let created = checked(
            self.spotify
                .user_playlist_create(
                    user,
                    &playlist.name,
                    Some(playlist.public),
                    Some(false),
                    Some(&playlist.description),
                )
                .await,
        )
        .await?;
        Ok(created.id.id().to_string())
    }

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let id = parse_playlist_id(playlist_id)?;
        let items = uris
            .iter()
            .map(|uri| playable_id(uri))
            .collect::<Result<Vec<_>>>()?;
        let snapshot = checked(self.spotify.playlist_add_items(id, items, None).await).await?;
        debug!(
            "Added {} items to {playlist_id}, snapshot {}",
            uris.len(),
            snapshot.snapshot_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    const TRACK_ID: &str = "4iV5W9uYEdYUVa79Axb7Rh";

    fn track_json(id: Option<&str>, is_local: bool) -> Value {
        json!({
            "album": {
                "album_type": null,
                "artists": [],
                "available_markets": [],
                "external_urls": {},
                "href": null,
                "id": null,
                "images": [],
                "name": "",
                "release_date": null,
                "release_date_precision": null,
                "type": "album",
                "uri": null
            },
            "artists": [{
                "external_urls": {},
                "href": null,
                "id": null,
                "name": "Artist",
                "type": "artist",
                "uri": null
            }],
            "available_markets": [],
            "disc_number": 1,
            "duration_ms": 180_000,
            "explicit": false,
            "external_ids": {},
            "external_urls": {},
            "href": null,
            "id": id,
            "is_local": is_local,
            "name": "Song",
            "popularity": 0,
            "preview_url": null,
            "track_number": 1,
            "type": "track",
            "uri": id.map_or("spotify:local:Artist::Song:180".to_string(), |id| format!("spotify:track:{id}"))
        })
    }

    fn item_json(track: Value, is_local: bool) -> Value {
        json!({
            "added_at": "2024-03-11T04:00:00Z",
            "added_by": null,
            "is_local": is_local,
            "track": track
        })
    }

    fn entry(item: Value) -> PlaylistEntry {
        let item: PlaylistItem = serde_json::from_value(item).expect("valid playlist item");
        PlaylistEntry::from(item)
    }

    fn playlist_json(id: &str, name: &str, owner: &str) -> Value {
        json!({
            "collaborative": false,
            "description": "",
            "external_urls": {},
            "href": format!("https://api.spotify.com/v1/playlists/{id}"),
            "id": id,
            "images": [],
            "name": name,
            "owner": {
                "display_name": owner,
                "external_urls": {},
                "followers": null,
                "href": format!("https://api.spotify.com/v1/users/{owner}"),
                "id": owner,
                "images": [],
                "type": "user",
                "uri": format!("spotify:user:{owner}")
            },
            "public": false,
            "snapshot_id": "MTY5",
            "tracks": { "href": format!("https://api.spotify.com/v1/playlists/{id}/tracks"), "total": 30 },
            "type": "playlist",
            "uri": format!("spotify:playlist:{id}")
        })
    }

    fn page_json(items: Vec<Value>, offset: u32, next: Option<&str>) -> Value {
        json!({
            "href": "https://api.spotify.com/v1/me/playlists",
            "items": items,
            "limit": 50,
            "next": next,
            "offset": offset,
            "previous": null,
            "total": 120
        })
    }

    #[test]
    fn hosted_track_keeps_its_uri() {
        let entry = entry(item_json(track_json(Some(TRACK_ID), false), false));

        assert_eq!(entry.eligible_uri().as_deref(), Some("spotify:track:4iV5W9uYEdYUVa79Axb7Rh"));
    }

    #[test]
    fn local_track_is_not_eligible() {
        let entry = entry(item_json(track_json(None, true), true));

        assert!(entry.is_local);
        assert_eq!(entry.eligible_uri(), None);
    }

    #[test]
    fn missing_track_is_not_eligible() {
        let entry = entry(item_json(Value::Null, false));

        assert_eq!(
            entry,
            PlaylistEntry {
                uri: None,
                is_local: false
            }
        );
        assert_eq!(entry.eligible_uri(), None);
    }

    #[test]
    fn simplified_playlist_maps_to_summary() {
        let playlist: SimplifiedPlaylist =
            serde_json::from_value(playlist_json("37i9dQZEVXcJZyENOWUFo7", "Discover Weekly", "spotify"))
                .expect("valid playlist");

        assert_eq!(
            PlaylistSummary::from(playlist),
            PlaylistSummary {
                id: "37i9dQZEVXcJZyENOWUFo7".into(),
                name: "Discover Weekly".into(),
                owner_id: "spotify".into(),
            }
        );
    }

    #[test]
    fn next_offset_follows_announced_pages_only() {
        let items = vec![
            playlist_json("37i9dQZEVXcJZyENOWUFo7", "Discover Weekly", "spotify"),
            playlist_json("37i9dQZF1DXcBWIGoYBM5M", "Today's Top Hits", "spotify"),
        ];
        let middle: rspotify::model::Page<SimplifiedPlaylist> = serde_json::from_value(page_json(
            items.clone(),
            50,
            Some("https://api.spotify.com/v1/me/playlists?offset=52&limit=50"),
        ))
        .expect("valid page");
        assert_eq!(next_offset(&middle), Some(52));

        let last: rspotify::model::Page<SimplifiedPlaylist> =
            serde_json::from_value(page_json(items, 118, None)).expect("valid page");
        assert_eq!(next_offset(&last), None);
    }

    fn status_error(status: u16, body: &'static str) -> ClientError {
        let response = http::Response::builder()
            .status(status)
            .body(body)
            .expect("valid response");
        ClientError::Http(Box::new(HttpError::StatusCode(reqwest::Response::from(
            response,
        ))))
    }

    #[tokio::test]
    async fn status_errors_keep_status_and_body() {
        let err = transport_error(status_error(404, r#"{"error":{"status":404}}"#)).await;

        assert_eq!(err.status(), Some(404));
        match err {
            Error::TransportError(TransportError::Status { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, r#"{"error":{"status":404}}"#);
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_client_errors_are_wrapped_unchanged() {
        let json_err = serde_json::from_str::<u8>("not json").unwrap_err();

        let err = transport_error(ClientError::from(json_err)).await;

        assert_eq!(err.status(), None);
        assert!(matches!(
            err,
            Error::TransportError(TransportError::Spotify(ClientError::ParseJson(_)))
        ));
    }

    #[tokio::test]
    async fn checked_passes_values_through() {
        assert_eq!(checked(Ok::<_, ClientError>(7)).await.unwrap(), 7);
    }

    #[test]
    fn authorization_url_requests_playlist_scopes() {
        let spotify = authorization_client("my-client", "my-secret", DEFAULT_REDIRECT_URI);

        let url = spotify.get_authorize_url(false).unwrap();

        assert!(url.starts_with("https://accounts.spotify.com/authorize?"), "{url}");
        assert!(url.contains("client_id=my-client"), "{url}");
        assert!(url.contains("response_type=code"), "{url}");
        for scope in [
            "playlist-read-private",
            "playlist-read-collaborative",
            "playlist-modify-private",
            "playlist-modify-public",
        ] {
            assert!(url.contains(scope), "{scope} missing from {url}");
        }
        assert!(!spotify.config.token_cached);
    }

    #[test]
    fn playable_ids_are_parsed_from_uris() {
        match playable_id("spotify:track:4iV5W9uYEdYUVa79Axb7Rh").unwrap() {
            PlayableId::Track(id) => assert_eq!(id.id(), TRACK_ID),
            other => panic!("expected a track id, got {other:?}"),
        }

        let episode = playable_id("spotify:episode:512ojhOuo1ktJprKbVcKyQ").unwrap();
        assert!(matches!(episode, PlayableId::Episode(_)));
    }

    #[test]
    fn malformed_uri_is_a_parse_error() {
        assert!(matches!(
            playable_id("spotify:album:nope"),
            Err(Error::ParseError(_))
        ));
    }
}
