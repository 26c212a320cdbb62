/// Capability trait over the Spotify Web API
pub mod api;
/// OAuth refresh-token exchange
pub mod auth;
/// Data entities for playlists and their items
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Lazy traversal of paginated listings
pub mod pagination;
/// Spotify API client
pub mod spotify;

#[cfg(test)]
pub(crate) mod fake;

pub use api::SpotifyApi;
pub use auth::{AccessToken, Credentials, TokenProvider};
pub use spotify::RemoteSpotify;
