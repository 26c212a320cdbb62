//! Dwarchive - Archive the weekly Spotify recommendation playlist
//!
//! This library copies the tracks of an algorithmic playlist such as
//! "Discover Weekly" into a newly created, dated private playlist so that
//! each week's recommendations are kept after Spotify replaces them.

/// Archive pipeline: resolve, fetch, create, insert
pub mod archiver;
/// Client modules for interacting with the Spotify accounts service and Web API
pub mod clients;
/// Normalization of playlist ids, URIs and links
pub mod playlist_ref;
/// Lookup of the playlist to archive
pub mod resolver;
/// Environment-driven configuration
pub mod settings;
