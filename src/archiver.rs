use std::fmt;

use chrono::{NaiveDate, Utc};
use log::{debug, error, info, warn};

use crate::{
    clients::{
        api::SpotifyApi,
        auth::TokenProvider,
        entities::NewPlaylist,
        errors::{Error, Result},
        pagination::fetch_track_uris,
        spotify::RemoteSpotify,
    },
    resolver::resolve_source_playlist,
    settings::{ArchiveSettings, MAX_BATCH_SIZE, PLAYLIST_VAR, Settings},
};

/// What a run ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// The source playlist had nothing to copy, no playlist was created
    Empty,
    /// A new playlist holds a copy of the source
    Archived {
        /// Id of the new playlist
        playlist_id: String,
        /// Name of the new playlist
        name: String,
        /// Tracks copied into it
        track_count: usize,
    },
    /// Dry run: nothing was written
    Planned {
        /// Name the playlist would get
        name: String,
        /// Tracks that would be copied
        track_count: usize,
    },
}

impl fmt::Display for ArchiveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveOutcome::Empty => write!(f, "No tracks found, exiting."),
            ArchiveOutcome::Archived { track_count, .. } => {
                write!(f, "Saved {track_count} tracks into a new playlist.")
            }
            ArchiveOutcome::Planned { name, track_count } => write!(
                f,
                "Dry run: would save {track_count} tracks into a new playlist named {name:?}."
            ),
        }
    }
}

/// Name of the playlist archiving the source on `date`
pub fn archive_name(settings: &ArchiveSettings, date: NaiveDate) -> String {
    format!(
        "{}{}{}",
        settings.base_label,
        settings.separator,
        date.format("%Y-%m-%d")
    )
}

/// Splits `uris` into insert batches, keeping their order. Sizes outside
/// `1..=100` are clamped to what the Web API accepts.
pub fn batches(uris: &[String], batch_size: usize) -> std::slice::Chunks<'_, String> {
    uris.chunks(batch_size.clamp(1, MAX_BATCH_SIZE))
}

/// Copies the source playlist into a new dated playlist
pub struct Archiver<A> {
    api: A,
    settings: ArchiveSettings,
    dry_run: bool,
}

impl Archiver<RemoteSpotify> {
    /// Exchanges the refresh token and builds an archiver talking to Spotify.
    pub async fn connect(settings: Settings) -> Result<Self> {
        info!("Authorizing client ...");
        let token = TokenProvider::default()
            .refresh(&settings.credentials)
            .await?;
        Ok(Archiver::new(
            RemoteSpotify::from_access_token(&token),
            settings.archive,
        ))
    }
}

impl<A: SpotifyApi> Archiver<A> {
    /// Archiver over any `SpotifyApi`, writes enabled
    pub fn new(api: A, settings: ArchiveSettings) -> Self {
        Archiver {
            api,
            settings,
            dry_run: false,
        }
    }

    /// Only read the source and report what would be created
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Client the archiver talks to
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Id of the playlist that would be archived
    pub async fn resolve(&self) -> Result<String> {
        resolve_source_playlist(&self.api, &self.settings)
            .await
            .inspect_err(|e| error!("Setup failed, could not resolve the source playlist: {e}"))
    }

    /// Archives the source playlist under today's UTC date
    pub async fn run(&self) -> Result<ArchiveOutcome> {
        self.run_on(Utc::now().date_naive()).await
    }

    /// Archives the source playlist into a playlist dated `date`.
    ///
    /// Batches are inserted in order and nothing is undone when one fails: the
    /// new playlist then keeps the batches inserted so far and the error is
    /// returned as is.
    pub async fn run_on(&self, date: NaiveDate) -> Result<ArchiveOutcome> {
        info!("Starting archive process ...");
        let source = self.resolve().await?;

        debug!("Fetching tracks of playlist {source} ...");
        let uris = self.fetch(&source).await?;
        debug!("Fetched {} tracks from {source}", uris.len());

        if uris.is_empty() {
            info!("No tracks found in {source}. Archive process completed.");
            return Ok(ArchiveOutcome::Empty);
        }

        let name = archive_name(&self.settings, date);
        if self.dry_run {
            info!("Dry run, skipping creation of {name:?}");
            return Ok(ArchiveOutcome::Planned {
                name,
                track_count: uris.len(),
            });
        }

        let user_id = self.api.current_user_id().await?;
        let playlist = NewPlaylist {
            name: name.clone(),
            description: self.settings.description.clone(),
            public: self.settings.public,
        };
        let playlist_id = self.api.create_playlist(&user_id, &playlist).await?;
        info!("Created playlist {name:?} ({playlist_id})");

        let mut inserted = 0;
        for batch in batches(&uris, self.settings.batch_size) {
            if let Err(e) = self.api.add_items(&playlist_id, batch).await {
                warn!(
                    "Playlist {name:?} ({playlist_id}) left with {inserted} of {} tracks",
                    uris.len()
                );
                return Err(e);
            }
            inserted += batch.len();
            debug!("Inserted {inserted}/{} tracks", uris.len());
        }

        info!("Archive process completed successfully. Archived tracks: {inserted}");
        Ok(ArchiveOutcome::Archived {
            playlist_id,
            name,
            track_count: inserted,
        })
    }

    async fn fetch(&self, source: &str) -> Result<Vec<String>> {
        match fetch_track_uris(&self.api, source).await {
            Err(e) => match e.status() {
                Some(status) if self.settings.access_denied_statuses.contains(&status) => {
                    Err(Error::AccessDeniedError(format!(
                        "Spotify refused to read playlist {source} (HTTP {status}). \
                         Algorithmic playlists may not be readable by this app; \
                         save a copy of the playlist and set {PLAYLIST_VAR} to that copy."
                    )))
                }
                _ => Err(e),
            },
            ok => ok,
        }
    }
}
