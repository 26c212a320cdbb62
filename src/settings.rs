use log::debug;

use crate::{
    clients::{
        auth::Credentials,
        errors::{Error, Result},
    },
    playlist_ref::PlaylistRef,
};

/// Variable holding the OAuth client id
pub const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
/// Variable holding the OAuth client secret
pub const CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";
/// Variable holding the refresh token
pub const REFRESH_TOKEN_VAR: &str = "SPOTIFY_REFRESH_TOKEN";
/// Optional variable naming the source playlist
pub const PLAYLIST_VAR: &str = "DW_PLAYLIST_ID";

/// Maximum number of items the Web API accepts per insert call
pub const MAX_BATCH_SIZE: usize = 100;

/// Knobs of a single archive run
#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    /// Name of the source playlist looked up in the user's collection
    pub target_name: String,
    /// Owner id of the source playlist looked up in the user's collection
    pub target_owner: String,
    /// Explicit source playlist, skips the lookup when set
    pub source: Option<PlaylistRef>,
    /// Destination playlists are named `<base_label><separator><date>`
    pub base_label: String,
    /// Placed between the label and the date
    pub separator: String,
    /// Description of destination playlists
    pub description: String,
    /// Visibility of destination playlists
    pub public: bool,
    /// Items per insert call, clamped to 1..=100
    pub batch_size: usize,
    /// Statuses the service answers with when it refuses to serve the source playlist
    pub access_denied_statuses: Vec<u16>,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        ArchiveSettings {
            target_name: "Discover Weekly".into(),
            target_owner: "spotify".into(),
            source: None,
            base_label: "Discover Weekly".into(),
            separator: " – ".into(),
            description: "Auto-archived from Discover Weekly.".into(),
            public: false,
            batch_size: MAX_BATCH_SIZE,
            access_denied_statuses: vec![403, 404],
        }
    }
}

/// Everything a run needs, read from the environment
#[derive(Debug, Clone)]
pub struct Settings {
    /// OAuth credentials for the token exchange
    pub credentials: Credentials,
    /// Archive behaviour
    pub archive: ArchiveSettings,
}

fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            Error::ConfigurationError(format!(
                "Missing required environment variable {name}. Check README.MD for details."
            ))
        })
}

/// Client id and secret of the registered app, used before a refresh token exists
#[derive(Clone)]
pub struct AppCredentials {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
}

impl std::fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCredentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl AppCredentials {
    /// Reads the process environment, after loading a `.env` file if there is one.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the client pair through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(AppCredentials {
            client_id: required(&lookup, CLIENT_ID_VAR)?,
            client_secret: required(&lookup, CLIENT_SECRET_VAR)?,
        })
    }
}

impl Settings {
    /// Reads the process environment, after loading a `.env` file if there is one.
    ///
    /// A `source` given here replaces `DW_PLAYLIST_ID`, which is then not read at all.
    pub fn from_env(source: Option<PlaylistRef>) -> Result<Self> {
        load_dotenv();
        Self::from_lookup(|name| std::env::var(name).ok(), source)
    }

    /// Builds the settings from variables returned by `lookup`.
    pub fn from_lookup<F>(lookup: F, source: Option<PlaylistRef>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app = AppCredentials::from_lookup(&lookup)?;
        let credentials = Credentials {
            client_id: app.client_id,
            client_secret: app.client_secret,
            refresh_token: required(&lookup, REFRESH_TOKEN_VAR)?,
        };

        let source = match source {
            Some(source) => {
                debug!("Explicit source playlist given, {PLAYLIST_VAR} is not read");
                Some(source)
            }
            None => source_from_env(&lookup)?,
        };

        Ok(Settings {
            credentials,
            archive: ArchiveSettings {
                source,
                ..ArchiveSettings::default()
            },
        })
    }
}

fn source_from_env<F>(lookup: &F) -> Result<Option<PlaylistRef>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(PLAYLIST_VAR).filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };
    PlaylistRef::parse(&value).map(Some).map_err(|e| match e {
        Error::ConfigurationError(msg) => {
            Error::ConfigurationError(format!("{PLAYLIST_VAR} is invalid: {msg}"))
        }
        other => other,
    })
}
