use rspotify::ClientError;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure a run can end with
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid settings
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Authentication failed{}: {reason}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    /// The accounts service refused or garbled the token exchange
    AuthenticationError {
        /// HTTP status, `None` when the answer itself was unusable
        status: Option<u16>,
        /// Response body or parse failure
        reason: String,
    },

    /// The source playlist could not be found
    #[error("{0}")]
    NotFoundError(String),

    /// The service refused to serve the source playlist
    #[error("{0}")]
    AccessDeniedError(String),

    /// A remote call failed
    #[error("Transport error: {0}")]
    TransportError(#[from] TransportError),

    /// Ids or URIs from the remote side could not be parsed
    #[error("Failed to parse transmit data, error: {0}")]
    ParseError(String),
}

/// Failures talking to a remote endpoint, surfaced as they happened.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The remote answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Any other rspotify failure
    #[error("Spotify error: {0}")]
    Spotify(#[from] ClientError),

    /// The request could not be sent or its answer not read
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl TransportError {
    /// HTTP status code of the failed call, when the remote answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Request(err) => err.status().map(|s| s.as_u16()),
            TransportError::Spotify(_) => None,
        }
    }
}

impl Error {
    /// HTTP status code behind a transport failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::TransportError(err) => err.status(),
            _ => None,
        }
    }
}

impl From<ClientError> for Error {
    fn from(err: ClientError) -> Self {
        Error::TransportError(TransportError::Spotify(err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::TransportError(TransportError::Request(err))
    }
}
