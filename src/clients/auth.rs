use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use log::debug;
use serde::Deserialize;

use crate::clients::errors::{Error, Result};

/// Token endpoint of the Spotify accounts service
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
// Spotify access tokens live for an hour unless told otherwise
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Client pair plus the long-lived refresh token granted to it
#[derive(Clone)]
pub struct Credentials {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Refresh token granted to the client
    pub refresh_token: String,
}

// Keep secrets out of logs and panics
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Short-lived bearer token. Lives for the duration of the process only.
#[derive(Clone, Debug)]
pub struct AccessToken {
    /// Bearer token sent to the Web API
    pub access_token: String,
    /// Moment the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Remaining lifetime, negative once expired
    pub fn expires_in(&self) -> TimeDelta {
        self.expires_at - Utc::now()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

/// Exchanges refresh tokens for access tokens at the accounts service
pub struct TokenProvider {
    client: reqwest::Client,
    token_url: String,
    timeout: Duration,
}

impl Default for TokenProvider {
    fn default() -> Self {
        Self::new(SPOTIFY_TOKEN_URL)
    }
}

impl TokenProvider {
    /// Provider talking to `token_url` instead of the default endpoint
    pub fn new(token_url: impl Into<String>) -> Self {
        TokenProvider {
            client: reqwest::Client::new(),
            token_url: token_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replaces the default 30 s request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exchanges the refresh token of `credentials` for a new access token.
    // https://developer.spotify.com/documentation/web-api/tutorials/refreshing-tokens
    pub async fn refresh(&self, credentials: &Credentials) -> Result<AccessToken> {
        debug!("Requesting access token from {}", self.token_url);
        let response = self
            .client
            .post(&self.token_url)
            // Serializes to x-www-form-urlencoded and sets the content type
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", credentials.refresh_token.as_str()),
            ])
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        let token = parse_token_response(status, &body)?;
        debug!("Access token valid until {}", token.expires_at);
        Ok(token)
    }
}

/// Turns the token endpoint answer into an `AccessToken`.
pub fn parse_token_response(status: u16, body: &str) -> Result<AccessToken> {
    if !(200..300).contains(&status) {
        return Err(Error::AuthenticationError {
            status: Some(status),
            reason: body.to_string(),
        });
    }

    let response: TokenResponse =
        serde_json::from_str(body).map_err(|err| Error::AuthenticationError {
            status: None,
            reason: format!("malformed token response: {err}"),
        })?;

    let access_token = response
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::AuthenticationError {
            status: None,
            reason: "malformed token response: no access_token field".into(),
        })?;

    let lifetime = TimeDelta::try_seconds(response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN))
        .unwrap_or(TimeDelta::zero());

    Ok(AccessToken {
        access_token,
        expires_at: Utc::now() + lifetime,
    })
}
