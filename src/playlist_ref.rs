use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::clients::errors::{Error, Result};

static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z]{22}$").expect("valid regex"));

// spotify:playlist:<id> and the legacy spotify:user:<user>:playlist:<id>
static URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^spotify:(?:user:[^:\s]+:)?playlist:([0-9A-Za-z]{22})$").expect("valid regex")
});

// https://open.spotify.com/[intl-xx/][user/<user>/]playlist/<id>[?si=...]
static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:open|play)\.spotify\.com/(?:intl-[A-Za-z]{2}(?:-[A-Za-z]{2})?/)?(?:user/[^/\s]+/)?playlist/([0-9A-Za-z]{22})/?(?:[?#]\S*)?$",
    )
    .expect("valid regex")
});

/// Bare 22 character base62 id of a playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef(String);

impl PlaylistRef {
    /// Accepts a bare id, a `spotify:playlist:` URI or an open.spotify.com link.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if BARE_ID.is_match(input) {
            return Ok(PlaylistRef(input.to_string()));
        }
        URI.captures(input)
            .or_else(|| LINK.captures(input))
            .map(|captures| PlaylistRef(captures[1].to_string()))
            .ok_or_else(|| {
                Error::ConfigurationError(format!(
                    "{input:?} is not a playlist id, spotify:playlist: URI or playlist link"
                ))
            })
    }

    /// The normalized id
    pub fn id(&self) -> &str {
        &self.0
    }

    /// Consumes the reference, returning the id
    pub fn into_id(self) -> String {
        self.0
    }
}

impl FromStr for PlaylistRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PlaylistRef::parse(s)
    }
}

impl fmt::Display for PlaylistRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
