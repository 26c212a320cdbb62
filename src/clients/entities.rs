/// One page of a remote listing plus the offset of the next page, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items of this page in listing order
    pub items: Vec<T>,
    /// Offset of the following page, `None` on the last one
    pub next: Option<u32>,
}

impl<T> Page<T> {
    /// Page followed by the one at `next`
    pub fn new(items: Vec<T>, next: Option<u32>) -> Self {
        Page { items, next }
    }

    /// Final page of a listing
    pub fn last(items: Vec<T>) -> Self {
        Page { items, next: None }
    }
}

/// Playlist as listed in the current user's collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    /// Bare playlist id
    pub id: String,
    /// Display name
    pub name: String,
    /// User id of the owner
    pub owner_id: String,
}

/// Item of a playlist. Local files and unavailable items carry no URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    /// `spotify:track:` or `spotify:episode:` URI
    pub uri: Option<String>,
    /// Whether the item is a file from the user's device
    pub is_local: bool,
}

impl PlaylistEntry {
    /// Hosted track with the given URI
    pub fn track(uri: impl Into<String>) -> Self {
        PlaylistEntry {
            uri: Some(uri.into()),
            is_local: false,
        }
    }

    /// URI of the entry if it can be added to a remote playlist
    pub fn eligible_uri(self) -> Option<String> {
        if self.is_local { None } else { self.uri }
    }
}

/// Playlist creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylist {
    pub name: String,
    pub description: String,
    /// Listed on the owner's profile
    pub public: bool,
}
