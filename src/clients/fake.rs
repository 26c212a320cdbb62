//! In-memory `SpotifyApi` used by tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::clients::{
    api::SpotifyApi,
    entities::{NewPlaylist, Page, PlaylistEntry, PlaylistSummary},
    errors::{Error, Result, TransportError},
};

pub const FAKE_USER_ID: &str = "archivist";
pub const CREATED_PLAYLIST_ID: &str = "5nEwPlAyLiStIdAbCdEfGh";

#[derive(Default)]
pub struct FakeSpotify {
    playlists: Vec<Vec<PlaylistSummary>>,
    entries: HashMap<String, Vec<Vec<PlaylistEntry>>>,
    entries_status: Option<u16>,
    fail_add_on_call: Option<usize>,
    pub playlist_page_calls: Mutex<usize>,
    pub created: Mutex<Vec<(String, NewPlaylist)>>,
    pub added: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeSpotify {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_playlists(mut self, pages: Vec<Vec<PlaylistSummary>>) -> Self {
        self.playlists = pages;
        self
    }

    pub fn with_playlist_pages(mut self, id: &str, pages: Vec<Vec<PlaylistEntry>>) -> Self {
        self.entries.insert(id.to_string(), pages);
        self
    }

    /// Every `playlist_entries` call answers with this HTTP status
    pub fn failing_entries_with(mut self, status: u16) -> Self {
        self.entries_status = Some(status);
        self
    }

    /// The n-th `add_items` call (1-based) fails with HTTP 500
    pub fn failing_add_on_call(mut self, call: usize) -> Self {
        self.fail_add_on_call = Some(call);
        self
    }

    pub fn created(&self) -> Vec<(String, NewPlaylist)> {
        self.created.lock().unwrap().clone()
    }

    pub fn added(&self) -> Vec<(String, Vec<String>)> {
        self.added.lock().unwrap().clone()
    }
}

pub fn playlist(id: &str, name: &str, owner_id: &str) -> PlaylistSummary {
    PlaylistSummary {
        id: id.to_string(),
        name: name.to_string(),
        owner_id: owner_id.to_string(),
    }
}

fn status(status: u16, body: &str) -> Error {
    Error::from(TransportError::Status {
        status,
        body: body.to_string(),
    })
}

/// Serves `pages` as if they were slices of one listing addressed by item offset.
fn page_at<T: Clone>(pages: &[Vec<T>], offset: Option<u32>) -> Result<Page<T>> {
    let wanted = offset.unwrap_or(0) as usize;
    let mut start = 0;
    for (index, items) in pages.iter().enumerate() {
        if start == wanted {
            let next = (index + 1 < pages.len()).then(|| (start + items.len()) as u32);
            return Ok(Page::new(items.clone(), next));
        }
        start += items.len();
    }
    if wanted == 0 {
        return Ok(Page::last(Vec::new()));
    }
    Err(status(400, "offset out of range"))
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    async fn current_user_id(&self) -> Result<String> {
        Ok(FAKE_USER_ID.to_string())
    }

    async fn current_user_playlists(&self, offset: Option<u32>) -> Result<Page<PlaylistSummary>> {
        *self.playlist_page_calls.lock().unwrap() += 1;
        page_at(&self.playlists, offset)
    }

    async fn playlist_entries(
        &self,
        playlist_id: &str,
        offset: Option<u32>,
    ) -> Result<Page<PlaylistEntry>> {
        if let Some(code) = self.entries_status {
            return Err(status(code, "refused"));
        }
        match self.entries.get(playlist_id) {
            Some(pages) => page_at(pages, offset),
            None => Err(status(404, "Resource not found")),
        }
    }

    async fn create_playlist(&self, user_id: &str, playlist: &NewPlaylist) -> Result<String> {
        self.created
            .lock()
            .unwrap()
            .push((user_id.to_string(), playlist.clone()));
        Ok(CREATED_PLAYLIST_ID.to_string())
    }

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let mut added = self.added.lock().unwrap();
        if self.fail_add_on_call == Some(added.len() + 1) {
            return Err(status(500, "Server error"));
        }
        added.push((playlist_id.to_string(), uris.to_vec()));
        Ok(())
    }
}
