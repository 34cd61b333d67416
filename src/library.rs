//! Locally saved playlists and per-track annotations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::Playlist;
use crate::error::AnnotatifyError;
use crate::storage::KeyValueStore;

const PLAYLISTS_KEY: &str = "playlists";

fn annotation_key(track_id: &str) -> String {
    format!("song-{track_id}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<&Playlist> for SavedPlaylist {
    fn from(p: &Playlist) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            description: p.description.clone().filter(|d| !d.is_empty()),
        }
    }
}

pub struct Library {
    store: Arc<dyn KeyValueStore>,
}

impl Library {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn saved_playlists(&self) -> Result<Vec<SavedPlaylist>, AnnotatifyError> {
        match self.store.get(PLAYLISTS_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                AnnotatifyError::StorageError(format!("Corrupt saved playlists: {e}"))
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Remember a playlist. A playlist already saved under the same id is
    /// replaced in place.
    pub fn save_playlist(&self, playlist: SavedPlaylist) -> Result<(), AnnotatifyError> {
        let mut playlists = self.saved_playlists()?;
        match playlists.iter_mut().find(|p| p.id == playlist.id) {
            Some(existing) => *existing = playlist,
            None => playlists.push(playlist),
        }
        let raw = serde_json::to_string(&playlists)
            .map_err(|e| AnnotatifyError::StorageError(e.to_string()))?;
        self.store.set(PLAYLISTS_KEY, &raw)
    }

    /// Resolve a saved playlist by id or (case-insensitive) name.
    pub fn find_playlist(&self, needle: &str) -> Result<Option<SavedPlaylist>, AnnotatifyError> {
        Ok(self
            .saved_playlists()?
            .into_iter()
            .find(|p| p.id == needle || p.name.eq_ignore_ascii_case(needle)))
    }

    pub fn annotation(&self, track_id: &str) -> Result<Option<String>, AnnotatifyError> {
        self.store.get(&annotation_key(track_id))
    }

    /// Store the note for a track; an empty note removes it.
    pub fn set_annotation(&self, track_id: &str, text: &str) -> Result<(), AnnotatifyError> {
        if track_id.trim().is_empty() {
            return Err(AnnotatifyError::InvalidInput("Track id must not be empty".into()));
        }
        if text.is_empty() {
            return self.clear_annotation(track_id);
        }
        self.store.set(&annotation_key(track_id), text)
    }

    pub fn clear_annotation(&self, track_id: &str) -> Result<(), AnnotatifyError> {
        self.store.clear(&annotation_key(track_id))
    }
}
