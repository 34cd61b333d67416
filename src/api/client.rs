use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::error::AnnotatifyError;
use crate::oauth::CredentialManager;
use crate::url::encode_component;

use super::types::{NewPlaylist, Page, Playlist, PlaylistItem, SearchResponse, Track, User};

const PLAYLIST_ID_LEN: usize = 22;

fn is_playlist_id(s: &str) -> bool {
    s.len() == PLAYLIST_ID_LEN && s.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Accept a bare playlist id or a `https://open.spotify.com/playlist/<id>...`
/// URL and return the id.
pub fn extract_playlist_id(input: &str) -> Option<String> {
    let input = input.trim();
    if is_playlist_id(input) {
        return Some(input.to_string());
    }
    let (_, rest) = input.split_once("spotify.com/playlist/")?;
    let candidate: String = rest.chars().take(PLAYLIST_ID_LEN).collect();
    is_playlist_id(&candidate).then_some(candidate)
}

/// Authorized JSON calls against the Web API. Every request asks the
/// credential manager for a token first.
pub struct SpotifyClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<CredentialManager>,
}

impl SpotifyClient {
    pub fn new(http: reqwest::Client, base_url: &str, credentials: Arc<CredentialManager>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Send an authorized request to `endpoint` (relative to the API base,
    /// e.g. `v1/me`) and decode the JSON response.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, AnnotatifyError> {
        let token = self.credentials.get_valid_token().await?;
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        tracing::debug!("{method} {url}");

        let mut req = self.http.request(method, &url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AnnotatifyError::ApiError { status, body });
        }

        Ok(resp.json().await?)
    }

    pub async fn current_user(&self) -> Result<User, AnnotatifyError> {
        self.fetch_json(Method::GET, "v1/me", None).await
    }

    pub async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, AnnotatifyError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AnnotatifyError::InvalidInput("Please enter a search term".into()));
        }
        let endpoint = format!(
            "v1/search?q={}&type=track&market=US&limit={}",
            encode_component(query),
            limit.clamp(1, 50)
        );
        let resp: SearchResponse = self.fetch_json(Method::GET, &endpoint, None).await?;
        Ok(resp.tracks.items)
    }

    pub async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<Playlist, AnnotatifyError> {
        let body = serde_json::to_value(NewPlaylist {
            name,
            description,
            public,
        })
        .map_err(|e| AnnotatifyError::InvalidInput(e.to_string()))?;
        let endpoint = format!("v1/users/{}/playlists", encode_component(user_id));
        self.fetch_json(Method::POST, &endpoint, Some(&body)).await
    }

    pub async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), AnnotatifyError> {
        if uris.is_empty() {
            return Ok(());
        }
        // The endpoint takes at most 100 uris per call.
        for chunk in uris.chunks(100) {
            let body = serde_json::json!({ "uris": chunk });
            let endpoint = format!("v1/playlists/{playlist_id}/tracks");
            let _: serde_json::Value = self.fetch_json(Method::POST, &endpoint, Some(&body)).await?;
        }
        Ok(())
    }

    pub async fn get_playlist(&self, playlist_id: &str) -> Result<Playlist, AnnotatifyError> {
        let endpoint = format!("v1/playlists/{playlist_id}");
        match self.fetch_json(Method::GET, &endpoint, None).await {
            Err(AnnotatifyError::ApiError { status: 404, .. }) => {
                Err(AnnotatifyError::PlaylistNotFound(playlist_id.to_string()))
            }
            Err(AnnotatifyError::ApiError { status: 403, .. }) => {
                Err(AnnotatifyError::PlaylistPrivate(playlist_id.to_string()))
            }
            other => other,
        }
    }

    /// Tracks of a playlist, skipping entries with no track behind them.
    pub async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, AnnotatifyError> {
        let endpoint = format!("v1/playlists/{playlist_id}/tracks");
        let page: Page<PlaylistItem> = self.fetch_json(Method::GET, &endpoint, None).await?;
        Ok(page.items.into_iter().filter_map(|item| item.track).collect())
    }
}
