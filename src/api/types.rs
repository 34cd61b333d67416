use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Local files in a playlist have no id.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Option<Album>,
}

impl Track {
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.album
            .as_ref()
            .and_then(|a| a.images.first())
            .map(|i| i.url.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Page<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    /// Null for tracks that are no longer available.
    #[serde(default)]
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPlaylist<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub public: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_deserialization() {
        let json = r#"{
            "tracks": {
                "items": [{
                    "id": "4uLU6hMCjMI75M1A2tKUQC",
                    "name": "Never Gonna Give You Up",
                    "uri": "spotify:track:4uLU6hMCjMI75M1A2tKUQC",
                    "artists": [{"name": "Rick Astley"}],
                    "album": {"name": "Whenever You Need Somebody", "images": [{"url": "https://i.scdn.co/image/x"}]}
                }],
                "next": null,
                "total": 1
            }
        }"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        let track = &resp.tracks.items[0];
        assert_eq!(track.artist_names(), "Rick Astley");
        assert_eq!(track.cover_url(), Some("https://i.scdn.co/image/x"));
        assert_eq!(resp.tracks.total, Some(1));
    }

    #[test]
    fn playlist_item_with_null_track() {
        let json = r#"{"items": [{"track": null}, {"track": {"id": null, "name": "local.mp3", "uri": "spotify:local:x"}}]}"#;
        let page: Page<PlaylistItem> = serde_json::from_str(json).unwrap();
        assert!(page.items[0].track.is_none());
        let local = page.items[1].track.as_ref().unwrap();
        assert!(local.id.is_none());
        assert_eq!(local.artist_names(), "");
        assert_eq!(local.cover_url(), None);
    }

    #[test]
    fn new_playlist_serialization() {
        let body = NewPlaylist {
            name: "road trip",
            description: "songs for the drive",
            public: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["name"], "road trip");
        assert_eq!(json["public"], true);
    }
}
