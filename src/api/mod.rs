pub mod client;
pub mod types;

pub use client::{extract_playlist_id, SpotifyClient};
pub use types::{Playlist, PlaylistItem, Track, User};
