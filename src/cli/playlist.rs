use std::io::IsTerminal;

use crate::api::extract_playlist_id;
use crate::app::App;
use crate::error::AnnotatifyError;
use crate::library::SavedPlaylist;

use super::output::{print_annotated_tracks, print_playlists, print_tracks, OutputMode};

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

pub async fn run_search(app: &App, query: &str, limit: u32, mode: OutputMode) -> Result<(), AnnotatifyError> {
    let tracks = app.api().search_tracks(query, limit).await?;
    print_tracks(&tracks, mode, std::io::stdout().is_terminal());
    Ok(())
}

/// Create a playlist on the account, fill it, and remember it locally.
pub async fn run_create(
    app: &App,
    name: &str,
    description: &str,
    public: bool,
    uris: &[String],
) -> Result<(), AnnotatifyError> {
    if name.trim().is_empty() {
        return Err(AnnotatifyError::InvalidInput("Playlist name must not be empty".into()));
    }
    if let Some(bad) = uris.iter().find(|u| !u.starts_with("spotify:")) {
        return Err(AnnotatifyError::InvalidInput(format!(
            "'{bad}' is not a track URI (expected spotify:track:<id>)"
        )));
    }

    let api = app.api();
    let user = api.current_user().await?;
    tracing::debug!("Creating playlist for user {}", user.id);
    let playlist = api.create_playlist(&user.id, name, description, public).await?;
    api.add_tracks(&playlist.id, uris).await?;

    app.library().save_playlist(SavedPlaylist::from(&playlist))?;
    println!("Created playlist '{}' ({}) with {} tracks.", playlist.name, playlist.id, uris.len());
    Ok(())
}

pub async fn run_import(app: &App, input: &str) -> Result<(), AnnotatifyError> {
    if input.trim().is_empty() {
        return Err(AnnotatifyError::InvalidInput("Please enter a playlist URL".into()));
    }
    let id = extract_playlist_id(input)
        .ok_or_else(|| AnnotatifyError::InvalidPlaylistId(input.trim().to_string()))?;

    let playlist = app.api().get_playlist(&id).await?;
    app.library().save_playlist(SavedPlaylist::from(&playlist))?;
    println!("Imported playlist '{}' ({}).", playlist.name, playlist.id);
    Ok(())
}

pub fn run_playlists(app: &App, mode: OutputMode) -> Result<(), AnnotatifyError> {
    let playlists = app.library().saved_playlists()?;
    print_playlists(&playlists, mode);
    Ok(())
}

/// Show a playlist's tracks with their annotations. `needle` may be a saved
/// playlist's name, an id, or a playlist URL.
pub async fn run_show(app: &App, needle: &str, mode: OutputMode) -> Result<(), AnnotatifyError> {
    let id = match app.library().find_playlist(needle)? {
        Some(saved) => saved.id,
        None => extract_playlist_id(needle)
            .ok_or_else(|| AnnotatifyError::InvalidPlaylistId(needle.trim().to_string()))?,
    };

    let api = app.api();
    let playlist = api.get_playlist(&id).await?;
    let tracks = api.playlist_tracks(&id).await?;

    let library = app.library();
    let mut annotated = Vec::with_capacity(tracks.len());
    for track in tracks {
        let note = match &track.id {
            Some(track_id) => library.annotation(track_id)?,
            None => None,
        };
        annotated.push((track, note));
    }

    let is_tty = std::io::stdout().is_terminal();
    if mode == OutputMode::Pretty {
        println!("{}", playlist.name);
        if let Some(desc) = playlist.description.as_deref().filter(|d| !d.is_empty()) {
            println!("{desc}");
        }
        println!();
    }
    print_annotated_tracks(&annotated, mode, is_tty);
    Ok(())
}
