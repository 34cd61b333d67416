use colored::Colorize;

use crate::api::Track;
use crate::error::AnnotatifyError;
use crate::library::SavedPlaylist;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Pretty,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Pretty
        }
    }
}

/// One line per track: `name - artists`, with the id dimmed.
pub fn format_track_line(index: usize, track: &Track, is_tty: bool) -> String {
    let id = track.id.as_deref().unwrap_or("-");
    let title = format!("{} - {}", track.name, track.artist_names());
    if is_tty {
        format!("{:>3}. {} {}", index + 1, title.bold(), id.dimmed())
    } else {
        format!("{:>3}. {} {}", index + 1, title, id)
    }
}

pub fn print_tracks(tracks: &[Track], mode: OutputMode, is_tty: bool) {
    match mode {
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(tracks).unwrap_or_default());
        }
        OutputMode::Pretty => {
            if tracks.is_empty() {
                println!("No tracks found.");
            }
            for (i, track) in tracks.iter().enumerate() {
                println!("{}", format_track_line(i, track, is_tty));
            }
        }
    }
}

/// Tracks of a playlist with their notes underneath.
pub fn print_annotated_tracks(
    tracks: &[(Track, Option<String>)],
    mode: OutputMode,
    is_tty: bool,
) {
    match mode {
        OutputMode::Json => {
            let items: Vec<serde_json::Value> = tracks
                .iter()
                .map(|(track, note)| {
                    serde_json::json!({
                        "id": track.id,
                        "name": track.name,
                        "artists": track.artist_names(),
                        "uri": track.uri,
                        "annotation": note,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&items).unwrap_or_default());
        }
        OutputMode::Pretty => {
            for (i, (track, note)) in tracks.iter().enumerate() {
                println!("{}", format_track_line(i, track, is_tty));
                if let Some(note) = note {
                    for line in note.lines() {
                        if is_tty {
                            println!("       {}", line.italic());
                        } else {
                            println!("       {line}");
                        }
                    }
                }
            }
        }
    }
}

pub fn print_playlists(playlists: &[SavedPlaylist], mode: OutputMode) {
    match mode {
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(playlists).unwrap_or_default());
        }
        OutputMode::Pretty => {
            if playlists.is_empty() {
                println!("No saved playlists. Use `annotatify import` or `annotatify create`.");
            }
            for p in playlists {
                match &p.description {
                    Some(d) => println!("{}  {} ({})", p.id, p.name, d),
                    None => println!("{}  {}", p.id, p.name),
                }
            }
        }
    }
}

pub fn print_error(err: &AnnotatifyError, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&err.to_json()).unwrap_or_default());
    } else {
        eprintln!("Error: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Artist;

    fn track() -> Track {
        Track {
            id: Some("abc".into()),
            name: "Song".into(),
            uri: "spotify:track:abc".into(),
            artists: vec![Artist { name: "A".into() }, Artist { name: "B".into() }],
            album: None,
        }
    }

    #[test]
    fn output_mode_from_flag() {
        assert_eq!(OutputMode::from_flag(true), OutputMode::Json);
        assert_eq!(OutputMode::from_flag(false), OutputMode::Pretty);
    }

    #[test]
    fn plain_track_line() {
        assert_eq!(format_track_line(0, &track(), false), "  1. Song - A, B abc");
    }

    #[test]
    fn printing_does_not_panic() {
        let tracks = vec![track()];
        print_tracks(&tracks, OutputMode::Json, false);
        print_tracks(&[], OutputMode::Pretty, false);
        print_annotated_tracks(
            &[(track(), Some("first line\nsecond".into()))],
            OutputMode::Pretty,
            false,
        );
        print_playlists(&[], OutputMode::Pretty);
    }
}
