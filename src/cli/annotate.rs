use crate::app::App;
use crate::error::AnnotatifyError;

/// Accept `spotify:track:<id>`, an open.spotify.com track URL, or a bare id.
pub fn normalize_track_id(input: &str) -> String {
    let input = input.trim();
    if let Some(id) = input.strip_prefix("spotify:track:") {
        return id.to_string();
    }
    if let Some((_, rest)) = input.split_once("spotify.com/track/") {
        return rest.split(['?', '/', '#']).next().unwrap_or(rest).to_string();
    }
    input.to_string()
}

pub fn run_annotate(
    app: &App,
    track: &str,
    text: Option<&str>,
    clear: bool,
) -> Result<(), AnnotatifyError> {
    let track_id = normalize_track_id(track);
    let library = app.library();

    if clear {
        library.clear_annotation(&track_id)?;
        println!("Annotation cleared for {track_id}.");
        return Ok(());
    }

    match text {
        Some(text) => {
            library.set_annotation(&track_id, text)?;
            println!("Annotation saved for {track_id}.");
        }
        None => match library.annotation(&track_id)? {
            Some(note) => println!("{note}"),
            None => println!("No annotation for {track_id}."),
        },
    }
    Ok(())
}
