use std::time::Duration;

use clap::{Parser, Subcommand};

use annotatify::cli::auth::DEFAULT_LOGIN_TIMEOUT_MS;
use annotatify::cli::output::{print_error, OutputMode};
use annotatify::cli::playlist::DEFAULT_SEARCH_LIMIT;

#[derive(Parser)]
#[command(name = "annotatify", version, about = "Build or import Spotify playlists and annotate their tracks")]
struct Cli {
    /// Path to a config file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize this client with your Spotify account
    Login {
        /// How long to wait for the browser redirect, in milliseconds
        #[arg(long, env = "ANNOTATIFY_LOGIN_TIMEOUT_MS", default_value_t = DEFAULT_LOGIN_TIMEOUT_MS)]
        timeout_ms: u64,

        /// Print the authorization URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Show whether a usable token is on record
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Forget stored tokens
    Logout,

    /// Search for tracks
    Search {
        query: String,

        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,

        #[arg(long)]
        json: bool,
    },

    /// Create a playlist from track URIs
    Create {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Create the playlist as private
        #[arg(long)]
        private: bool,

        /// Track URIs (spotify:track:<id>)
        uris: Vec<String>,
    },

    /// Import an existing playlist by URL or id
    Import { playlist: String },

    /// List locally saved playlists
    Playlists {
        #[arg(long)]
        json: bool,
    },

    /// Show a playlist's tracks with their annotations
    Show {
        /// Saved playlist name, id, or URL
        playlist: String,

        #[arg(long)]
        json: bool,
    },

    /// Read, write, or clear the annotation on a track
    Annotate {
        /// Track id, URI, or URL
        track: String,

        /// New annotation text (omit to print the current one)
        text: Option<String>,

        #[arg(long, conflicts_with = "text")]
        clear: bool,
    },
}

impl Commands {
    fn json(&self) -> bool {
        match self {
            Commands::Status { json }
            | Commands::Search { json, .. }
            | Commands::Playlists { json }
            | Commands::Show { json, .. } => *json,
            _ => false,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("ANNOTATIFY_LOG_LEVEL")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.command.json();

    if let Err(e) = run(cli).await {
        print_error(&e, json);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), annotatify::AnnotatifyError> {
    use annotatify::cli::{annotate, auth, playlist};

    let app = annotatify::App::from_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Login {
            timeout_ms,
            no_browser,
        } => auth::run_login_cmd(&app, Duration::from_millis(timeout_ms), no_browser).await,
        Commands::Status { json } => auth::run_status(&app, OutputMode::from_flag(json)).await,
        Commands::Logout => auth::run_logout(&app),
        Commands::Search { query, limit, json } => {
            playlist::run_search(&app, &query, limit, OutputMode::from_flag(json)).await
        }
        Commands::Create {
            name,
            description,
            private,
            uris,
        } => playlist::run_create(&app, &name, &description, !private, &uris).await,
        Commands::Import { playlist: input } => playlist::run_import(&app, &input).await,
        Commands::Playlists { json } => playlist::run_playlists(&app, OutputMode::from_flag(json)),
        Commands::Show { playlist: needle, json } => {
            playlist::run_show(&app, &needle, OutputMode::from_flag(json)).await
        }
        Commands::Annotate { track, text, clear } => {
            annotate::run_annotate(&app, &track, text.as_deref(), clear)
        }
    }
}
