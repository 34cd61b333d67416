pub mod api;
pub mod app;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod library;
pub mod oauth;
pub mod storage;
pub mod url;

pub use app::App;
pub use config::{load_config, AppConfig};
pub use error::AnnotatifyError;
pub use library::{Library, SavedPlaylist};
pub use oauth::{CredentialManager, TokenStatus};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
