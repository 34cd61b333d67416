use std::sync::Arc;

use crate::api::SpotifyClient;
use crate::config::{load_config, AppConfig};
use crate::error::AnnotatifyError;
use crate::library::Library;
use crate::oauth::CredentialManager;
use crate::storage::{FileStore, KeyValueStore};

/// Everything a command needs, wired from one configuration and one store.
pub struct App {
    config: AppConfig,
    credentials: Arc<CredentialManager>,
    api: SpotifyClient,
    library: Library,
}

impl App {
    /// Load configuration and open the on-disk store.
    pub fn from_config(cli_config: Option<&str>) -> Result<Self, AnnotatifyError> {
        let config = load_config(cli_config)?;
        let store = FileStore::open(config.resolved_storage_path())?;
        tracing::debug!("Using store at {}", store.path().display());
        Self::with_store(config, Arc::new(store))
    }

    pub fn with_store(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AnnotatifyError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;
        let credentials = Arc::new(CredentialManager::new(
            config.oauth_settings(),
            store.clone(),
            http.clone(),
        ));
        let api = SpotifyClient::new(http, &config.api_base_url, credentials.clone());
        let library = Library::new(store);
        Ok(Self {
            config,
            credentials,
            api,
            library,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    pub fn api(&self) -> &SpotifyClient {
        &self.api
    }

    pub fn library(&self) -> &Library {
        &self.library
    }
}
