use std::path::Path;
use std::sync::{Arc, Mutex};

use annotatify::clock::ManualClock;
use annotatify::oauth::{CredentialManager, Navigator, OAuthSettings, TokenStore};
use annotatify::{AnnotatifyError, MemoryStore};
use chrono::{DateTime, Duration, Utc};
use wiremock::MockServer;

#[allow(dead_code)]
pub const REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";

#[allow(dead_code)]
pub fn start_time() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
}

/// OAuth settings whose token endpoint is the mock server.
#[allow(dead_code)]
pub fn settings(server: &MockServer) -> OAuthSettings {
    OAuthSettings {
        client_id: "test-client".into(),
        redirect_uri: REDIRECT_URI.into(),
        scopes: vec!["playlist-read-private".into()],
        authorize_endpoint: format!("{}/authorize", server.uri()),
        token_endpoint: format!("{}/api/token", server.uri()),
        expiry_margin: Duration::seconds(60),
    }
}

#[allow(dead_code)]
pub struct Harness {
    pub kv: Arc<MemoryStore>,
    pub tokens: TokenStore,
    pub clock: Arc<ManualClock>,
    pub manager: Arc<CredentialManager>,
}

#[allow(dead_code)]
pub fn harness(server: &MockServer) -> Harness {
    let kv = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start_time()));
    let manager = CredentialManager::new(settings(server), kv.clone(), reqwest::Client::new())
        .with_clock(clock.clone());
    Harness {
        tokens: TokenStore::new(kv.clone()),
        kv,
        clock,
        manager: Arc::new(manager),
    }
}

/// Navigator that records URLs instead of opening them.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingNavigator {
    pub urls: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) -> Result<(), AnnotatifyError> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Write a config file pointing at `api_base` and a store inside `dir`.
#[allow(dead_code)]
pub fn write_config(dir: &Path, api_base: &str) -> std::path::PathBuf {
    let config_path = dir.join("config.json");
    let storage = dir.join("storage.json");
    let json = serde_json::json!({
        "clientId": "test-client",
        "apiBaseUrl": api_base,
        "tokenEndpoint": format!("{api_base}/api/token"),
        "storagePath": storage,
        "httpTimeoutSecs": 5,
    });
    std::fs::write(&config_path, serde_json::to_string_pretty(&json).unwrap()).unwrap();
    config_path
}
