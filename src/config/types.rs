use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::oauth::OAuthSettings;
use crate::storage::default_storage_path;

pub const DEFAULT_CLIENT_ID: &str = "f2aaaf55912942a185df5d4d7f42e78a";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_AUTHORIZE_ENDPOINT: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com";
pub const DEFAULT_SCOPES: [&str; 4] = [
    "playlist-modify-public",
    "playlist-modify-private",
    "playlist-read-private",
    "playlist-read-collaborative",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
    pub api_base_url: String,
    pub storage_path: Option<PathBuf>,
    pub http_timeout_secs: u64,
    /// Tokens with less than this many seconds left count as expired.
    pub expiry_margin_secs: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            authorize_endpoint: DEFAULT_AUTHORIZE_ENDPOINT.to_string(),
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_path: None,
            http_timeout_secs: 30,
            expiry_margin_secs: 60,
        }
    }
}

impl AppConfig {
    pub fn oauth_settings(&self) -> OAuthSettings {
        OAuthSettings {
            client_id: self.client_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scopes: self.scopes.clone(),
            authorize_endpoint: self.authorize_endpoint.clone(),
            token_endpoint: self.token_endpoint.clone(),
            expiry_margin: chrono::Duration::try_seconds(self.expiry_margin_secs.max(0))
                .unwrap_or(chrono::Duration::MAX),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    pub fn resolved_storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(default_storage_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_registration() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(cfg.scopes.len(), 4);
        assert!(cfg.scopes.contains(&"playlist-read-collaborative".to_string()));
        assert_eq!(cfg.http_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.expiry_margin_secs, 60);
    }

    #[test]
    fn deserialize_partial_config_fills_defaults() {
        let json = r#"{
            "clientId": "abc",
            "redirectUri": "http://localhost:9999/cb",
            "expiryMarginSecs": 0
        }"#;
        let cfg: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.client_id, "abc");
        assert_eq!(cfg.redirect_uri, "http://localhost:9999/cb");
        assert_eq!(cfg.token_endpoint, DEFAULT_TOKEN_ENDPOINT);
        assert_eq!(cfg.oauth_settings().expiry_margin, chrono::Duration::zero());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{"clientId": "abc", "theme": "dark"}"#;
        let cfg: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.client_id, "abc");
    }

    #[test]
    fn negative_margin_is_clamped() {
        let cfg = AppConfig {
            expiry_margin_secs: -5,
            ..AppConfig::default()
        };
        assert_eq!(cfg.oauth_settings().expiry_margin, chrono::Duration::zero());
    }

    #[test]
    fn huge_margin_saturates() {
        let cfg = AppConfig {
            expiry_margin_secs: i64::MAX,
            ..AppConfig::default()
        };
        assert_eq!(cfg.oauth_settings().expiry_margin, chrono::Duration::MAX);
    }

    #[test]
    fn explicit_storage_path_wins() {
        let cfg = AppConfig {
            storage_path: Some(PathBuf::from("/tmp/annotatify.json")),
            ..AppConfig::default()
        };
        assert_eq!(
            cfg.resolved_storage_path(),
            PathBuf::from("/tmp/annotatify.json")
        );
        assert!(AppConfig::default()
            .resolved_storage_path()
            .ends_with("storage.json"));
    }
}
