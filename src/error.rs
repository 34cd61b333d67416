use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AnnotatifyError {
    #[error("Secure random source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("Token exchange failed with status {status}: {body}")]
    TokenExchangeFailed { status: u16, body: String },

    #[error("No refresh token on record")]
    NoRefreshToken,

    #[error("Token refresh failed with status {status}: {body}")]
    RefreshFailed { status: u16, body: String },

    #[error("Not authorized ({0}). Run: annotatify login")]
    ReauthorizationRequired(String),

    #[error("No pending authorization: start one with `annotatify login`")]
    NoPendingAuthorization,

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Playlist '{0}' not found")]
    PlaylistNotFound(String),

    #[error("Playlist '{0}' is private")]
    PlaylistPrivate(String),

    #[error("Invalid playlist URL or id: '{0}'")]
    InvalidPlaylistId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Error in config {}: {detail}", path.display())]
    ConfigError { path: PathBuf, detail: String },

    #[error("Timed out after {}s {action}", .duration.as_secs())]
    Timeout { action: String, duration: Duration },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AnnotatifyError {
    /// Error code string for structured JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            AnnotatifyError::EntropyUnavailable(_) => "entropy_unavailable",
            AnnotatifyError::TokenExchangeFailed { .. } => "token_exchange_failed",
            AnnotatifyError::NoRefreshToken => "no_refresh_token",
            AnnotatifyError::RefreshFailed { .. } => "refresh_failed",
            AnnotatifyError::ReauthorizationRequired(_) => "reauthorization_required",
            AnnotatifyError::NoPendingAuthorization => "no_pending_authorization",
            AnnotatifyError::InvalidTokenResponse(_) => "invalid_token_response",
            AnnotatifyError::Http(_) => "http_error",
            AnnotatifyError::ApiError { .. } => "api_error",
            AnnotatifyError::PlaylistNotFound(_) => "not_found",
            AnnotatifyError::PlaylistPrivate(_) => "forbidden",
            AnnotatifyError::InvalidPlaylistId(_) => "invalid_playlist_id",
            AnnotatifyError::InvalidInput(_) => "invalid_input",
            AnnotatifyError::StorageError(_) => "storage_error",
            AnnotatifyError::ConfigError { .. } => "config_error",
            AnnotatifyError::Timeout { .. } => "timeout",
            AnnotatifyError::IoError(_) => "io_error",
        }
    }

    /// HTTP status reported by the provider, if the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AnnotatifyError::TokenExchangeFailed { status, .. }
            | AnnotatifyError::RefreshFailed { status, .. }
            | AnnotatifyError::ApiError { status, .. } => Some(*status),
            AnnotatifyError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the only way forward is an interactive `annotatify login`.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            AnnotatifyError::ReauthorizationRequired(_)
                | AnnotatifyError::NoRefreshToken
                | AnnotatifyError::RefreshFailed { .. }
                | AnnotatifyError::NoPendingAuthorization
        )
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        if let Some(status) = self.status() {
            obj.insert("status".into(), serde_json::Value::from(status));
        }
        obj.insert("message".into(), serde_json::Value::String(self.to_string()));
        obj.insert("code".into(), serde_json::Value::String(self.code().to_string()));
        serde_json::json!({ "error": obj })
    }
}
