use crate::error::AnnotatifyError;
use crate::oauth::manager::CredentialManager;
use crate::url::{query_param, strip_query};

/// The location the provider redirected back to.
pub trait Location {
    fn href(&self) -> &str;
    /// Swap the visible location in place, without a history entry.
    fn replace(&mut self, url: &str);
}

/// Outcome handed back to the caller after a redirect has been processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Available(String),
    AuthorizationRequired,
}

impl TokenStatus {
    pub fn token(&self) -> Option<&str> {
        match self {
            TokenStatus::Available(token) => Some(token),
            TokenStatus::AuthorizationRequired => None,
        }
    }
}

/// Location received by the loopback listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackLocation {
    href: String,
}

impl CallbackLocation {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

impl Location for CallbackLocation {
    fn href(&self) -> &str {
        &self.href
    }

    fn replace(&mut self, url: &str) {
        self.href = url.to_string();
    }
}

/// Process an authorization redirect.
///
/// When the location carries a `code`, it is exchanged and the query string
/// is stripped so the code cannot be submitted twice. An exchange failure is
/// logged, not returned: either way the caller gets the token status.
pub async fn handle_redirect<L: Location + ?Sized>(
    manager: &CredentialManager,
    location: &mut L,
) -> Result<TokenStatus, AnnotatifyError> {
    let code = query_param(location.href(), "code").filter(|c| !c.is_empty());

    if let Some(code) = code {
        tracing::debug!("Authorization code received");
        if let Err(e) = manager.complete_authorization(&code).await {
            tracing::error!("Authorization code exchange failed: {e}");
        }
        let clean = strip_query(location.href()).to_string();
        location.replace(&clean);
    } else if let Some(error) = query_param(location.href(), "error") {
        tracing::warn!("Provider returned an authorization error: {error}");
    }

    match manager.get_valid_token().await {
        Ok(token) => Ok(TokenStatus::Available(token)),
        Err(AnnotatifyError::ReauthorizationRequired(reason)) => {
            tracing::info!("No valid token found: {reason}");
            Ok(TokenStatus::AuthorizationRequired)
        }
        Err(e) => Err(e),
    }
}
