//! Token lifecycle: authorization, code exchange, refresh and expiry.
//!
//! [`CredentialManager`] is the only owner of the credential keys in the
//! store. Collaborators ask it for a usable bearer token with
//! [`CredentialManager::get_valid_token`] and, when that reports
//! [`AnnotatifyError::ReauthorizationRequired`], send the user through
//! [`CredentialManager::begin_authorization`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::error::AnnotatifyError;
use crate::oauth::navigate::Navigator;
use crate::oauth::pkce::generate_pkce;
use crate::oauth::store::{Credential, TokenStore};
use crate::oauth::token::TokenClient;
use crate::storage::KeyValueStore;
use crate::url::encode_component;

#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
    /// Remaining lifetime below which a token is treated as expired.
    pub expiry_margin: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Unauthenticated,
    Valid,
    Expired,
}

pub struct CredentialManager {
    settings: OAuthSettings,
    store: TokenStore,
    tokens: TokenClient,
    clock: Arc<dyn Clock>,
    refresh_lock: Mutex<()>,
}

impl CredentialManager {
    pub fn new(
        settings: OAuthSettings,
        store: Arc<dyn KeyValueStore>,
        http: reqwest::Client,
    ) -> Self {
        let tokens = TokenClient::new(http, &settings.token_endpoint, &settings.client_id);
        Self {
            settings,
            store: TokenStore::new(store),
            tokens,
            clock: Arc::new(SystemClock),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &OAuthSettings {
        &self.settings
    }

    pub fn credential(&self) -> Result<Option<Credential>, AnnotatifyError> {
        self.store.load_credential()
    }

    pub fn state(&self) -> Result<CredentialState, AnnotatifyError> {
        Ok(match self.store.load_credential()? {
            None => CredentialState::Unauthenticated,
            Some(cred) if self.expired_at(cred.expires_at) => CredentialState::Expired,
            Some(_) => CredentialState::Valid,
        })
    }

    /// Expiry absent, or fewer than `expiry_margin` left on the clock.
    pub fn is_expired(&self) -> Result<bool, AnnotatifyError> {
        let expires_at = self.store.load_credential()?.and_then(|c| c.expires_at);
        Ok(self.expired_at(expires_at))
    }

    fn expired_at(&self, expires_at: Option<DateTime<Utc>>) -> bool {
        match expires_at {
            Some(at) => self
                .clock
                .now()
                .checked_add_signed(self.settings.expiry_margin)
                .is_none_or(|deadline| deadline >= at),
            None => true,
        }
    }

    /// A bearer token that is valid right now, refreshing it first if needed.
    ///
    /// Any failure to obtain one through refresh collapses into
    /// `ReauthorizationRequired`; storage failures are passed through.
    pub async fn get_valid_token(&self) -> Result<String, AnnotatifyError> {
        if let Some(token) = self.current_valid_token()? {
            return Ok(token);
        }
        if self.state()? == CredentialState::Unauthenticated {
            return Err(AnnotatifyError::ReauthorizationRequired(
                "no credential stored".into(),
            ));
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited.
        if let Some(token) = self.current_valid_token()? {
            return Ok(token);
        }

        tracing::debug!("Access token expired, attempting refresh");
        match self.refresh_locked().await {
            Ok(()) => self.current_valid_token()?.ok_or_else(|| {
                AnnotatifyError::ReauthorizationRequired(
                    "refreshed token is already expired".into(),
                )
            }),
            Err(e @ (AnnotatifyError::StorageError(_) | AnnotatifyError::IoError(_))) => Err(e),
            Err(e) => {
                tracing::warn!("Token refresh failed: {e}");
                Err(AnnotatifyError::ReauthorizationRequired(e.to_string()))
            }
        }
    }

    fn current_valid_token(&self) -> Result<Option<String>, AnnotatifyError> {
        Ok(self
            .store
            .load_credential()?
            .filter(|c| !self.expired_at(c.expires_at))
            .map(|c| c.access_token))
    }

    /// Full authorization URL for the given PKCE challenge.
    pub fn authorization_url(&self, code_challenge: &str) -> String {
        let s = &self.settings;
        format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&code_challenge={}&code_challenge_method=S256",
            s.authorize_endpoint,
            encode_component(&s.client_id),
            encode_component(&s.redirect_uri),
            encode_component(&s.scopes.join(" ")),
            code_challenge,
        )
    }

    /// Start an interactive authorization: persist a fresh verifier and hand
    /// the authorization URL to the navigator. Nothing comes back from the
    /// provider through this call; the result arrives on the redirect URI.
    ///
    /// A verifier left over from an earlier, unfinished attempt is replaced.
    pub fn begin_authorization(&self, navigator: &dyn Navigator) -> Result<(), AnnotatifyError> {
        let pkce = generate_pkce()?;
        if self.store.has_pending_verifier()? {
            tracing::debug!("Replacing verifier of an unfinished authorization");
        }
        self.store.put_verifier(&pkce.code_verifier)?;
        let url = self.authorization_url(&pkce.code_challenge);
        tracing::debug!("Navigating to authorization endpoint");
        navigator.navigate(&url)
    }

    /// Exchange an authorization code for a credential. The pending verifier
    /// is consumed whether or not the exchange succeeds.
    pub async fn complete_authorization(&self, code: &str) -> Result<(), AnnotatifyError> {
        let verifier = self
            .store
            .take_verifier()?
            .ok_or(AnnotatifyError::NoPendingAuthorization)?;

        let resp = self
            .tokens
            .exchange_code(code, &verifier, &self.settings.redirect_uri)
            .await
            .inspect_err(|e| tracing::error!("Failed to exchange code for token: {e}"))?;

        let expires_at = resp
            .expires_at(self.clock.now())
            .inspect_err(|e| tracing::error!("Rejected token response: {e}"))?;
        self.store
            .save_credential(&resp.access_token, resp.refresh_token.as_deref(), expires_at)?;
        tracing::info!(
            scope = resp.scope.as_deref().unwrap_or(""),
            "Authorization complete; token valid until {expires_at}"
        );
        Ok(())
    }

    /// Renew the access token with the stored refresh token.
    pub async fn refresh(&self) -> Result<(), AnnotatifyError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Result<(), AnnotatifyError> {
        let refresh_token = self
            .store
            .refresh_token()?
            .ok_or(AnnotatifyError::NoRefreshToken)?;

        let resp = self.tokens.refresh(&refresh_token).await?;
        let expires_at = resp.expires_at(self.clock.now())?;
        self.store.update_after_refresh(
            &resp.access_token,
            resp.refresh_token.as_deref(),
            expires_at,
        )?;
        tracing::debug!(
            rotated = resp.refresh_token.is_some(),
            "Token refreshed; valid until {expires_at}"
        );
        Ok(())
    }

    /// Forget the credential and any pending authorization.
    pub fn sign_out(&self) -> Result<(), AnnotatifyError> {
        self.store.clear_credential()?;
        self.store.clear_verifier()
    }
}
