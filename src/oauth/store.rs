use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::AnnotatifyError;
use crate::storage::KeyValueStore;

pub const CODE_VERIFIER_KEY: &str = "code_verifier";
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const EXPIRY_KEY: &str = "token_expiry_time";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Typed view over the credential keys of a [`KeyValueStore`].
///
/// Nothing else in the crate reads or writes these keys.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// The stored credential, or `None` when no access token is on record.
    pub fn load_credential(&self) -> Result<Option<Credential>, AnnotatifyError> {
        let Some(access_token) = self.inner.get(ACCESS_TOKEN_KEY)? else {
            return Ok(None);
        };
        let refresh_token = self.refresh_token()?;
        let expires_at = self
            .inner
            .get(EXPIRY_KEY)?
            .as_deref()
            .and_then(parse_expiry);
        Ok(Some(Credential {
            access_token,
            refresh_token,
            expires_at,
        }))
    }

    pub fn refresh_token(&self) -> Result<Option<String>, AnnotatifyError> {
        Ok(self
            .inner
            .get(REFRESH_TOKEN_KEY)?
            .filter(|t| !t.is_empty()))
    }

    /// Write a complete credential from an authorization-code grant.
    pub fn save_credential(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AnnotatifyError> {
        self.write_access(access_token, expires_at)?;
        match refresh_token {
            Some(rt) => self.inner.set(REFRESH_TOKEN_KEY, rt),
            None => self.inner.clear(REFRESH_TOKEN_KEY),
        }
    }

    /// Write the result of a refresh grant. The refresh token is only replaced
    /// when the provider rotated it.
    pub fn update_after_refresh(
        &self,
        access_token: &str,
        rotated_refresh_token: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AnnotatifyError> {
        self.write_access(access_token, expires_at)?;
        if let Some(rt) = rotated_refresh_token {
            self.inner.set(REFRESH_TOKEN_KEY, rt)?;
        }
        Ok(())
    }

    pub fn clear_credential(&self) -> Result<(), AnnotatifyError> {
        self.inner.clear(ACCESS_TOKEN_KEY)?;
        self.inner.clear(EXPIRY_KEY)?;
        self.inner.clear(REFRESH_TOKEN_KEY)
    }

    pub fn put_verifier(&self, verifier: &str) -> Result<(), AnnotatifyError> {
        self.inner.set(CODE_VERIFIER_KEY, verifier)
    }

    /// Read the pending verifier and remove it, so a code exchange can only be
    /// attempted once per authorization.
    pub fn take_verifier(&self) -> Result<Option<String>, AnnotatifyError> {
        let verifier = self.inner.get(CODE_VERIFIER_KEY)?;
        if verifier.is_some() {
            self.inner.clear(CODE_VERIFIER_KEY)?;
        }
        Ok(verifier.filter(|v| !v.is_empty()))
    }

    pub fn has_pending_verifier(&self) -> Result<bool, AnnotatifyError> {
        Ok(self.inner.get(CODE_VERIFIER_KEY)?.is_some())
    }

    pub fn clear_verifier(&self) -> Result<(), AnnotatifyError> {
        self.inner.clear(CODE_VERIFIER_KEY)
    }

    // Expiry goes first: a reader that sees the new token must not pair it
    // with the previous expiry.
    fn write_access(
        &self,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AnnotatifyError> {
        self.inner
            .set(EXPIRY_KEY, &expires_at.timestamp_millis().to_string())?;
        self.inner.set(ACCESS_TOKEN_KEY, access_token)
    }
}

fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let millis = raw.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp_millis(millis)
}
