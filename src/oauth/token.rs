use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::error::AnnotatifyError;

/// Raw token response from the token endpoint (both grants).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    /// Space-separated scopes actually granted.
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Absolute expiry of the issued token. A lifetime that does not fit on
    /// the calendar is rejected rather than wrapped.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, AnnotatifyError> {
        Duration::try_seconds(self.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AnnotatifyError::InvalidTokenResponse(format!(
                    "expires_in out of range: {}",
                    self.expires_in
                ))
            })
    }
}

/// Form-encoded grants against the provider's token endpoint.
#[derive(Clone)]
pub struct TokenClient {
    http: reqwest::Client,
    token_endpoint: String,
    client_id: String,
}

impl TokenClient {
    pub fn new(http: reqwest::Client, token_endpoint: &str, client_id: &str) -> Self {
        Self {
            http,
            token_endpoint: token_endpoint.to_string(),
            client_id: client_id.to_string(),
        }
    }

    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, AnnotatifyError> {
        let resp = self
            .http
            .post(&self.token_endpoint)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", self.client_id.as_str()),
                ("code_verifier", code_verifier),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AnnotatifyError::TokenExchangeFailed { status, body });
        }

        parse_token_response(resp).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AnnotatifyError> {
        let resp = self
            .http
            .post(&self.token_endpoint)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.client_id.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AnnotatifyError::RefreshFailed { status, body });
        }

        parse_token_response(resp).await
    }
}

async fn parse_token_response(resp: reqwest::Response) -> Result<TokenResponse, AnnotatifyError> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| AnnotatifyError::InvalidTokenResponse(e.to_string()))
}
