use std::time::Duration;

use crate::app::App;
use crate::error::AnnotatifyError;
use crate::oauth::{run_login, BrowserNavigator, CredentialState, Navigator, PrintNavigator, TokenStatus};

use super::output::OutputMode;

/// Default time to wait for the browser to come back.
pub const DEFAULT_LOGIN_TIMEOUT_MS: u64 = 120_000;

pub async fn run_login_cmd(app: &App, timeout: Duration, no_browser: bool) -> Result<(), AnnotatifyError> {
    let navigator: &dyn Navigator = if no_browser {
        &PrintNavigator
    } else {
        &BrowserNavigator
    };

    match run_login(app.credentials(), navigator, timeout).await? {
        TokenStatus::Available(_) => {
            let expires = app
                .credentials()
                .credential()?
                .and_then(|c| c.expires_at)
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| "unknown".into());
            println!("Logged in. Token expires: {expires}");
            Ok(())
        }
        TokenStatus::AuthorizationRequired => Err(AnnotatifyError::ReauthorizationRequired(
            "authorization did not complete".into(),
        )),
    }
}

pub async fn run_status(app: &App, mode: OutputMode) -> Result<(), AnnotatifyError> {
    let creds = app.credentials();
    let state = creds.state()?;
    let credential = creds.credential()?;
    let expires_at = credential.as_ref().and_then(|c| c.expires_at);
    let has_refresh = credential.as_ref().is_some_and(|c| c.refresh_token.is_some());

    let label = match state {
        CredentialState::Unauthenticated => "not authorized",
        CredentialState::Valid => "authorized",
        CredentialState::Expired => "expired",
    };

    match mode {
        OutputMode::Json => {
            let json = serde_json::json!({
                "state": label,
                "expiresAt": expires_at.map(|t| t.to_rfc3339()),
                "refreshable": has_refresh,
            });
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputMode::Pretty => match (state, expires_at) {
            (CredentialState::Unauthenticated, _) => {
                println!("Not authorized. Run: annotatify login");
            }
            (_, Some(at)) => println!("Status: {label} (token expires {})", at.to_rfc3339()),
            (_, None) => println!("Status: {label}"),
        },
    }
    if state == CredentialState::Expired && !has_refresh {
        tracing::warn!("Token expired and no refresh token on record; run `annotatify login`");
    }
    Ok(())
}

pub fn run_logout(app: &App) -> Result<(), AnnotatifyError> {
    app.credentials().sign_out()?;
    println!("Logged out.");
    Ok(())
}
