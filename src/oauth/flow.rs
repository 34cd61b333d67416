use std::time::Duration;

use crate::error::AnnotatifyError;
use crate::oauth::callback::CallbackListener;
use crate::oauth::manager::CredentialManager;
use crate::oauth::navigate::Navigator;
use crate::oauth::redirect::{handle_redirect, CallbackLocation, TokenStatus};

/// Run the interactive login: browser authorization, loopback redirect,
/// code exchange.
pub async fn run_login(
    manager: &CredentialManager,
    navigator: &dyn Navigator,
    timeout: Duration,
) -> Result<TokenStatus, AnnotatifyError> {
    // 1. Be ready for the redirect before the browser can produce one
    let listener = CallbackListener::bind(&manager.settings().redirect_uri).await?;

    // 2. Persist a verifier and send the user to the provider
    manager.begin_authorization(navigator)?;

    // 3. Wait for the provider to redirect back
    let href = listener.accept(timeout).await?;

    // 4. Exchange the code and settle on a token status
    let mut location = CallbackLocation::new(href);
    handle_redirect(manager, &mut location).await
}

