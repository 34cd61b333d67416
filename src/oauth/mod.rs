pub mod callback;
pub mod flow;
pub mod manager;
pub mod navigate;
pub mod pkce;
pub mod redirect;
pub mod store;
pub mod token;

pub use callback::{listen_for_callback, CallbackListener};
pub use flow::run_login;
pub use manager::{CredentialManager, CredentialState, OAuthSettings};
pub use navigate::{BrowserNavigator, Navigator, PrintNavigator};
pub use pkce::{derive_challenge, generate_pkce, generate_verifier, PkceChallenge};
pub use redirect::{handle_redirect, CallbackLocation, Location, TokenStatus};
pub use store::{Credential, TokenStore};
pub use token::{TokenClient, TokenResponse};
