use crate::error::AnnotatifyError;

/// Where `begin_authorization` sends the user.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str) -> Result<(), AnnotatifyError>;
}

/// Opens the URL in the system browser, falling back to printing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &str) -> Result<(), AnnotatifyError> {
        if webbrowser::open(url).is_err() {
            tracing::warn!("Could not open browser automatically");
            eprintln!("Open this URL in your browser to continue:\n{url}");
        }
        Ok(())
    }
}

/// Prints the URL without trying to launch anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn navigate(&self, url: &str) -> Result<(), AnnotatifyError> {
        eprintln!("Open this URL in your browser to continue:\n{url}");
        Ok(())
    }
}
