use std::time::Duration;

use reqwest::Url;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::error::AnnotatifyError;
use crate::url::strip_query;

const DONE_PAGE: &str = "<!DOCTYPE html><html><body><h1>Authorization received</h1>\
                         <p>You can close this window and return to the terminal.</p></body></html>";

/// Where the loopback listener binds and which path it answers on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackAddress {
    pub bind: String,
    pub origin: String,
    pub path: String,
}

impl CallbackAddress {
    pub fn from_redirect_uri(redirect_uri: &str) -> Result<Self, AnnotatifyError> {
        let url = Url::parse(redirect_uri).map_err(|e| {
            AnnotatifyError::InvalidInput(format!("Invalid redirect URI '{redirect_uri}': {e}"))
        })?;
        if url.scheme() != "http" {
            return Err(AnnotatifyError::InvalidInput(format!(
                "Redirect URI '{redirect_uri}' must be a plain http loopback address"
            )));
        }
        let host = url.host_str().ok_or_else(|| {
            AnnotatifyError::InvalidInput(format!("Redirect URI '{redirect_uri}' has no host"))
        })?;
        let port = url.port_or_known_default().unwrap_or(80);
        Ok(Self {
            bind: format!("{host}:{port}"),
            origin: format!("http://{host}:{port}"),
            path: url.path().to_string(),
        })
    }
}

/// How long a single connection may take to send its request line.
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// A loopback listener bound to the redirect URI's host and port.
///
/// Bind before sending the user to the provider: a consent screen that was
/// already granted may redirect back immediately.
pub struct CallbackListener {
    listener: TcpListener,
    addr: CallbackAddress,
}

impl CallbackListener {
    pub async fn bind(redirect_uri: &str) -> Result<Self, AnnotatifyError> {
        let addr = CallbackAddress::from_redirect_uri(redirect_uri)?;
        let listener = TcpListener::bind(&addr.bind).await?;
        tracing::debug!("Listening for authorization callback on {}", addr.bind);
        Ok(Self { listener, addr })
    }

    /// Wait for the provider to redirect the browser back and return the full
    /// URL it was called with. Each connection is served on its own task, so
    /// an idle or broken one cannot hold up the real callback. Requests to
    /// other paths (favicon and the like) get a 404 and are ignored.
    pub async fn accept(self, timeout: Duration) -> Result<String, AnnotatifyError> {
        let Self { listener, addr } = self;
        let (found_tx, mut found_rx) = mpsc::channel::<String>(1);

        let accept_loop = async {
            loop {
                tokio::select! {
                    accepted = listener.accept() => {
                        let (stream, peer) = match accepted {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::warn!("Failed to accept callback connection: {e}");
                                continue;
                            }
                        };
                        let found_tx = found_tx.clone();
                        let path = addr.path.clone();
                        let origin = addr.origin.clone();
                        tokio::spawn(async move {
                            match serve_connection(stream, &path).await {
                                Ok(Some(target)) => {
                                    let _ = found_tx.send(format!("{origin}{target}")).await;
                                }
                                Ok(None) => {}
                                Err(e) => tracing::debug!("Callback connection from {peer} dropped: {e}"),
                            }
                        });
                    }
                    Some(url) = found_rx.recv() => return url,
                }
            }
        };

        tokio::time::timeout(timeout, accept_loop)
            .await
            .map_err(|_| AnnotatifyError::Timeout {
                action: "waiting for the authorization callback".into(),
                duration: timeout,
            })
    }
}

/// Bind to `redirect_uri` and wait for the callback. See
/// [`CallbackListener`] when navigation has to happen in between.
pub async fn listen_for_callback(
    redirect_uri: &str,
    timeout: Duration,
) -> Result<String, AnnotatifyError> {
    CallbackListener::bind(redirect_uri).await?.accept(timeout).await
}

/// Answer one connection. Returns the request target when it hit the
/// callback path.
async fn serve_connection(
    mut stream: TcpStream,
    callback_path: &str,
) -> Result<Option<String>, AnnotatifyError> {
    let target = tokio::time::timeout(REQUEST_READ_TIMEOUT, read_request_target(&mut stream))
        .await
        .map_err(|_| AnnotatifyError::Timeout {
            action: "reading a callback request".into(),
            duration: REQUEST_READ_TIMEOUT,
        })??;

    let Some(target) = target else {
        respond(&mut stream, "400 Bad Request", "").await?;
        return Ok(None);
    };
    if strip_query(&target) != callback_path {
        respond(&mut stream, "404 Not Found", "").await?;
        return Ok(None);
    }
    // The code is in hand even if the browser has gone away.
    if let Err(e) = respond(&mut stream, "200 OK", DONE_PAGE).await {
        tracing::debug!("Could not answer the callback request: {e}");
    }
    Ok(Some(target))
}

async fn read_request_target(stream: &mut TcpStream) -> Result<Option<String>, AnnotatifyError> {
    let mut buf = vec![0u8; 8192];
    let n = stream.read(&mut buf).await?;
    let request = String::from_utf8_lossy(&buf[..n]);
    Ok(parse_request_target(&request).map(str::to_string))
}

async fn respond(stream: &mut TcpStream, status: &str, body: &str) -> Result<(), AnnotatifyError> {
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len(),
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Extract the target from "GET /callback?code=... HTTP/1.1".
fn parse_request_target(request: &str) -> Option<&str> {
    let first_line = request.lines().next()?;
    let mut parts = first_line.split_whitespace();
    let method = parts.next()?;
    if method != "GET" {
        return None;
    }
    let target = parts.next()?;
    target.starts_with('/').then_some(target)
}
