use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest as _;
use tokio_tungstenite::tungstenite::http::HeaderMap;

use crate::Result;
use crate::config::Config;
use crate::supervisor::Supervisor;
use crate::types::{Command, Status};

// User-facing stream capacities, sized to decouple producers from consumers
// without unbounded buffering.
const INBOUND_CAPACITY: usize = 8;
const OUTBOUND_CAPACITY: usize = 8;
const STATUS_CAPACITY: usize = 2;
const COMMAND_CAPACITY: usize = 2;

/// A persistent logical wire to a WebSocket URL.
///
/// The endpoint dials immediately upon construction and keeps reconnecting
/// after transient failures until [`Command::Quit`] is sent (or the command
/// sender is dropped). Lifecycle transitions arrive on `status`; payloads
/// flow through `inbound` and `outbound` as raw bytes.
///
/// The `inbound` and `status` streams are closed exactly once, after every
/// internal task has stopped. The `outbound` and `command` streams are owned
/// by the user and are never closed while the endpoint runs.
///
/// # Example
///
/// ```no_run
/// use ws_endpoint::{Endpoint, HeaderMap};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut endpoint = Endpoint::new("wss://echo.websocket.org", HeaderMap::new())?;
///
/// endpoint.outbound.send(b"hello".to_vec()).await?;
/// while let Some(status) = endpoint.status.recv().await {
///     println!("{}", status.state);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Endpoint {
    url: String,
    headers: HeaderMap,
    /// Payloads received from the peer
    pub inbound: mpsc::Receiver<Vec<u8>>,
    /// Payloads to deliver when a connection exists
    pub outbound: mpsc::Sender<Vec<u8>>,
    /// Lifecycle transitions
    pub status: mpsc::Receiver<Status>,
    /// Out-of-band requests
    pub command: mpsc::Sender<Command>,
}

impl Endpoint {
    /// Create an endpoint with default timing and start dialing.
    ///
    /// The URL is validated here; a malformed URL is a construction error,
    /// while a well-formed but unreachable one surfaces as `Disconnected`
    /// statuses once dialing begins.
    ///
    /// Must be called within a Tokio runtime context.
    pub fn new(url: impl Into<String>, headers: HeaderMap) -> Result<Self> {
        Self::with_config(url, headers, Config::default())
    }

    /// Create an endpoint with the given [`Config`] and start dialing.
    pub fn with_config(url: impl Into<String>, headers: HeaderMap, config: Config) -> Result<Self> {
        let url = url.into();
        _ = url.as_str().into_client_request()?;

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let (status_tx, status_rx) = mpsc::channel(STATUS_CAPACITY);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);

        let supervisor = Supervisor::new(
            url.clone(),
            headers.clone(),
            config,
            inbound_tx,
            status_tx,
            outbound_rx,
            command_rx,
        );
        tokio::spawn(supervisor.run());

        Ok(Self {
            url,
            headers,
            inbound: inbound_rx,
            outbound: outbound_tx,
            status: status_rx,
            command: command_tx,
        })
    }

    /// The target URL this endpoint dials.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The HTTP headers sent with every handshake.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn malformed_url_is_a_construction_error() {
        let result = Endpoint::new("not a url", HeaderMap::new());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn endpoint_exposes_url_and_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-access-token", "token".parse().unwrap());

        let endpoint = Endpoint::new("ws://127.0.0.1:9/", headers).unwrap();
        assert_eq!(endpoint.url(), "ws://127.0.0.1:9/");
        assert!(endpoint.headers().contains_key("x-access-token"));
    }
}
