use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, timeout};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest as _;
use tokio_tungstenite::tungstenite::http::HeaderMap;

use crate::Result;
use crate::config::Config;
use crate::error::Error;
use crate::supervisor::WsStream;
use crate::types::{State, Status};

/// Dial until a connection is established or the cancel signal closes.
///
/// Emits `Connecting` before each attempt. On success the connection is
/// handed to the supervisor, `Connected` is emitted, and the task exits.
/// On failure it emits `Disconnected` with the cause, then `Waiting`, and
/// pauses for the configured backoff before retrying. Cancellation exits
/// silently; the supervisor owns the terminal status.
pub(crate) async fn run(
    url: String,
    headers: HeaderMap,
    config: Config,
    conn_tx: mpsc::Sender<WsStream>,
    status_tx: mpsc::Sender<Status>,
    mut cancel: watch::Receiver<bool>,
) {
    loop {
        _ = status_tx.send(Status::new(State::Connecting)).await;

        tokio::select! {
            _ = cancel.changed() => return,
            result = attempt(&url, &headers, &config) => match result {
                Ok(stream) => {
                    _ = conn_tx.send(stream).await;
                    _ = status_tx.send(Status::new(State::Connected)).await;
                    return;
                }
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(%url, %error, "unable to connect");

                    _ = status_tx.send(Status::disconnected(error)).await;
                }
            },
        }

        _ = status_tx.send(Status::new(State::Waiting)).await;
        tokio::select! {
            _ = cancel.changed() => return,
            () = sleep(config.dial_backoff) => {}
        }
    }
}

async fn attempt(url: &str, headers: &HeaderMap, config: &Config) -> Result<WsStream> {
    let mut request = url.into_client_request()?;
    request
        .headers_mut()
        .extend(headers.iter().map(|(name, value)| (name.clone(), value.clone())));

    match timeout(config.handshake_timeout, connect_async(request)).await {
        Ok(Ok((stream, _response))) => Ok(stream),
        Ok(Err(e)) => Err(Error::Connection(e)),
        Err(_) => Err(Error::HandshakeTimeout),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::net::TcpListener;

    use super::*;

    /// Bind an ephemeral port and drop the listener so dialing it is
    /// refused immediately.
    async fn unreachable_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("ws://{addr}/")
    }

    #[tokio::test]
    async fn failed_dial_cycles_through_waiting() {
        let url = unreachable_url().await;
        let (conn_tx, _conn_rx) = mpsc::channel(1);
        let (status_tx, mut status_rx) = mpsc::channel(8);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let task = tokio::spawn(run(
            url,
            HeaderMap::new(),
            Config::default(),
            conn_tx,
            status_tx,
            cancel_rx,
        ));

        let status = status_rx.recv().await.unwrap();
        assert_eq!(status.state, State::Connecting);
        let status = status_rx.recv().await.unwrap();
        assert_eq!(status.state, State::Disconnected);
        assert!(status.error.is_some());
        let status = status_rx.recv().await.unwrap();
        assert_eq!(status.state, State::Waiting);

        // Cancelling a waiting dialer stops it without another status.
        drop(cancel_tx);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert!(status_rx.try_recv().is_err());
    }
}
