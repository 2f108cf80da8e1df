use futures::StreamExt as _;
use futures::stream::SplitStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;

use crate::error::Error;
use crate::supervisor::WsStream;

/// Pump frames from the connection into the inbound stream.
///
/// Every received frame publishes an I/O event; only data frame payloads are
/// delivered to the user. Pong replies to keepalive pings arrive here too and
/// reset the idle timer the same way. The task exits with a single error
/// report when the connection fails or the close signal drops.
pub(crate) async fn run(
    mut source: SplitStream<WsStream>,
    mut close: watch::Receiver<bool>,
    inbound_tx: mpsc::Sender<Vec<u8>>,
    io_tx: mpsc::Sender<()>,
    error_tx: mpsc::Sender<Error>,
) {
    let error = loop {
        tokio::select! {
            _ = close.changed() => break Error::Cancelled,
            frame = source.next() => match frame {
                Some(Ok(message)) => {
                    _ = io_tx.send(()).await;
                    let payload: Vec<u8> = match message {
                        Message::Text(text) => text.as_bytes().to_vec(),
                        Message::Binary(data) => data.into(),
                        _ => continue,
                    };
                    if inbound_tx.send(payload).await.is_err() {
                        break Error::ChannelClosed("inbound");
                    }
                }
                Some(Err(e)) => break Error::Connection(e),
                None => break Error::ConnectionClosed,
            },
        }
    };

    _ = error_tx.send(error).await;
}
