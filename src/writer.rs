use futures::SinkExt as _;
use futures::stream::SplitSink;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{Bytes, Message};

use crate::Result;
use crate::config::Config;
use crate::error::Error;
use crate::supervisor::WsStream;
use crate::types::{Command, FrameKind};

/// A writer's single exit report.
///
/// Carries the outbound and control receivers back to the supervisor so the
/// next writer reuses them: payloads queued while disconnected stay queued
/// and are delivered once a new connection is up.
pub(crate) struct WriterExit {
    pub(crate) error: Error,
    pub(crate) outbound: mpsc::Receiver<Vec<u8>>,
    pub(crate) control: mpsc::Receiver<Command>,
}

/// Drain the outbound and control streams onto the connection.
///
/// Outbound payloads are written with the current frame kind under the
/// per-message deadline. Control input switches the frame kind, sends PING
/// control frames, or stops the task. Any failure produces one exit report
/// and ends the task.
#[expect(
    clippy::too_many_arguments,
    reason = "The writer owns one end of every stream it serves; bundling them would only rename the list"
)]
pub(crate) async fn run(
    mut sink: SplitSink<WsStream, Message>,
    mut outbound: mpsc::Receiver<Vec<u8>>,
    mut control: mpsc::Receiver<Command>,
    mut close: watch::Receiver<bool>,
    io_tx: mpsc::Sender<()>,
    exit_tx: mpsc::Sender<WriterExit>,
    mut frame: FrameKind,
    config: Config,
) {
    let error = loop {
        tokio::select! {
            _ = close.changed() => break Error::Cancelled,
            payload = outbound.recv() => match payload {
                Some(payload) => {
                    _ = io_tx.send(()).await;
                    let message = match encode(payload, frame) {
                        Ok(message) => message,
                        Err(error) => break error,
                    };
                    match timeout(config.write_deadline, sink.send(message)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => break Error::Connection(e),
                        Err(_) => break Error::WriteTimeout,
                    }
                }
                None => break Error::ChannelClosed("outbound"),
            },
            command = control.recv() => match command {
                Some(Command::Quit) => break Error::Cancelled,
                Some(Command::Ping) => {
                    match timeout(config.ping_deadline, sink.send(Message::Ping(Bytes::new()))).await {
                        Ok(Ok(())) => {}
                        _ => break Error::Cancelled,
                    }
                }
                Some(Command::UseText) => frame = FrameKind::Text,
                Some(Command::UseBinary) => frame = FrameKind::Binary,
                None => break Error::ChannelClosed("control"),
            },
        }
    };

    _ = exit_tx
        .send(WriterExit {
            error,
            outbound,
            control,
        })
        .await;
}

fn encode(payload: Vec<u8>, frame: FrameKind) -> Result<Message> {
    match frame {
        FrameKind::Binary => Ok(Message::Binary(payload.into())),
        FrameKind::Text => match String::from_utf8(payload) {
            Ok(text) => Ok(Message::Text(text.into())),
            Err(e) => Err(Error::InvalidText(e)),
        },
    }
}
