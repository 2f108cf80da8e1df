use futures::StreamExt as _;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::http::HeaderMap;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::config::Config;
use crate::error::Error;
use crate::types::{Command, FrameKind, State, Status};
use crate::writer::WriterExit;
use crate::{dialer, keepalive, reader, writer};

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Internal stream capacities. Each worker sends at most one report per
/// lifetime, so capacity 1 keeps a dying worker from ever blocking on the
/// supervisor.
const CONN_CAPACITY: usize = 1;
const READER_ERROR_CAPACITY: usize = 1;
const WRITER_EXIT_CAPACITY: usize = 1;
const CONTROL_CAPACITY: usize = 1;
const IO_EVENT_CAPACITY: usize = 2;

/// The single coordinating task behind an endpoint.
///
/// Owns all mutable coordination state and advances it one event at a time:
/// a connection arriving from the dialer, a reader error, a writer exit, or
/// a user command. Spawns and reaps every worker, and on shutdown drains and
/// joins them before closing the user-visible streams.
pub(crate) struct Supervisor {
    url: String,
    headers: HeaderMap,
    config: Config,

    inbound_tx: mpsc::Sender<Vec<u8>>,
    status_tx: mpsc::Sender<Status>,
    /// Held between connections; a live writer owns it otherwise
    outbound_rx: Option<mpsc::Receiver<Vec<u8>>>,
    command_rx: mpsc::Receiver<Command>,

    conn_tx: mpsc::Sender<WsStream>,
    conn_rx: mpsc::Receiver<WsStream>,
    reader_error_tx: mpsc::Sender<Error>,
    reader_error_rx: mpsc::Receiver<Error>,
    writer_exit_tx: mpsc::Sender<WriterExit>,
    writer_exit_rx: mpsc::Receiver<WriterExit>,
    control_tx: mpsc::Sender<Command>,
    /// Held between connections, like `outbound_rx`
    control_rx: Option<mpsc::Receiver<Command>>,
    io_tx: mpsc::Sender<()>,
    io_rx: Option<mpsc::Receiver<()>>,
    dial_cancel: watch::Sender<bool>,

    /// Close signal for the current connection; `Some` if and only if a
    /// reader or writer exists. Dropping the sender is the close operation.
    conn_close: Option<watch::Sender<bool>>,
    reading: bool,
    writing: bool,
    frame: FrameKind,

    dialer_task: Option<JoinHandle<()>>,
    reader_task: Option<JoinHandle<()>>,
    writer_task: Option<JoinHandle<()>>,
    keepalive_task: Option<JoinHandle<()>>,
}

impl Supervisor {
    pub(crate) fn new(
        url: String,
        headers: HeaderMap,
        config: Config,
        inbound_tx: mpsc::Sender<Vec<u8>>,
        status_tx: mpsc::Sender<Status>,
        outbound_rx: mpsc::Receiver<Vec<u8>>,
        command_rx: mpsc::Receiver<Command>,
    ) -> Self {
        let (conn_tx, conn_rx) = mpsc::channel(CONN_CAPACITY);
        let (reader_error_tx, reader_error_rx) = mpsc::channel(READER_ERROR_CAPACITY);
        let (writer_exit_tx, writer_exit_rx) = mpsc::channel(WRITER_EXIT_CAPACITY);
        let (control_tx, control_rx) = mpsc::channel(CONTROL_CAPACITY);
        let (io_tx, io_rx) = mpsc::channel(IO_EVENT_CAPACITY);
        let (dial_cancel, _) = watch::channel(false);

        Self {
            url,
            headers,
            config,
            inbound_tx,
            status_tx,
            outbound_rx: Some(outbound_rx),
            command_rx,
            conn_tx,
            conn_rx,
            reader_error_tx,
            reader_error_rx,
            writer_exit_tx,
            writer_exit_rx,
            control_tx,
            control_rx: Some(control_rx),
            io_tx,
            io_rx: Some(io_rx),
            dial_cancel,
            conn_close: None,
            reading: false,
            writing: false,
            frame: FrameKind::Binary,
            dialer_task: None,
            reader_task: None,
            writer_task: None,
            keepalive_task: None,
        }
    }

    pub(crate) async fn run(mut self) {
        if let Some(io_rx) = self.io_rx.take() {
            self.keepalive_task = Some(tokio::spawn(keepalive::run(
                io_rx,
                self.control_tx.clone(),
                self.config.keepalive_interval,
            )));
        }
        self.spawn_dialer();

        loop {
            tokio::select! {
                conn = self.conn_rx.recv() => match conn {
                    Some(stream) => self.attach(stream),
                    None => break,
                },
                Some(error) = self.reader_error_rx.recv() => self.on_reader_error(error).await,
                Some(exit) = self.writer_exit_rx.recv() => self.on_writer_exit(exit).await,
                command = self.command_rx.recv() => match command {
                    None | Some(Command::Quit) => {
                        _ = self.status_tx.send(Status::new(State::Disconnected)).await;
                        break;
                    }
                    Some(Command::Ping) => {
                        if self.writing && self.conn_close.is_some() {
                            _ = self.control_tx.send(Command::Ping).await;
                        }
                    }
                    Some(command @ (Command::UseText | Command::UseBinary)) => {
                        self.frame = match command {
                            Command::UseText => FrameKind::Text,
                            _ => FrameKind::Binary,
                        };
                        if self.writing {
                            _ = self.control_tx.send(command).await;
                        }
                    }
                },
            }
        }

        self.teardown().await;
    }

    fn spawn_dialer(&mut self) {
        self.dialer_task = Some(tokio::spawn(dialer::run(
            self.url.clone(),
            self.headers.clone(),
            self.config.clone(),
            self.conn_tx.clone(),
            self.status_tx.clone(),
            self.dial_cancel.subscribe(),
        )));
    }

    /// Bind a freshly dialed connection to a new reader/writer pair.
    fn attach(&mut self, stream: WsStream) {
        debug_assert!(!self.reading && !self.writing);
        let (Some(outbound), Some(mut control)) = (self.outbound_rx.take(), self.control_rx.take())
        else {
            return;
        };

        // The previous connection's lifetime may have left a command behind
        // (a QUIT addressed to a writer that had already exited, or a stale
        // PING). It must not reach the new writer.
        while control.try_recv().is_ok() {}

        let (sink, source) = stream.split();
        let (close_tx, close_rx) = watch::channel(false);

        self.reading = true;
        self.reader_task = Some(tokio::spawn(reader::run(
            source,
            close_rx.clone(),
            self.inbound_tx.clone(),
            self.io_tx.clone(),
            self.reader_error_tx.clone(),
        )));

        self.writing = true;
        self.writer_task = Some(tokio::spawn(writer::run(
            sink,
            outbound,
            control,
            close_rx,
            self.io_tx.clone(),
            self.writer_exit_tx.clone(),
            self.frame,
            self.config.clone(),
        )));

        self.conn_close = Some(close_tx);
    }

    async fn on_reader_error(&mut self, error: Error) {
        #[cfg(feature = "tracing")]
        tracing::debug!(%error, "reader stopped");

        self.reading = false;
        if self.writing {
            // The writer is still up; ask it to exit and let its exit report
            // drive the reconnection.
            _ = self.control_tx.send(Command::Quit).await;
            _ = self.status_tx.send(Status::disconnected(error)).await;
        } else {
            drop(self.conn_close.take());
            self.spawn_dialer();
        }
    }

    async fn on_writer_exit(&mut self, exit: WriterExit) {
        #[cfg(feature = "tracing")]
        tracing::debug!(error = %exit.error, "writer stopped");

        self.writing = false;
        let WriterExit {
            error,
            outbound,
            control,
        } = exit;
        self.outbound_rx = Some(outbound);
        self.control_rx = Some(control);

        if self.reading {
            // Closing the connection forces the reader down; its error
            // arrives as the next event.
            drop(self.conn_close.take());
            _ = self.status_tx.send(Status::disconnected(error)).await;
        } else {
            self.conn_close = None;
            self.spawn_dialer();
        }
    }

    /// Ordered shutdown: release every worker, give them a moment to react,
    /// drain whatever they were mid-send on, then join them all before the
    /// user-visible streams close.
    async fn teardown(mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!("endpoint shutting down");

        drop(self.conn_close.take());
        drop(self.dial_cancel);
        drop(self.control_tx);
        drop(self.io_tx);

        sleep(self.config.drain_grace).await;

        // A worker that was mid-send when shutdown began must not wedge the
        // join below. A late-arriving connection is closed by dropping it.
        while let Ok(stream) = self.conn_rx.try_recv() {
            drop(stream);
        }
        while self.reader_error_rx.try_recv().is_ok() {}
        while let Ok(exit) = self.writer_exit_rx.try_recv() {
            self.outbound_rx = Some(exit.outbound);
        }

        for task in [
            self.dialer_task.take(),
            self.reader_task.take(),
            self.writer_task.take(),
            self.keepalive_task.take(),
        ]
        .into_iter()
        .flatten()
        {
            _ = task.await;
        }

        // The writer may have exited only after the first drain pass.
        while let Ok(exit) = self.writer_exit_rx.try_recv() {
            self.outbound_rx = Some(exit.outbound);
        }
        if let Some(mut outbound) = self.outbound_rx.take() {
            while outbound.try_recv().is_ok() {}
        }
        while self.command_rx.try_recv().is_ok() {}

        // Dropping self closes the inbound and status streams.
    }
}
