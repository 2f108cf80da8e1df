use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};

use crate::types::Command;

/// Request a PING from the writer after a fixed idle interval.
///
/// The timer starts disarmed; the first I/O event arms it and every further
/// event resets it. On expiry a PING request is pushed to the writer's
/// control stream without blocking: if the stream is full the writer is
/// already busy and the ping is redundant. The task exits when the I/O event
/// stream closes.
pub(crate) async fn run(
    mut io_rx: mpsc::Receiver<()>,
    control_tx: mpsc::Sender<Command>,
    interval: Duration,
) {
    let timer = sleep(interval);
    tokio::pin!(timer);
    let mut armed = false;

    loop {
        tokio::select! {
            event = io_rx.recv() => match event {
                Some(()) => {
                    timer.as_mut().reset(Instant::now() + interval);
                    armed = true;
                }
                None => break,
            },
            () = timer.as_mut(), if armed => {
                timer.as_mut().reset(Instant::now() + interval);

                #[cfg(feature = "tracing")]
                tracing::trace!("idle interval elapsed, requesting ping");

                _ = control_tx.try_send(Command::Ping);
            }
        }
    }
}
