use std::error::Error as StdError;
use std::fmt;
use std::string::FromUtf8Error;

/// Endpoint error variants.
///
/// Errors never cross the user boundary as failures to handle: they arrive
/// inside [`Status`](crate::Status) records explaining a `Disconnected`
/// transition while the endpoint reconnects on its own.
#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// Error connecting to or communicating with the WebSocket server
    Connection(tokio_tungstenite::tungstenite::Error),
    /// The WebSocket handshake did not complete in time
    HandshakeTimeout,
    /// A message write did not complete in time
    WriteTimeout,
    /// The peer closed the connection
    ConnectionClosed,
    /// A worker was stopped by shutdown
    Cancelled,
    /// A user-owned stream was dropped
    ChannelClosed(&'static str),
    /// An outbound payload could not be sent as a text frame
    InvalidText(FromUtf8Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "WebSocket connection error: {e}"),
            Self::HandshakeTimeout => write!(f, "WebSocket handshake timed out"),
            Self::WriteTimeout => write!(f, "WebSocket write timed out"),
            Self::ConnectionClosed => write!(f, "WebSocket connection closed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::ChannelClosed(name) => write!(f, "{name} stream closed"),
            Self::InvalidText(e) => write!(f, "payload is not valid UTF-8 text: {e}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Connection(e) => Some(e),
            Self::InvalidText(e) => Some(e),
            _ => None,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Connection(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_display_should_succeed() {
        assert_eq!(Error::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn channel_closed_names_the_stream() {
        let error = Error::ChannelClosed("outbound");
        assert_eq!(error.to_string(), "outbound stream closed");
    }

    #[test]
    fn connection_error_exposes_source() {
        let error: Error = tokio_tungstenite::tungstenite::Error::ConnectionClosed.into();
        assert!(error.source().is_some());
        assert!(error.to_string().contains("connection error"));
    }
}
