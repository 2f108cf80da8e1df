use std::time::Duration;

const DEFAULT_HANDSHAKE_TIMEOUT_DURATION: Duration = Duration::from_secs(5);
const DEFAULT_DIAL_BACKOFF_DURATION: Duration = Duration::from_secs(34);
const DEFAULT_KEEPALIVE_INTERVAL_DURATION: Duration = Duration::from_secs(34);
const DEFAULT_WRITE_DEADLINE_DURATION: Duration = Duration::from_secs(3);
const DEFAULT_PING_DEADLINE_DURATION: Duration = Duration::from_secs(3);
const DEFAULT_DRAIN_GRACE_DURATION: Duration = Duration::from_millis(50);

/// Configuration for endpoint timing behavior.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum time for the WebSocket handshake to complete
    pub handshake_timeout: Duration,
    /// Pause between failed dial attempts
    pub dial_backoff: Duration,
    /// Idle time without any I/O before a PING is sent to the peer
    pub keepalive_interval: Duration,
    /// Per-message write deadline
    pub write_deadline: Duration,
    /// Deadline for writing a PING control frame
    pub ping_deadline: Duration,
    /// Pause at the start of shutdown to let workers react before the
    /// internal streams are drained
    pub drain_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT_DURATION,
            dial_backoff: DEFAULT_DIAL_BACKOFF_DURATION,
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL_DURATION,
            write_deadline: DEFAULT_WRITE_DEADLINE_DURATION,
            ping_deadline: DEFAULT_PING_DEADLINE_DURATION,
            drain_grace: DEFAULT_DRAIN_GRACE_DURATION,
        }
    }
}
