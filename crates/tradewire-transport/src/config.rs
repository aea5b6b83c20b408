//! Transport configuration.

use std::time::Duration;

use crate::frame::DEFAULT_MAX_FRAME_SIZE;

/// Default trading server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default trading server port.
pub const DEFAULT_PORT: u16 = 9999;

/// Where to connect and how long to wait.
///
/// Create one with [`ConnectionConfig::new`] or `Default`, then override
/// the fields you care about with struct update syntax:
///
/// ```rust
/// use std::time::Duration;
/// use tradewire_transport::ConnectionConfig;
///
/// let config = ConnectionConfig {
///     read_timeout: Some(Duration::from_secs(5)),
///     ..ConnectionConfig::new("127.0.0.1", 9999)
/// };
/// assert_eq!(config.addr(), "127.0.0.1:9999");
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,

    /// Deadline for opening the socket. Expiry is a connect error.
    pub connect_timeout: Duration,

    /// Deadline for a response after the request is written.
    ///
    /// `None` waits forever, which hangs on a peer that stalls without
    /// closing. Expiry is [`TransportError::TimedOut`](crate::TransportError::TimedOut)
    /// and tears the connection down.
    pub read_timeout: Option<Duration>,

    /// How long [`disconnect`](crate::ConnectionManager::disconnect)
    /// waits for a trailing message before closing. Timing out here is
    /// normal, not an error.
    pub drain_timeout: Duration,

    /// Largest frame payload accepted in either direction.
    pub max_frame_size: usize,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// `host:port`, as handed to the resolver.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: Duration::from_secs(10),
            read_timeout: None,
            drain_timeout: Duration::from_millis(250),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}
