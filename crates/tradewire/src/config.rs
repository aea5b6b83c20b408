//! Client configuration and builder.

use std::time::Duration;

use tradewire_protocol::{BinaryCodec, Codec};
use tradewire_transport::{
    ConnectionConfig, Connector, DEFAULT_HOST, DEFAULT_PORT, TcpConnector,
    frame::DEFAULT_MAX_FRAME_SIZE,
};

use crate::TradingClient;

/// Everything a [`TradingClient`] needs, fixed at construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,

    /// Emit a `[TX]`/`[RX]` trace line per exchange under the
    /// `tradewire::trace` target. Log output only; nothing extra goes on
    /// the wire.
    pub debug: bool,

    pub connect_timeout: Duration,
    /// `None` waits indefinitely for each response.
    pub read_timeout: Option<Duration>,
    pub drain_timeout: Duration,
    pub max_frame_size: usize,
}

impl ClientConfig {
    /// The transport-level subset of this config.
    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.host.clone(),
            port: self.port,
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            drain_timeout: self.drain_timeout,
            max_frame_size: self.max_frame_size,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        let transport = ConnectionConfig::default();
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
            connect_timeout: transport.connect_timeout,
            read_timeout: transport.read_timeout,
            drain_timeout: transport.drain_timeout,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

/// Builder for configuring a [`TradingClient`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tradewire::TradingClient;
///
/// let client = TradingClient::builder()
///     .host("127.0.0.1")
///     .port(9999)
///     .debug(true)
///     .read_timeout(Duration::from_secs(5))
///     .build();
/// assert!(!client.is_authenticated());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = Some(timeout);
        self
    }

    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.config.drain_timeout = timeout;
        self
    }

    pub fn max_frame_size(mut self, bytes: usize) -> Self {
        self.config.max_frame_size = bytes;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds a client that speaks the binary codec over TCP.
    pub fn build(self) -> TradingClient {
        TradingClient::with_parts(self.config, BinaryCodec, TcpConnector)
    }

    /// Builds a client with a different codec or connector.
    pub fn build_with<C: Codec, K: Connector>(
        self,
        codec: C,
        connector: K,
    ) -> TradingClient<C, K> {
        TradingClient::with_parts(self.config, codec, connector)
    }
}
