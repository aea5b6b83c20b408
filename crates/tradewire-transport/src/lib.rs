//! Transport layer for Tradewire.
//!
//! Provides the [`Connector`] and [`Connection`] traits that abstract over
//! how a byte stream to the trading server is opened, a TCP
//! implementation of both, and the [`ConnectionManager`] that runs
//! strictly sequential request/response exchanges over one connection.
//!
//! ```text
//! ConnectionManager ──connect()──→ Connector ──→ Connection
//!        │                                          │
//!        └──exchange(frame)──── send / recv ────────┘
//! ```

#![allow(async_fn_in_trait)]

mod config;
mod error;
pub mod frame;
mod manager;
mod tcp;

pub use config::{ConnectionConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use error::TransportError;
pub use frame::{read_frame, write_frame};
pub use manager::{ConnectionManager, ConnectionState};
pub use tcp::{TcpConnection, TcpConnector};

use std::fmt;

/// Opaque identifier for a connection, for correlating log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Opens connections to the configured endpoint.
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced by this connector.
    type Connection: Connection;

    /// Opens a new connection.
    ///
    /// # Errors
    /// [`TransportError::Connect`] on DNS failure, refusal, or when
    /// `config.connect_timeout` passes.
    async fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Self::Connection, TransportError>;
}

/// A single open connection that moves whole frames.
///
/// Methods take `&mut self`: a connection has exactly one user at a
/// time, so there is never a second request in flight.
pub trait Connection: Send + 'static {
    /// Writes one frame and flushes it.
    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// Reads the next frame.
    ///
    /// Returns `Ok(None)` when the peer closed the stream with nothing
    /// left to read.
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Shuts the connection down.
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
