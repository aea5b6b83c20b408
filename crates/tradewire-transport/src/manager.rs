//! The connection manager: one connection, one exchange at a time.
//!
//! # State machine
//!
//! ```text
//!            exchange() / connect()
//! Unconnected ────────────────────→ Connected
//!      ↑                                │
//!      └── disconnect() / fatal error ──┘
//!          / peer closed
//! ```
//!
//! The live connection is *owned* by the state: `Connected` holds it,
//! `Unconnected` holds nothing. An exchange moves the connection out of
//! the state for its duration and only moves it back once a complete
//! response frame has been read. Any failure (or the exchange future
//! being dropped part-way) leaves the manager `Unconnected`, so the next
//! exchange always starts on a fresh socket and never behind a half
//! written request.

use std::time::Duration;

use crate::frame::is_hang_up;
use crate::{Connection, ConnectionConfig, Connector, TcpConnector, TransportError};

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unconnected,
    Connected,
}

enum Link<T> {
    Unconnected,
    Connected(T),
}

/// Runs request/response exchanges over one lazily opened connection.
///
/// `exchange` takes `&mut self`, so two exchanges on one manager can't
/// overlap: the borrow checker enforces the "no pipelining" rule. A host
/// that needs concurrent sessions creates one manager per session.
pub struct ConnectionManager<C: Connector = TcpConnector> {
    config: ConnectionConfig,
    connector: C,
    link: Link<C::Connection>,
}

impl ConnectionManager<TcpConnector> {
    /// Creates an unconnected manager that will dial TCP.
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> ConnectionManager<C> {
    pub fn with_connector(config: ConnectionConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            link: Link::Unconnected,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        match self.link {
            Link::Unconnected => ConnectionState::Unconnected,
            Link::Connected(_) => ConnectionState::Connected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Opens the connection now instead of on the first exchange.
    /// A no-op when already connected.
    pub async fn connect(&mut self) -> Result<(), TransportError> {
        if let Link::Unconnected = self.link {
            let conn = self.open().await?;
            self.link = Link::Connected(conn);
        }
        Ok(())
    }

    /// Sends one request frame and waits for its response frame.
    ///
    /// Opens the connection first if there isn't one.
    ///
    /// # Returns
    /// - `Ok(Some(frame))`: the response; the connection stays open.
    /// - `Ok(None)`: the peer hung up without answering, either before
    ///   the request could be written or before the first reply byte.
    ///   Not an error: the caller decides whether to retry. The dead
    ///   connection is dropped.
    ///
    /// # Errors
    /// - [`TransportError::Connect`]: the connection couldn't be opened.
    /// - any other [`TransportError`]: the exchange failed mid-way; the
    ///   connection is torn down and the next call reconnects.
    pub async fn exchange(
        &mut self,
        request: &[u8],
    ) -> Result<Option<Vec<u8>>, TransportError> {
        let mut conn = match std::mem::replace(&mut self.link, Link::Unconnected) {
            Link::Connected(conn) => conn,
            Link::Unconnected => self.open().await?,
        };

        match round_trip(&mut conn, request, self.config.read_timeout).await {
            Ok(Some(frame)) => {
                self.link = Link::Connected(conn);
                Ok(Some(frame))
            }
            Ok(None) => {
                tracing::info!(id = %conn.id(), "peer closed the connection without a response");
                close_quietly(conn).await;
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(id = %conn.id(), error = %e, "exchange failed, dropping connection");
                close_quietly(conn).await;
                Err(e)
            }
        }
    }

    /// Closes the connection, first giving the peer a short window to
    /// push a final message.
    ///
    /// Some servers send a trailing message when a client leaves. The
    /// wait is bounded by `drain_timeout` and may legitimately end with
    /// nothing. Close errors are logged, never returned: shutting the
    /// client down must not fail the caller's own shutdown.
    ///
    /// Idempotent. Returns the trailing frame, if one arrived.
    pub async fn disconnect(&mut self) -> Option<Vec<u8>> {
        let Link::Connected(mut conn) = std::mem::replace(&mut self.link, Link::Unconnected)
        else {
            tracing::debug!("disconnect called while unconnected");
            return None;
        };

        let id = conn.id();
        let trailing = match tokio::time::timeout(self.config.drain_timeout, conn.recv()).await {
            Ok(Ok(Some(frame))) => {
                tracing::debug!(%id, bytes = frame.len(), "drained trailing frame");
                Some(frame)
            }
            Ok(Ok(None)) => {
                tracing::debug!(%id, "peer closed with no trailing data");
                None
            }
            Ok(Err(e)) => {
                tracing::debug!(%id, error = %e, "drain read failed");
                None
            }
            Err(_) => {
                tracing::debug!(%id, "no trailing data within drain window");
                None
            }
        };

        close_quietly(conn).await;
        tracing::info!(%id, "disconnected");
        trailing
    }

    async fn open(&self) -> Result<C::Connection, TransportError> {
        let addr = self.config.addr();
        match self.connector.connect(&self.config).await {
            Ok(conn) => {
                tracing::info!(id = %conn.id(), %addr, "connected");
                Ok(conn)
            }
            Err(e) => {
                tracing::warn!(%addr, error = %e, "connect failed");
                Err(e)
            }
        }
    }
}

async fn round_trip<T: Connection>(
    conn: &mut T,
    request: &[u8],
    read_timeout: Option<Duration>,
) -> Result<Option<Vec<u8>>, TransportError> {
    match conn.send(request).await {
        Ok(()) => {}
        // Peer already gone; no reply byte was read.
        Err(TransportError::SendFailed(e)) if is_hang_up(&e) => return Ok(None),
        Err(e) => return Err(e),
    }
    match read_timeout {
        Some(limit) => tokio::time::timeout(limit, conn.recv())
            .await
            .map_err(|_| TransportError::TimedOut(limit))?,
        None => conn.recv().await,
    }
}

async fn close_quietly<T: Connection>(mut conn: T) {
    if let Err(e) = conn.close().await {
        tracing::warn!(id = %conn.id(), error = %e, "error while closing connection");
    }
}

// =========================================================================
// Tests
// =========================================================================
