//! TCP transport implementation using `tokio::net`.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::frame::{read_frame, write_frame};
use crate::{Connection, ConnectionConfig, ConnectionId, Connector, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A [`Connector`] that opens plain TCP streams. No TLS.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Connection = TcpConnection;

    async fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Self::Connection, TransportError> {
        let addr = config.addr();
        let stream = match tokio::time::timeout(
            config.connect_timeout,
            TcpStream::connect(addr.as_str()),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(TransportError::Connect { addr, source }),
            Err(_) => {
                return Err(TransportError::Connect {
                    addr,
                    source: io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("no answer within {:?}", config.connect_timeout),
                    ),
                });
            }
        };

        // Requests are small and strictly alternating; don't let Nagle
        // hold one back waiting for more.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "could not disable Nagle");
        }

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %addr, "opened TCP connection");

        Ok(TcpConnection {
            id,
            stream,
            max_frame_size: config.max_frame_size,
        })
    }
}

/// A single TCP connection to the trading server.
pub struct TcpConnection {
    id: ConnectionId,
    stream: TcpStream,
    max_frame_size: usize,
}

impl Connection for TcpConnection {
    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        write_frame(&mut self.stream, frame, self.max_frame_size).await
    }

    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        read_frame(&mut self.stream, self.max_frame_size).await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.stream
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
