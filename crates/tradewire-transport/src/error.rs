/// Errors that can occur in the transport layer.
///
/// Every variant is fatal for the exchange that hit it. The
/// [`ConnectionManager`](crate::ConnectionManager) drops the socket
/// before returning one, so the next exchange starts from a fresh
/// connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Opening the connection failed: DNS, refusal, or the connect
    /// deadline passed. Not retried.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading a frame failed after the peer had started answering, or
    /// with an error other than a clean close.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// No complete response arrived within the read deadline.
    #[error("no response within {0:?}")]
    TimedOut(std::time::Duration),

    /// A frame's declared length is over the configured limit.
    #[error("frame of {size} bytes exceeds limit of {max}")]
    FrameTooLarge { size: usize, max: usize },
}

impl TransportError {
    /// `true` if the socket was never opened.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }
}
