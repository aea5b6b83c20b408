//! Error types for the Tradewire client.

use tradewire_protocol::ProtocolError;
use tradewire_session::SessionError;
use tradewire_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// These are the *fatal* outcomes of an exchange: the socket couldn't be
/// opened, broke mid-exchange, or the reply was unreadable. A server
/// saying "no" is not one of them; that arrives as a normal
/// [`Response`](tradewire_protocol::Response) with `success = false`.
///
/// The `#[from]` attribute on each variant generates `From` impls, so the
/// `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TradewireError {
    /// Connect or I/O failure. The connection has been reset; the next
    /// call reconnects.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request couldn't be encoded, or the reply couldn't be decoded.
    /// The connection itself is still usable.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session token was rejected locally.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl TradewireError {
    /// `true` if the server couldn't be reached at all.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }

    /// `true` if the reply arrived but couldn't be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Protocol(e) if e.is_decode())
    }
}

/// Outcome of a typed operation that didn't produce its value.
///
/// Used for both authentication and trading calls: a rejected login is a
/// [`Rejected`](ApiError::Rejected) like any other.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with `success = false`.
    #[error("rejected by server: {message}")]
    Rejected { message: String },

    /// The server answered with `success = true` but `data` had the
    /// wrong shape for this request kind.
    #[error("unexpected response data: expected {expected}, got {found}")]
    UnexpectedData {
        expected: &'static str,
        found: &'static str,
    },

    /// The exchange itself failed.
    #[error(transparent)]
    Client(#[from] TradewireError),
}

/// Login failures use the same shape as every other call.
pub type AuthError = ApiError;

impl ApiError {
    /// The server's message, when the server rejected the request.
    pub fn rejection(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } => Some(message),
            _ => None,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        Self::Client(e.into())
    }
}

impl From<ProtocolError> for ApiError {
    fn from(e: ProtocolError) -> Self {
        Self::Client(e.into())
    }
}
