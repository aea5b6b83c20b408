//! Error types for the session layer.

/// Errors that can occur while managing the session token.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A token must be non-empty: an empty token is what an
    /// unauthenticated request carries.
    #[error("session token must not be empty")]
    EmptyToken,
}
