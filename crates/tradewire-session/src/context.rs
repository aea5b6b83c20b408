//! The session context: single source of truth for the session token.

use std::time::Instant;

use tradewire_protocol::Request;

use crate::SessionError;

/// Whether a token is currently held.
///
/// ```text
///   Anonymous ──(set_token)──→ Authenticated
///       ↑                            │
///       └──────────(clear)───────────┘
/// ```
///
/// `since` records when the token was installed, for log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated { since: Instant },
}

/// Holds the current session token and stamps it onto requests.
///
/// One context per client. It isn't shared: the token is handed out by
/// value (each stamped request gets its own copy), so nothing outside
/// ever holds a reference into it.
#[derive(Debug, Clone)]
pub struct SessionContext {
    token: Option<String>,
    state: SessionState,
}

impl SessionContext {
    /// Creates a context with no token.
    pub fn new() -> Self {
        Self {
            token: None,
            state: SessionState::Anonymous,
        }
    }

    /// Replaces the held token.
    ///
    /// Called once per successful Login, or directly to resume a session
    /// whose token was obtained elsewhere.
    ///
    /// # Errors
    /// [`SessionError::EmptyToken`] if `token` is empty; the held token
    /// is left unchanged.
    pub fn set_token(&mut self, token: impl Into<String>) -> Result<(), SessionError> {
        let token = token.into();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        let replaced = self.token.replace(token).is_some();
        self.state = SessionState::Authenticated {
            since: Instant::now(),
        };
        tracing::info!(replaced, "session token set");
        Ok(())
    }

    /// Drops the held token. The next stamped request carries an empty one.
    pub fn clear(&mut self) {
        if self.token.take().is_some() {
            tracing::info!("session token cleared");
        }
        self.state = SessionState::Anonymous;
    }

    /// Returns `request` carrying the held token, or an empty token if
    /// none was ever set. The server answers an empty token with an auth
    /// failure response; that's not decided here.
    pub fn stamp(&self, request: Request) -> Request {
        let token = self.token.clone().unwrap_or_default();
        request.with_token(token)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
