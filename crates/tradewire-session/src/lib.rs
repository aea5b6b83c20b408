//! Session context for Tradewire.
//!
//! A session is one opaque token string. It's created by a successful
//! Login, held here for the life of the client, and copied into every
//! later request. It is never refreshed automatically: when the server
//! stops honouring it, requests start coming back with `success = false`
//! and the caller logs in again.
//!
//! # How it fits in the stack
//!
//! ```text
//! Client (above)  ← asks the session to stamp each outgoing request
//!     ↕
//! Session Layer (this crate)  ← owns the token
//!     ↕
//! Protocol Layer (below)  ← provides the Request type being stamped
//! ```

mod context;
mod error;

pub use context::{SessionContext, SessionState};
pub use error::SessionError;
