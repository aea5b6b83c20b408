//! # Tradewire
//!
//! Client for a session-authenticated trading service over TCP.
//!
//! A [`TradingClient`] logs in, remembers the session token the server
//! hands back, and stamps it on every later request. Each call is one
//! request/response exchange over a single persistent connection that is
//! opened on demand and reopened after failures.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tradewire::prelude::*;
//!
//! # async fn run() -> Result<(), ApiError> {
//! let mut client = TradingClient::builder()
//!     .host("localhost")
//!     .port(9999)
//!     .build();
//!
//! client.login("trader", "trader123").await?;
//! let balance = client.get_balance().await?;
//! client.buy("TSLA", 10).await?;
//! println!("balance before order: {balance}");
//!
//! client.disconnect().await;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod holdings;
pub mod logging;
mod trace;

pub use client::{NO_DATA_MESSAGE, TradingClient};
pub use config::{ClientBuilder, ClientConfig};
pub use error::{ApiError, AuthError, TradewireError};
pub use holdings::{Holding, join_holdings, portfolio_value};

pub use tradewire_protocol as protocol;
pub use tradewire_session as session;
pub use tradewire_transport as transport;

pub mod prelude {
    pub use crate::{
        ApiError, AuthError, ClientBuilder, ClientConfig, Holding, TradewireError,
        TradingClient, portfolio_value,
    };
    pub use tradewire_protocol::{
        OrderAttachment, OrderMetadata, Request, Response, Stock, Value,
    };
}
