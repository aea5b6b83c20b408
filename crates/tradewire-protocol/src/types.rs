//! Core protocol types for Tradewire's wire format.
//!
//! Every type here travels "on the wire": a [`Request`] goes out, exactly
//! one [`Response`] comes back. The client and the trading server agree on
//! these shapes; nothing else crosses the socket.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Value;

// ---------------------------------------------------------------------------
// Stock
// ---------------------------------------------------------------------------

/// One row of the server's stock listing.
///
/// Immutable once received: the client never edits prices locally, it
/// asks again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub price: f64,
}

impl Stock {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            price,
        }
    }
}

// ---------------------------------------------------------------------------
// OrderAttachment: optional extras on a Buy
// ---------------------------------------------------------------------------

/// Client-supplied bookkeeping that may ride along with a Buy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMetadata {
    /// Caller's own identifier for the order, echoed in server logs.
    pub client_order_id: String,
    /// Free-text note.
    pub note: String,
}

/// Optional extra payload on a Buy request.
///
/// The field used to accept any serializable object, and the receiver
/// rebuilt whatever type the stream named. Here the set of payloads is an
/// enum: a decoder that meets any other tag fails with
/// [`DecodeError::UnknownTag`](crate::DecodeError::UnknownTag).
///
/// `#[serde(tag = "type")]` → `{ "type": "Memo", "text": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OrderAttachment {
    /// A short free-text memo.
    Memo { text: String },
    /// A structured metadata record.
    Metadata(OrderMetadata),
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// The kind of a request, without its fields.
///
/// Used for logging and for the token rule: every kind except
/// [`Login`](RequestKind::Login) must carry a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Login,
    GetBalance,
    GetPortfolio,
    GetStocks,
    Buy,
    Sell,
}

impl RequestKind {
    /// Returns `true` for every kind the server only accepts from an
    /// authenticated session.
    pub fn requires_token(self) -> bool {
        !matches!(self, Self::Login)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::GetBalance => "GetBalance",
            Self::GetPortfolio => "GetPortfolio",
            Self::GetStocks => "GetStocks",
            Self::Buy => "Buy",
            Self::Sell => "Sell",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific request fields.
///
/// Internally tagged for JSON: `{ "kind": "Sell", "symbol": "TSLA", "quantity": 5 }`.
/// Quantities are `i32`. The server defines the valid range, and
/// the client passes negative or extreme values through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RequestBody {
    Login {
        username: String,
        password: String,
    },
    GetBalance,
    GetPortfolio,
    GetStocks,
    Buy {
        symbol: String,
        quantity: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attachment: Option<OrderAttachment>,
    },
    Sell {
        symbol: String,
        quantity: i32,
    },
}

impl RequestBody {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Login { .. } => RequestKind::Login,
            Self::GetBalance => RequestKind::GetBalance,
            Self::GetPortfolio => RequestKind::GetPortfolio,
            Self::GetStocks => RequestKind::GetStocks,
            Self::Buy { .. } => RequestKind::Buy,
            Self::Sell { .. } => RequestKind::Sell,
        }
    }
}

/// A complete request as written to the wire.
///
/// ```text
/// ┌──────────────────────────────┐
/// │ session_token: "tok-123"     │  ← empty until login succeeds
/// │ ┌──────────────────────────┐ │
/// │ │ body: Buy { TSLA, 10 }   │ │  ← kind + kind fields
/// │ └──────────────────────────┘ │
/// └──────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Opaque session token. Empty before login.
    #[serde(default)]
    pub session_token: String,

    #[serde(flatten)]
    pub body: RequestBody,
}

impl Request {
    /// Builds a request with an empty session token.
    pub fn new(body: RequestBody) -> Self {
        Self {
            session_token: String::new(),
            body,
        }
    }

    pub fn login(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(RequestBody::Login {
            username: username.into(),
            password: password.into(),
        })
    }

    pub fn get_balance() -> Self {
        Self::new(RequestBody::GetBalance)
    }

    pub fn get_portfolio() -> Self {
        Self::new(RequestBody::GetPortfolio)
    }

    pub fn get_stocks() -> Self {
        Self::new(RequestBody::GetStocks)
    }

    pub fn buy(symbol: impl Into<String>, quantity: i32) -> Self {
        Self::new(RequestBody::Buy {
            symbol: symbol.into(),
            quantity,
            attachment: None,
        })
    }

    /// A Buy carrying an [`OrderAttachment`].
    pub fn buy_with(
        symbol: impl Into<String>,
        quantity: i32,
        attachment: OrderAttachment,
    ) -> Self {
        Self::new(RequestBody::Buy {
            symbol: symbol.into(),
            quantity,
            attachment: Some(attachment),
        })
    }

    pub fn sell(symbol: impl Into<String>, quantity: i32) -> Self {
        Self::new(RequestBody::Sell {
            symbol: symbol.into(),
            quantity,
        })
    }

    pub fn kind(&self) -> RequestKind {
        self.body.kind()
    }

    /// Returns a copy of this request carrying `token`.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = token.into();
        self
    }

    /// `true` when the token rule holds: Login may go without a token,
    /// every other kind needs a non-empty one.
    pub fn has_required_token(&self) -> bool {
        !self.kind().requires_token() || !self.session_token.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// The server's reply to exactly one request.
///
/// `success = false` is a normal answer (bad password, insufficient
/// funds), not an error: the protocol layer hands it back as-is and the
/// caller decides what it means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    /// Shape depends on the request kind; [`Value::Null`] on failure.
    #[serde(default)]
    pub data: Value,
}

impl Response {
    pub fn ok(data: impl Into<Value>) -> Self {
        Self {
            success: true,
            message: String::new(),
            data: data.into(),
        }
    }

    /// A failed response carrying no data.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: Value::Null,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

// =========================================================================
// Tests
// =========================================================================
