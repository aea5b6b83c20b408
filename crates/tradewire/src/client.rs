//! The trading client: one method per request kind.
//!
//! Every call runs the same pipeline:
//!
//! ```text
//! Request ─stamp token─→ encode ─→ ConnectionManager::exchange ─→ decode ─→ Response
//!                                         │
//!                                  None (peer closed) ─→ synthetic failed Response
//! ```
//!
//! The `send_*` methods hand back the server's [`Response`] untouched.
//! The typed methods (`login`, `get_balance`, ...) unpack `data` into the
//! shape each kind promises and turn `success = false` into
//! [`ApiError::Rejected`].

use std::collections::BTreeMap;

use tradewire_protocol::{
    BinaryCodec, Codec, OrderAttachment, Request, RequestKind, Response, Stock,
};
use tradewire_session::SessionContext;
use tradewire_transport::{ConnectionManager, ConnectionState, Connector, TcpConnector};

use crate::holdings::{Holding, join_holdings};
use crate::{ApiError, ClientBuilder, ClientConfig, TradewireError, trace};

/// Message of the failed [`Response`] returned when the server hangs up
/// instead of answering.
pub const NO_DATA_MESSAGE: &str = "[FAILED RX] No data to read (was the pipe broken)";

/// A client session against one trading server.
///
/// Exchanges are strictly sequential: every method takes `&mut self`, so
/// two requests can never be in flight on the same connection. The
/// connection opens lazily on the first call and reopens automatically
/// after a transport failure.
///
/// Dropping a call's future mid-exchange drops the connection with it;
/// the next call starts on a fresh one.
pub struct TradingClient<C: Codec = BinaryCodec, K: Connector = TcpConnector> {
    config: ClientConfig,
    codec: C,
    connection: ConnectionManager<K>,
    session: SessionContext,
}

impl TradingClient {
    /// Client with default settings (`localhost:9999`, binary codec).
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl Default for TradingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec, K: Connector> TradingClient<C, K> {
    pub fn with_parts(config: ClientConfig, codec: C, connector: K) -> Self {
        let connection = ConnectionManager::with_connector(config.connection(), connector);
        Self {
            config,
            codec,
            connection,
            session: SessionContext::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// The token stamped on outgoing requests, if one is held.
    pub fn session_token(&self) -> Option<&str> {
        self.session.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Adopts a token obtained elsewhere, e.g. resuming an earlier session.
    ///
    /// # Errors
    /// [`TradewireError::Session`] if `token` is empty. The previous token
    /// is kept.
    pub fn set_session_token(&mut self, token: impl Into<String>) -> Result<(), TradewireError> {
        self.session.set_token(token)?;
        Ok(())
    }

    /// Forgets the session token. Later requests carry an empty token.
    pub fn clear_session(&mut self) {
        self.session.clear();
    }

    /// Sends one request and returns the server's response.
    ///
    /// Non-login requests get the current session token stamped on them,
    /// overwriting whatever the caller set. A successful login whose
    /// `data` is a non-empty string becomes the new session token.
    ///
    /// If the server closes the connection without answering, the result
    /// is `Ok` with a failed response carrying [`NO_DATA_MESSAGE`].
    ///
    /// # Errors
    /// - [`TradewireError::Transport`]: connect or I/O failure. The
    ///   connection is reset and the next call reconnects.
    /// - [`TradewireError::Protocol`]: encode or decode failure. The
    ///   connection stays up.
    pub async fn send(&mut self, request: Request) -> Result<Response, TradewireError> {
        let kind = request.kind();
        let request = if kind.requires_token() {
            self.session.stamp(request)
        } else {
            request
        };

        if self.config.debug {
            trace::outgoing(&request);
        }

        let frame = self.codec.encode_request(&request)?;
        let response = match self.connection.exchange(&frame).await? {
            Some(reply) => self.codec.decode_response(&reply)?,
            None => Response::failure(NO_DATA_MESSAGE),
        };

        if self.config.debug {
            trace::incoming(&response);
        }

        if kind == RequestKind::Login && response.success {
            self.adopt_token(&response);
        }

        Ok(response)
    }

    fn adopt_token(&mut self, response: &Response) {
        let Some(token) = response.data.as_str() else {
            tracing::warn!(
                data_type = response.data.type_name(),
                "login succeeded without a string token"
            );
            return;
        };
        if let Err(e) = self.session.set_token(token) {
            tracing::warn!(error = %e, "login returned an unusable token");
        }
    }

    pub async fn send_login(
        &mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Response, TradewireError> {
        self.send(Request::login(username, password)).await
    }

    pub async fn send_get_balance(&mut self) -> Result<Response, TradewireError> {
        self.send(Request::get_balance()).await
    }

    pub async fn send_get_portfolio(&mut self) -> Result<Response, TradewireError> {
        self.send(Request::get_portfolio()).await
    }

    pub async fn send_get_stocks(&mut self) -> Result<Response, TradewireError> {
        self.send(Request::get_stocks()).await
    }

    /// Buy order. `quantity` goes on the wire as given; the server decides
    /// what a zero or negative quantity means.
    pub async fn send_buy(
        &mut self,
        symbol: impl Into<String>,
        quantity: i32,
        attachment: Option<OrderAttachment>,
    ) -> Result<Response, TradewireError> {
        let request = match attachment {
            Some(attachment) => Request::buy_with(symbol, quantity, attachment),
            None => Request::buy(symbol, quantity),
        };
        self.send(request).await
    }

    pub async fn send_sell(
        &mut self,
        symbol: impl Into<String>,
        quantity: i32,
    ) -> Result<Response, TradewireError> {
        self.send(Request::sell(symbol, quantity)).await
    }

    /// Logs in and returns the session token.
    ///
    /// The token is also held for later requests.
    pub async fn login(
        &mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<String, ApiError> {
        let response = accepted(self.send_login(username, password).await?)?;
        match response.data.as_str() {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(unexpected("non-empty string", &response)),
        }
    }

    pub async fn get_balance(&mut self) -> Result<f64, ApiError> {
        let response = accepted(self.send_get_balance().await?)?;
        response
            .data
            .as_f64()
            .ok_or_else(|| unexpected("double", &response))
    }

    pub async fn get_stocks(&mut self) -> Result<Vec<Stock>, ApiError> {
        let response = accepted(self.send_get_stocks().await?)?;
        response
            .data
            .as_stocks()
            .ok_or_else(|| unexpected("list of stocks", &response))
    }

    pub async fn get_portfolio(&mut self) -> Result<BTreeMap<String, i32>, ApiError> {
        let response = accepted(self.send_get_portfolio().await?)?;
        response
            .data
            .as_portfolio()
            .ok_or_else(|| unexpected("map of quantities", &response))
    }

    pub async fn buy(&mut self, symbol: impl Into<String>, quantity: i32) -> Result<(), ApiError> {
        accepted(self.send_buy(symbol, quantity, None).await?).map(drop)
    }

    pub async fn buy_with(
        &mut self,
        symbol: impl Into<String>,
        quantity: i32,
        attachment: OrderAttachment,
    ) -> Result<(), ApiError> {
        accepted(self.send_buy(symbol, quantity, Some(attachment)).await?).map(drop)
    }

    pub async fn sell(&mut self, symbol: impl Into<String>, quantity: i32) -> Result<(), ApiError> {
        accepted(self.send_sell(symbol, quantity).await?).map(drop)
    }

    /// Current positions priced against the current listing.
    ///
    /// Two exchanges: portfolio, then stocks. See
    /// [`join_holdings`](crate::join_holdings) for how they're combined.
    pub async fn holdings(&mut self) -> Result<Vec<Holding>, ApiError> {
        let portfolio = self.get_portfolio().await?;
        let stocks = self.get_stocks().await?;
        Ok(join_holdings(&portfolio, &stocks))
    }

    /// Closes the connection. Never fails.
    ///
    /// A trailing message pushed by the server on the way out is decoded
    /// and logged, then discarded. The session token is kept, so a later
    /// call reconnects and carries on.
    pub async fn disconnect(&mut self) {
        match self.connection.disconnect().await {
            Some(frame) => match self.codec.decode_response(&frame) {
                Ok(response) => {
                    tracing::info!(
                        success = response.success,
                        server_message = %response.message,
                        "received response on disconnect"
                    );
                    if self.config.debug {
                        trace::incoming(&response);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "undecodable trailing frame on disconnect"),
            },
            None => tracing::info!("disconnected with no trailing data"),
        }
    }
}

fn accepted(response: Response) -> Result<Response, ApiError> {
    if response.success {
        Ok(response)
    } else {
        Err(ApiError::Rejected {
            message: response.message,
        })
    }
}

fn unexpected(expected: &'static str, response: &Response) -> ApiError {
    ApiError::UnexpectedData {
        expected,
        found: response.data.type_name(),
    }
}
