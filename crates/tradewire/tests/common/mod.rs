//! A mock trading server for integration tests.
//!
//! Listens on `127.0.0.1:0`, speaks the binary codec, and keeps a tiny
//! market in memory: one account with a balance, a fixed stock listing,
//! and a portfolio. Every decoded request is recorded so tests can assert
//! on exactly what went over the wire.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use rand::Rng;
use tokio::net::{TcpListener, TcpStream};
use tradewire::protocol::{BinaryCodec, Codec, Request, RequestBody, RequestKind, Response, Stock, Value};
use tradewire::transport::frame::DEFAULT_MAX_FRAME_SIZE;
use tradewire::transport::{read_frame, write_frame};
use tradewire::{ClientConfig, TradingClient};

pub const USERNAME: &str = "trader";
pub const PASSWORD: &str = "trader123";
pub const FIXED_TOKEN: &str = "tok-123";
pub const STARTING_BALANCE: f64 = 1000.0;

/// How the server mints session tokens.
#[derive(Debug, Clone, Copy)]
pub enum Tokens {
    Fixed,
    Random,
}

/// Misbehavior injected the first time a given request kind arrives.
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    /// Close the connection without answering.
    HangUp,
    /// Write half a length prefix, then close.
    PartialHeader,
    /// Answer with a well-framed payload that isn't a response.
    Garbage,
}

struct Market {
    tokens: HashSet<String>,
    balance: f64,
    stocks: Vec<Stock>,
    portfolio: BTreeMap<String, i32>,
    fault: Option<(RequestKind, Fault)>,
}

pub struct MockServer {
    pub port: u16,
    requests: Arc<Mutex<Vec<Request>>>,
    market: Arc<Mutex<Market>>,
}

impl MockServer {
    pub async fn start(tokens: Tokens) -> Self {
        Self::start_with(tokens, None).await
    }

    pub async fn start_with(tokens: Tokens, fault: Option<(RequestKind, Fault)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("should bind");
        let port = listener.local_addr().expect("local addr").port();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let market = Arc::new(Mutex::new(Market {
            tokens: HashSet::new(),
            balance: STARTING_BALANCE,
            stocks: vec![
                Stock::new("AAPL", "Apple Inc.", 20.0),
                Stock::new("TSLA", "Tesla Inc.", 25.0),
                Stock::new("GOOG", "Alphabet Inc.", 40.0),
            ],
            portfolio: BTreeMap::new(),
            fault,
        }));

        let (log, state) = (requests.clone(), market.clone());
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, tokens, log.clone(), state.clone()));
            }
        });

        Self {
            port,
            requests,
            market,
        }
    }

    pub fn config(&self) -> ClientConfig {
        TradingClient::builder()
            .host("127.0.0.1")
            .port(self.port)
            .config()
            .clone()
    }

    pub fn client(&self) -> TradingClient {
        TradingClient::builder()
            .host("127.0.0.1")
            .port(self.port)
            .build()
    }

    /// Every request the server decoded, in arrival order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Puts a position straight into the portfolio.
    pub fn grant(&self, symbol: &str, quantity: i32) {
        self.market
            .lock()
            .unwrap()
            .portfolio
            .insert(symbol.to_string(), quantity);
    }
}

async fn serve(
    mut stream: TcpStream,
    tokens: Tokens,
    log: Arc<Mutex<Vec<Request>>>,
    market: Arc<Mutex<Market>>,
) {
    let codec = BinaryCodec;
    while let Ok(Some(frame)) = read_frame(&mut stream, DEFAULT_MAX_FRAME_SIZE).await {
        let request = codec.decode_request(&frame).expect("client sent a valid request");
        log.lock().unwrap().push(request.clone());

        let fault = {
            let mut market = market.lock().unwrap();
            match market.fault {
                Some((kind, fault)) if kind == request.kind() => {
                    market.fault = None;
                    Some(fault)
                }
                _ => None,
            }
        };

        match fault {
            Some(Fault::HangUp) => return,
            Some(Fault::PartialHeader) => {
                use tokio::io::AsyncWriteExt;
                let _ = stream.write_all(&[0, 0]).await;
                return;
            }
            Some(Fault::Garbage) => {
                let _ = write_frame(&mut stream, &[0xff, 0xee], DEFAULT_MAX_FRAME_SIZE).await;
                continue;
            }
            None => {}
        }

        let response = handle(&mut market.lock().unwrap(), tokens, request);
        let payload = codec.encode_response(&response).expect("encodable response");
        if write_frame(&mut stream, &payload, DEFAULT_MAX_FRAME_SIZE).await.is_err() {
            return;
        }
    }
}

fn handle(market: &mut Market, tokens: Tokens, request: Request) -> Response {
    if let RequestBody::Login { username, password } = &request.body {
        if username != USERNAME || password != PASSWORD {
            return Response::failure("Invalid credentials");
        }
        let token = match tokens {
            Tokens::Fixed => FIXED_TOKEN.to_string(),
            Tokens::Random => random_token(),
        };
        market.tokens.insert(token.clone());
        return Response::ok(token).with_message("Login successful");
    }

    if !market.tokens.contains(&request.session_token) {
        return Response::failure("Invalid session token");
    }

    match request.body {
        RequestBody::Login { .. } => unreachable!("handled above"),
        RequestBody::GetBalance => Response::ok(market.balance),
        RequestBody::GetStocks => Response::ok(
            market
                .stocks
                .iter()
                .cloned()
                .map(Value::from)
                .collect::<Vec<_>>(),
        ),
        RequestBody::GetPortfolio => Response::ok(market.portfolio.clone()),
        RequestBody::Buy {
            symbol, quantity, ..
        } => {
            if quantity <= 0 {
                return Response::failure("Invalid quantity");
            }
            let Some(price) = market.price(&symbol) else {
                return Response::failure("Unknown symbol");
            };
            let cost = price * f64::from(quantity);
            if cost > market.balance {
                return Response::failure("Insufficient funds");
            }
            market.balance -= cost;
            *market.portfolio.entry(symbol).or_insert(0) += quantity;
            Response::ok(Value::Null).with_message("Buy executed")
        }
        RequestBody::Sell { symbol, quantity } => {
            let held = market.portfolio.get(&symbol).copied().unwrap_or(0);
            if quantity <= 0 || quantity > held {
                return Response::failure("Insufficient shares");
            }
            let Some(price) = market.price(&symbol) else {
                return Response::failure("Unknown symbol");
            };
            market.balance += price * f64::from(quantity);
            if held == quantity {
                market.portfolio.remove(&symbol);
            } else {
                market.portfolio.insert(symbol, held - quantity);
            }
            Response::ok(Value::Null).with_message("Sell executed")
        }
    }
}

impl Market {
    fn price(&self, symbol: &str) -> Option<f64> {
        self.stocks
            .iter()
            .find(|s| s.symbol == symbol)
            .map(|s| s.price)
    }
}

fn random_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
