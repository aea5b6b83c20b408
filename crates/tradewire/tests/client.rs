//! Integration tests for the trading client against a live TCP peer.
//!
//! Most tests run against the mock market in `common`; the few that need
//! a peer misbehaving in a very specific way script one inline.

mod common;

use std::collections::BTreeMap;
use std::time::Duration;

use common::{FIXED_TOKEN, Fault, MockServer, PASSWORD, Tokens, USERNAME};
use tokio::net::TcpListener;
use tradewire::prelude::*;
use tradewire::protocol::{BinaryCodec, Codec, RequestBody, RequestKind};
use tradewire::transport::frame::DEFAULT_MAX_FRAME_SIZE;
use tradewire::transport::{ConnectionState, TcpConnector, read_frame, write_frame};
use tradewire::{NO_DATA_MESSAGE, portfolio_value};

/// Accepts one connection and answers each request with `reply`. After
/// the last scripted reply, optionally pushes `trailing` unprompted.
async fn scripted_peer<C: Codec>(
    codec: C,
    replies: Vec<Response>,
    trailing: Option<Response>,
) -> (u16, tokio::task::JoinHandle<Vec<Request>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("should bind");
    let port = listener.local_addr().expect("local addr").port();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut seen = Vec::new();
        for reply in replies {
            let frame = read_frame(&mut stream, DEFAULT_MAX_FRAME_SIZE)
                .await
                .unwrap()
                .expect("request frame");
            seen.push(codec.decode_request(&frame).unwrap());
            let payload = codec.encode_response(&reply).unwrap();
            write_frame(&mut stream, &payload, DEFAULT_MAX_FRAME_SIZE)
                .await
                .unwrap();
        }
        if let Some(last) = trailing {
            let payload = codec.encode_response(&last).unwrap();
            write_frame(&mut stream, &payload, DEFAULT_MAX_FRAME_SIZE)
                .await
                .unwrap();
        }
        // Hold the socket until the client hangs up.
        let _ = read_frame(&mut stream, DEFAULT_MAX_FRAME_SIZE).await;
        seen
    });

    (port, handle)
}

// =========================================================================
// Happy path
// =========================================================================

#[tokio::test]
async fn test_trading_session_login_buy_sell_portfolio() {
    let server = MockServer::start(Tokens::Fixed).await;
    let mut client = server.client();

    let token = client.login(USERNAME, PASSWORD).await.unwrap();
    assert_eq!(token, FIXED_TOKEN);
    assert_eq!(client.session_token(), Some(FIXED_TOKEN));
    assert!(client.is_authenticated());

    assert_eq!(client.get_balance().await.unwrap(), 1000.0);

    client.buy("TSLA", 10).await.unwrap();
    client.sell("TSLA", 5).await.unwrap();

    let mut expected = BTreeMap::new();
    expected.insert("TSLA".to_string(), 5);
    assert_eq!(client.get_portfolio().await.unwrap(), expected);
    assert_eq!(client.get_balance().await.unwrap(), 875.0);

    // Every request after login carried the issued token.
    let requests = server.requests();
    assert_eq!(requests.len(), 6);
    assert!(requests[1..].iter().all(|r| r.session_token == FIXED_TOKEN));
}

#[tokio::test]
async fn test_get_stocks_returns_listing_in_server_order() {
    let server = MockServer::start(Tokens::Fixed).await;
    let mut client = server.client();
    client.login(USERNAME, PASSWORD).await.unwrap();

    let stocks = client.get_stocks().await.unwrap();
    let symbols: Vec<_> = stocks.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(symbols, ["AAPL", "TSLA", "GOOG"]);
    assert_eq!(stocks[1].price, 25.0);
}

#[tokio::test]
async fn test_buy_with_attachment_reaches_server() {
    let server = MockServer::start(Tokens::Fixed).await;
    let mut client = server.client();
    client.login(USERNAME, PASSWORD).await.unwrap();

    let memo = OrderAttachment::Memo {
        text: "rebalance".into(),
    };
    client.buy_with("AAPL", 1, memo.clone()).await.unwrap();

    let requests = server.requests();
    match &requests[1].body {
        RequestBody::Buy { attachment, .. } => assert_eq!(attachment.as_ref(), Some(&memo)),
        other => panic!("expected Buy, got {other:?}"),
    }
}

#[tokio::test]
async fn test_holdings_join_portfolio_with_listing() {
    let server = MockServer::start(Tokens::Fixed).await;
    let mut client = server.client();
    client.login(USERNAME, PASSWORD).await.unwrap();

    server.grant("TSLA", 4);
    server.grant("DELISTED", 7);

    let rows = client.holdings().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].symbol, "TSLA");
    assert_eq!(rows[0].name, "Tesla Inc.");
    assert_eq!(rows[0].value, 100.0);
    assert_eq!(portfolio_value(&rows), 100.0);
}

// =========================================================================
// Session token handling
// =========================================================================

#[tokio::test]
async fn test_requests_carry_empty_token_before_login() {
    let server = MockServer::start(Tokens::Random).await;
    let mut client = server.client();

    // The server decides what an unauthenticated request means; the
    // client just reports it.
    let response = client.send_get_balance().await.unwrap();
    assert!(!response.success);
    assert_eq!(response.message, "Invalid session token");

    let token = client.login(USERNAME, PASSWORD).await.unwrap();
    assert_eq!(token.len(), 32);
    client.get_balance().await.unwrap();

    let requests = server.requests();
    assert_eq!(requests[0].session_token, "");
    assert_eq!(requests[1].session_token, "");
    assert_eq!(requests[2].session_token, token);
}

#[tokio::test]
async fn test_send_overwrites_caller_supplied_token() {
    let server = MockServer::start(Tokens::Fixed).await;
    let mut client = server.client();
    client.login(USERNAME, PASSWORD).await.unwrap();

    let response = client
        .send(Request::get_balance().with_token("forged"))
        .await
        .unwrap();
    assert!(response.success);
    assert_eq!(server.requests()[1].session_token, FIXED_TOKEN);
}

#[tokio::test]
async fn test_rejected_login_leaves_session_anonymous() {
    let server = MockServer::start(Tokens::Fixed).await;
    let mut client = server.client();

    let err = client.login(USERNAME, "wrong").await.unwrap_err();
    assert_eq!(err.rejection(), Some("Invalid credentials"));
    assert!(client.session_token().is_none());
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_failed_relogin_keeps_previous_token() {
    let server = MockServer::start(Tokens::Fixed).await;
    let mut client = server.client();
    client.login(USERNAME, PASSWORD).await.unwrap();

    let response = client.send_login(USERNAME, "wrong").await.unwrap();
    assert!(!response.success);
    assert_eq!(client.session_token(), Some(FIXED_TOKEN));
}

#[tokio::test]
async fn test_login_with_non_string_data_is_unexpected() {
    let (port, peer) = scripted_peer(BinaryCodec, vec![Response::ok(42)], None).await;
    let mut client = TradingClient::builder()
        .host("127.0.0.1")
        .port(port)
        .build();

    let err = client.login(USERNAME, PASSWORD).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::UnexpectedData {
            expected: "non-empty string",
            found: "int"
        }
    ));
    assert!(client.session_token().is_none());

    client.disconnect().await;
    peer.await.unwrap();
}

// =========================================================================
// Wire values
// =========================================================================

#[tokio::test]
async fn test_buy_passes_extreme_quantity_through() {
    let server = MockServer::start(Tokens::Fixed).await;
    let mut client = server.client();
    client.login(USERNAME, PASSWORD).await.unwrap();

    let err = client.buy("TSLA", i32::MIN).await.unwrap_err();
    assert_eq!(err.rejection(), Some("Invalid quantity"));

    match &server.requests()[1].body {
        RequestBody::Buy { quantity, .. } => assert_eq!(*quantity, i32::MIN),
        other => panic!("expected Buy, got {other:?}"),
    }
}

#[tokio::test]
async fn test_response_data_keeps_concrete_type() {
    let mut map = BTreeMap::new();
    map.insert("limit".to_string(), Value::Long(i64::MAX));
    map.insert("ratio".to_string(), Value::Double(0.5));
    let data = Value::List(vec![Value::Map(map), Value::Null, Value::Bool(true)]);

    let (port, peer) = scripted_peer(BinaryCodec, vec![Response::ok(data.clone())], None).await;
    let mut client = TradingClient::builder()
        .host("127.0.0.1")
        .port(port)
        .build();

    let response = client.send_get_stocks().await.unwrap();
    assert_eq!(response.data, data);

    client.disconnect().await;
    peer.await.unwrap();
}

// =========================================================================
// Connection failures
// =========================================================================

#[tokio::test]
async fn test_peer_close_yields_failed_response_then_reconnects() {
    let server =
        MockServer::start_with(Tokens::Fixed, Some((RequestKind::GetBalance, Fault::HangUp))).await;
    let mut client = server.client();
    client.login(USERNAME, PASSWORD).await.unwrap();

    let response = client.send_get_balance().await.unwrap();
    assert!(!response.success);
    assert_eq!(response.message, NO_DATA_MESSAGE);
    assert!(response.data.is_null());
    assert_eq!(client.connection_state(), ConnectionState::Unconnected);

    // The token survives the reconnect.
    assert_eq!(client.get_balance().await.unwrap(), 1000.0);
    assert_eq!(server.requests()[2].session_token, FIXED_TOKEN);
}

#[tokio::test]
async fn test_server_hanging_up_on_accept_yields_failed_response() {
    const ROUNDS: usize = 20;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        for _ in 0..ROUNDS + 1 {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);
        }
    });

    let mut client = TradingClient::builder()
        .host("127.0.0.1")
        .port(port)
        .build();

    for round in 0..ROUNDS {
        let response = match client.send_get_balance().await {
            Ok(response) => response,
            Err(e) => panic!("round {round}: expected failed response, got {e}"),
        };
        assert!(!response.success, "round {round}");
        assert!(!response.message.is_empty(), "round {round}");
        assert_eq!(response.message, NO_DATA_MESSAGE);
        assert_eq!(client.connection_state(), ConnectionState::Unconnected);
    }

    // The typed call reports the same thing as a rejection.
    let err = client.get_balance().await.unwrap_err();
    assert_eq!(err.rejection(), Some(NO_DATA_MESSAGE));
}

#[tokio::test]
async fn test_broken_frame_is_fatal_and_next_call_reconnects() {
    let server = MockServer::start_with(
        Tokens::Fixed,
        Some((RequestKind::GetStocks, Fault::PartialHeader)),
    )
    .await;
    let mut client = server.client();
    client.login(USERNAME, PASSWORD).await.unwrap();

    let err = client.send_get_stocks().await.unwrap_err();
    assert!(matches!(err, TradewireError::Transport(_)));
    assert_eq!(client.connection_state(), ConnectionState::Unconnected);

    assert_eq!(client.get_stocks().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_undecodable_reply_keeps_connection() {
    let server =
        MockServer::start_with(Tokens::Fixed, Some((RequestKind::GetBalance, Fault::Garbage)))
            .await;
    let mut client = server.client();
    client.login(USERNAME, PASSWORD).await.unwrap();

    let err = client.send_get_balance().await.unwrap_err();
    assert!(err.is_decode());
    assert_eq!(client.connection_state(), ConnectionState::Connected);

    assert_eq!(client.get_balance().await.unwrap(), 1000.0);
}

#[tokio::test]
async fn test_unreachable_server_is_connect_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut client = TradingClient::builder()
        .host("127.0.0.1")
        .port(port)
        .connect_timeout(Duration::from_secs(2))
        .build();

    let err = client.send_get_balance().await.unwrap_err();
    assert!(err.is_connect());
    assert_eq!(client.connection_state(), ConnectionState::Unconnected);
}

// =========================================================================
// Disconnect
// =========================================================================

#[tokio::test]
async fn test_disconnect_drains_trailing_message() {
    let (port, peer) = scripted_peer(
        BinaryCodec,
        vec![Response::ok("tok-9").with_message("Login successful")],
        Some(Response::failure("Logged out")),
    )
    .await;
    let mut client = TradingClient::builder()
        .host("127.0.0.1")
        .port(port)
        .drain_timeout(Duration::from_secs(2))
        .build();

    client.login(USERNAME, PASSWORD).await.unwrap();
    client.disconnect().await;
    assert_eq!(client.connection_state(), ConnectionState::Unconnected);

    // Disconnect doesn't end the session.
    assert_eq!(client.session_token(), Some("tok-9"));
    peer.await.unwrap();
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let server = MockServer::start(Tokens::Fixed).await;
    let mut client = server.client();

    client.disconnect().await;
    client.login(USERNAME, PASSWORD).await.unwrap();
    client.disconnect().await;
    client.disconnect().await;
    assert_eq!(client.connection_state(), ConnectionState::Unconnected);
}

// =========================================================================
// Configuration
// =========================================================================

#[tokio::test]
async fn test_debug_trace_does_not_change_exchanges() {
    tradewire::logging::init(true);

    let server = MockServer::start(Tokens::Fixed).await;
    let config = server.config();
    let mut client = TradingClient::with_parts(
        ClientConfig {
            debug: true,
            ..config
        },
        BinaryCodec,
        TcpConnector,
    );

    client.login(USERNAME, PASSWORD).await.unwrap();
    assert_eq!(client.get_balance().await.unwrap(), 1000.0);
    assert_eq!(server.requests().len(), 2);
}

#[cfg(feature = "json")]
#[tokio::test]
async fn test_json_codec_client_talks_to_json_peer() {
    use tradewire::protocol::JsonCodec;

    let (port, peer) = scripted_peer(
        JsonCodec,
        vec![Response::ok("json-token"), Response::ok(512.25)],
        None,
    )
    .await;
    let mut client = TradingClient::builder()
        .host("127.0.0.1")
        .port(port)
        .build_with(JsonCodec, TcpConnector);

    assert_eq!(client.login(USERNAME, PASSWORD).await.unwrap(), "json-token");
    assert_eq!(client.get_balance().await.unwrap(), 512.25);

    client.disconnect().await;
    let seen = peer.await.unwrap();
    assert_eq!(seen[1].session_token, "json-token");
}
