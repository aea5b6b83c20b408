//! Codec trait and the JSON implementation.
//!
//! A "codec" (coder/decoder) turns a [`Request`] into the bytes of one
//! frame, and one frame back into a [`Response`]. The transport never
//! looks inside those bytes, and the client never looks at raw bytes: the
//! codec is the only place the wire format lives.
//!
//! Two implementations ship:
//! - [`BinaryCodec`](crate::BinaryCodec): the compact tagged format the
//!   trading server speaks (default).
//! - [`JsonCodec`]: same message shapes as JSON text, handy against a
//!   debugging peer or when eyeballing captures.
//!
//! The trait is symmetric. Clients use `encode_request`/`decode_response`;
//! the other two methods exist for the server side of the conversation,
//! which the test harness plays.

use crate::{ProtocolError, Request, Response};

/// Converts protocol messages to and from frame payloads.
///
/// `Send + Sync + 'static` so one codec value can live inside a client
/// that's moved between Tokio tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a request into one frame payload.
    ///
    /// # Errors
    /// [`ProtocolError::Encode`] if a field can't be represented
    /// (e.g. a string longer than its length prefix allows).
    fn encode_request(&self, request: &Request) -> Result<Vec<u8>, ProtocolError>;

    /// Parses one frame payload as a request.
    fn decode_request(&self, data: &[u8]) -> Result<Request, ProtocolError>;

    /// Serializes a response into one frame payload.
    fn encode_response(&self, response: &Response) -> Result<Vec<u8>, ProtocolError>;

    /// Parses one frame payload as a response.
    ///
    /// The concrete type of `data` comes from the tag embedded in the
    /// bytes, not from which request the caller sent.
    ///
    /// # Errors
    /// A decode error on truncated input, an unknown tag, or a malformed
    /// field sequence.
    fn decode_response(&self, data: &[u8]) -> Result<Response, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Polymorphic fields keep their tags in JSON too (`"type": "Double"`),
/// and unknown tags fail the same way: serde rejects a variant name the
/// enum doesn't declare.
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use tradewire_protocol::{Codec, JsonCodec, Response, Value};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode_response(&Response::ok(1000.0)).unwrap();
/// let decoded = codec.decode_response(&bytes).unwrap();
/// assert_eq!(decoded.data, Value::Double(1000.0));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode_request(&self, request: &Request) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(request).map_err(ProtocolError::JsonEncode)
    }

    fn decode_request(&self, data: &[u8]) -> Result<Request, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::JsonDecode)
    }

    fn encode_response(&self, response: &Response) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(response).map_err(ProtocolError::JsonEncode)
    }

    fn decode_response(&self, data: &[u8]) -> Result<Response, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::JsonDecode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{OrderAttachment, OrderMetadata, Stock, Value};

    #[test]
    fn test_json_request_survives_codec() {
        let codec = JsonCodec;
        let req = Request::buy_with(
            "TSLA",
            i32::MIN,
            OrderAttachment::Metadata(OrderMetadata {
                client_order_id: "ord-1".into(),
                note: "boundary".into(),
            }),
        )
        .with_token("tok-123");

        let bytes = codec.encode_request(&req).unwrap();
        assert_eq!(codec.decode_request(&bytes).unwrap(), req);
    }

    #[test]
    fn test_json_response_keeps_stock_list_shape() {
        let codec = JsonCodec;
        let resp = Response::ok(vec![
            Stock::new("AAPL", "Apple Inc.", 189.25),
            Stock::new("TSLA", "Tesla Inc.", 250.5),
        ]);

        let bytes = codec.encode_response(&resp).unwrap();
        let decoded = codec.decode_response(&bytes).unwrap();
        assert_eq!(decoded.data.as_stocks().map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_json_response_portfolio_map() {
        let codec = JsonCodec;
        let mut portfolio = BTreeMap::new();
        portfolio.insert("TSLA".to_string(), 5);
        let bytes = codec
            .encode_response(&Response::ok(portfolio.clone()))
            .unwrap();
        let decoded = codec.decode_response(&bytes).unwrap();
        assert_eq!(decoded.data.as_portfolio(), Some(portfolio));
    }

    #[test]
    fn test_json_unknown_value_type_is_rejected() {
        let codec = JsonCodec;
        let raw = br#"{"success":true,"message":"","data":{"type":"Exploit","value":{}}}"#;
        let err = codec.decode_response(raw).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_json_unknown_attachment_type_is_rejected() {
        let codec = JsonCodec;
        let raw = br#"{"session_token":"t","kind":"Buy","symbol":"TSLA","quantity":1,"attachment":{"type":"User","name":"x"}}"#;
        assert!(codec.decode_request(raw).is_err());
    }

    #[test]
    fn test_json_missing_data_defaults_to_null() {
        let codec = JsonCodec;
        let decoded = codec
            .decode_response(br#"{"success":false,"message":"bad token"}"#)
            .unwrap();
        assert_eq!(decoded.data, Value::Null);
    }
}
