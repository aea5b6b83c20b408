//! The binary wire format.
//!
//! Every multi-byte number is big-endian. Strings, lists and maps carry a
//! `u32` length (or element count) prefix.
//!
//! ```text
//! Request:   [kind u8][token str][kind fields...]
//!            Buy fields: [symbol str][quantity i32][attachment tag u8][attachment...]
//! Response:  [0x80][success u8][message str][data: tag u8 + value bytes]
//! ```
//!
//! Polymorphic fields are written as a type tag followed by that type's
//! own encoding. The decoder dispatches on the tag it reads, so it builds
//! exactly the shape the sender wrote, but only from the closed tag sets
//! in [`tag`]. Anything else is [`DecodeError::UnknownTag`].

use std::collections::BTreeMap;

use crate::{
    Codec, DecodeError, OrderAttachment, OrderMetadata, ProtocolError, Request,
    RequestBody, Response, Stock, Value,
};

/// Deepest list/map nesting either direction will handle.
pub const MAX_DEPTH: usize = 32;

/// Tag bytes, grouped by the position they may appear in.
pub mod tag {
    /// First byte of a request frame.
    pub mod request {
        pub const LOGIN: u8 = 0x01;
        pub const GET_BALANCE: u8 = 0x02;
        pub const GET_PORTFOLIO: u8 = 0x03;
        pub const GET_STOCKS: u8 = 0x04;
        pub const BUY: u8 = 0x05;
        pub const SELL: u8 = 0x06;
    }

    /// First byte of a response frame.
    pub const RESPONSE: u8 = 0x80;

    /// Type tags for [`Value`](crate::Value).
    pub mod value {
        pub const NULL: u8 = 0x00;
        pub const BOOL: u8 = 0x01;
        pub const INT: u8 = 0x02;
        pub const LONG: u8 = 0x03;
        pub const DOUBLE: u8 = 0x04;
        pub const STR: u8 = 0x05;
        pub const LIST: u8 = 0x06;
        pub const MAP: u8 = 0x07;
        pub const STOCK: u8 = 0x10;
    }

    /// Type tags for a Buy's [`OrderAttachment`](crate::OrderAttachment).
    pub mod attachment {
        pub const NONE: u8 = 0x00;
        pub const MEMO: u8 = 0x01;
        pub const METADATA: u8 = 0x02;
    }
}

/// The [`Codec`] the trading server speaks.
///
/// ## Example
///
/// ```rust
/// use tradewire_protocol::{BinaryCodec, Codec, Request};
///
/// let codec = BinaryCodec;
/// let req = Request::buy("TSLA", i32::MIN).with_token("tok-123");
/// let bytes = codec.encode_request(&req).unwrap();
/// assert_eq!(codec.decode_request(&bytes).unwrap(), req);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl Codec for BinaryCodec {
    fn encode_request(&self, request: &Request) -> Result<Vec<u8>, ProtocolError> {
        let mut w = FrameWriter::default();
        let kind_tag = match &request.body {
            RequestBody::Login { .. } => tag::request::LOGIN,
            RequestBody::GetBalance => tag::request::GET_BALANCE,
            RequestBody::GetPortfolio => tag::request::GET_PORTFOLIO,
            RequestBody::GetStocks => tag::request::GET_STOCKS,
            RequestBody::Buy { .. } => tag::request::BUY,
            RequestBody::Sell { .. } => tag::request::SELL,
        };
        w.put_u8(kind_tag);
        w.put_str(&request.session_token)?;

        match &request.body {
            RequestBody::Login { username, password } => {
                w.put_str(username)?;
                w.put_str(password)?;
            }
            RequestBody::GetBalance
            | RequestBody::GetPortfolio
            | RequestBody::GetStocks => {}
            RequestBody::Buy {
                symbol,
                quantity,
                attachment,
            } => {
                w.put_str(symbol)?;
                w.put_i32(*quantity);
                w.put_attachment(attachment.as_ref())?;
            }
            RequestBody::Sell { symbol, quantity } => {
                w.put_str(symbol)?;
                w.put_i32(*quantity);
            }
        }
        Ok(w.finish())
    }

    fn decode_request(&self, data: &[u8]) -> Result<Request, ProtocolError> {
        let mut r = FrameReader::new(data);
        let kind_tag = r.u8()?;
        let session_token = r.string()?;

        let body = match kind_tag {
            tag::request::LOGIN => RequestBody::Login {
                username: r.string()?,
                password: r.string()?,
            },
            tag::request::GET_BALANCE => RequestBody::GetBalance,
            tag::request::GET_PORTFOLIO => RequestBody::GetPortfolio,
            tag::request::GET_STOCKS => RequestBody::GetStocks,
            tag::request::BUY => RequestBody::Buy {
                symbol: r.string()?,
                quantity: r.i32()?,
                attachment: r.attachment()?,
            },
            tag::request::SELL => RequestBody::Sell {
                symbol: r.string()?,
                quantity: r.i32()?,
            },
            other => {
                return Err(DecodeError::UnknownTag {
                    context: "request kind",
                    tag: other,
                }
                .into());
            }
        };
        r.finish()?;

        Ok(Request {
            session_token,
            body,
        })
    }

    fn encode_response(&self, response: &Response) -> Result<Vec<u8>, ProtocolError> {
        let mut w = FrameWriter::default();
        w.put_u8(tag::RESPONSE);
        w.put_bool(response.success);
        w.put_str(&response.message)?;
        w.put_value(&response.data, 1)?;
        Ok(w.finish())
    }

    fn decode_response(&self, data: &[u8]) -> Result<Response, ProtocolError> {
        let mut r = FrameReader::new(data);
        match r.u8()? {
            tag::RESPONSE => {}
            other => {
                return Err(DecodeError::UnknownTag {
                    context: "response",
                    tag: other,
                }
                .into());
            }
        }
        let success = r.bool()?;
        let message = r.string()?;
        let data = r.value(1)?;
        r.finish()?;

        Ok(Response {
            success,
            message,
            data,
        })
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FrameWriter {
    buf: Vec<u8>,
}

impl FrameWriter {
    fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn put_bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    fn put_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn put_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn put_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn put_len(&mut self, len: usize, what: &str) -> Result<(), ProtocolError> {
        let len = u32::try_from(len).map_err(|_| {
            ProtocolError::Encode(format!("{what} length {len} exceeds u32::MAX"))
        })?;
        self.buf.extend_from_slice(&len.to_be_bytes());
        Ok(())
    }

    fn put_str(&mut self, s: &str) -> Result<(), ProtocolError> {
        self.put_len(s.len(), "string")?;
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    fn put_stock(&mut self, stock: &Stock) -> Result<(), ProtocolError> {
        self.put_str(&stock.symbol)?;
        self.put_str(&stock.name)?;
        self.put_f64(stock.price);
        Ok(())
    }

    fn put_value(&mut self, value: &Value, depth: usize) -> Result<(), ProtocolError> {
        if depth > MAX_DEPTH {
            return Err(ProtocolError::Encode(format!(
                "value nesting exceeds {MAX_DEPTH} levels"
            )));
        }
        match value {
            Value::Null => self.put_u8(tag::value::NULL),
            Value::Bool(b) => {
                self.put_u8(tag::value::BOOL);
                self.put_bool(*b);
            }
            Value::Int(i) => {
                self.put_u8(tag::value::INT);
                self.put_i32(*i);
            }
            Value::Long(l) => {
                self.put_u8(tag::value::LONG);
                self.put_i64(*l);
            }
            Value::Double(d) => {
                self.put_u8(tag::value::DOUBLE);
                self.put_f64(*d);
            }
            Value::Str(s) => {
                self.put_u8(tag::value::STR);
                self.put_str(s)?;
            }
            Value::List(items) => {
                self.put_u8(tag::value::LIST);
                self.put_len(items.len(), "list")?;
                for item in items {
                    self.put_value(item, depth + 1)?;
                }
            }
            Value::Map(entries) => {
                self.put_u8(tag::value::MAP);
                self.put_len(entries.len(), "map")?;
                for (key, item) in entries {
                    self.put_str(key)?;
                    self.put_value(item, depth + 1)?;
                }
            }
            Value::Stock(stock) => {
                self.put_u8(tag::value::STOCK);
                self.put_stock(stock)?;
            }
        }
        Ok(())
    }

    fn put_attachment(
        &mut self,
        attachment: Option<&OrderAttachment>,
    ) -> Result<(), ProtocolError> {
        match attachment {
            None => self.put_u8(tag::attachment::NONE),
            Some(OrderAttachment::Memo { text }) => {
                self.put_u8(tag::attachment::MEMO);
                self.put_str(text)?;
            }
            Some(OrderAttachment::Metadata(meta)) => {
                self.put_u8(tag::attachment::METADATA);
                self.put_str(&meta.client_order_id)?;
                self.put_str(&meta.note)?;
            }
        }
        Ok(())
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

struct FrameReader<'a> {
    buf: &'a [u8],
}

impl<'a> FrameReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.buf.len() < n {
            return Err(DecodeError::Truncated {
                needed: n,
                remaining: self.buf.len(),
            });
        }
        let (head, rest) = self.buf.split_at(n);
        self.buf = rest;
        Ok(head)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.array::<1>()?[0])
    }

    fn bool(&mut self) -> Result<bool, DecodeError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::Malformed(format!(
                "invalid bool byte 0x{other:02x}"
            ))),
        }
    }

    fn i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    fn i64(&mut self) -> Result<i64, DecodeError> {
        Ok(i64::from_be_bytes(self.array()?))
    }

    fn f64(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_be_bytes(self.array()?))
    }

    fn len(&mut self) -> Result<usize, DecodeError> {
        Ok(u32::from_be_bytes(self.array()?) as usize)
    }

    fn string(&mut self) -> Result<String, DecodeError> {
        let len = self.len()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| DecodeError::Malformed(format!("invalid UTF-8 in string: {e}")))
    }

    fn stock(&mut self) -> Result<Stock, DecodeError> {
        Ok(Stock {
            symbol: self.string()?,
            name: self.string()?,
            price: self.f64()?,
        })
    }

    fn value(&mut self, depth: usize) -> Result<Value, DecodeError> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::TooDeep(MAX_DEPTH));
        }
        let value = match self.u8()? {
            tag::value::NULL => Value::Null,
            tag::value::BOOL => Value::Bool(self.bool()?),
            tag::value::INT => Value::Int(self.i32()?),
            tag::value::LONG => Value::Long(self.i64()?),
            tag::value::DOUBLE => Value::Double(self.f64()?),
            tag::value::STR => Value::Str(self.string()?),
            tag::value::LIST => {
                let count = self.len()?;
                // Every element is at least one tag byte.
                let mut items = Vec::with_capacity(count.min(self.buf.len()));
                for _ in 0..count {
                    items.push(self.value(depth + 1)?);
                }
                Value::List(items)
            }
            tag::value::MAP => {
                let count = self.len()?;
                let mut entries = BTreeMap::new();
                for _ in 0..count {
                    let key = self.string()?;
                    let item = self.value(depth + 1)?;
                    if entries.insert(key.clone(), item).is_some() {
                        return Err(DecodeError::Malformed(format!(
                            "duplicate map key {key:?}"
                        )));
                    }
                }
                Value::Map(entries)
            }
            tag::value::STOCK => Value::Stock(self.stock()?),
            other => {
                return Err(DecodeError::UnknownTag {
                    context: "value",
                    tag: other,
                });
            }
        };
        Ok(value)
    }

    fn attachment(&mut self) -> Result<Option<OrderAttachment>, DecodeError> {
        match self.u8()? {
            tag::attachment::NONE => Ok(None),
            tag::attachment::MEMO => Ok(Some(OrderAttachment::Memo {
                text: self.string()?,
            })),
            tag::attachment::METADATA => {
                Ok(Some(OrderAttachment::Metadata(OrderMetadata {
                    client_order_id: self.string()?,
                    note: self.string()?,
                })))
            }
            other => Err(DecodeError::UnknownTag {
                context: "attachment",
                tag: other,
            }),
        }
    }

    fn finish(self) -> Result<(), DecodeError> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::TrailingBytes(self.buf.len()))
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
