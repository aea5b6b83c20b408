//! Wire protocol for Tradewire.
//!
//! This crate defines the "language" the client and the trading server
//! speak:
//!
//! - **Types** ([`Request`], [`Response`], [`Stock`], [`Value`],
//!   [`OrderAttachment`]): the messages that travel on the wire.
//! - **Codecs** ([`Codec`] trait, [`BinaryCodec`], [`JsonCodec`]): how
//!   those messages become frame payloads and back.
//! - **Errors** ([`ProtocolError`], [`DecodeError`]): what can go wrong
//!   while encoding or decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and session
//! (token stamping). It doesn't know about sockets or what a token means;
//! it only knows how to turn messages into bytes.
//!
//! ```text
//! Transport (frames) → Protocol (Request/Response) → Session (token)
//! ```

mod binary;
mod codec;
mod error;
mod types;
mod value;

pub use binary::{BinaryCodec, MAX_DEPTH, tag};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{DecodeError, ProtocolError};
pub use types::{
    OrderAttachment, OrderMetadata, Request, RequestBody, RequestKind, Response,
    Stock,
};
pub use value::Value;
