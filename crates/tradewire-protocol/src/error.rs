//! Error types for the protocol layer.
//!
//! Each crate in Tradewire defines its own error enum. A `ProtocolError`
//! always means the bytes themselves were the problem (a value that could
//! not be written, or a frame that could not be read back). It never means
//! the network failed or the peer said "no".

/// Why a frame could not be decoded.
///
/// Decoding is strict: the first byte that doesn't fit the expected shape
/// ends the attempt. Nothing is guessed or skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The frame ended before a field was complete.
    #[error("truncated frame: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A tag byte outside the closed set accepted at this position.
    ///
    /// `context` names the position (e.g. "value", "attachment") so logs
    /// show which part of the frame carried the bad tag.
    #[error("unknown {context} tag 0x{tag:02x}")]
    UnknownTag { context: &'static str, tag: u8 },

    /// The bytes parse, but the field sequence breaks a structural rule
    /// (invalid UTF-8, a bool that isn't 0 or 1, duplicate map keys).
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// A complete message was read but bytes were left over.
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    /// Values nested deeper than the codec allows.
    #[error("value nesting exceeds {0} levels")]
    TooDeep(usize),
}

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A value could not be written in the wire format
    /// (e.g. a string or list too long for its length prefix).
    #[error("encode failed: {0}")]
    Encode(String),

    /// The binary codec rejected a frame.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// The JSON codec could not serialize a value.
    #[cfg(feature = "json")]
    #[error("json encode failed: {0}")]
    JsonEncode(serde_json::Error),

    /// The JSON codec could not parse a frame, or it named an
    /// unknown variant.
    #[cfg(feature = "json")]
    #[error("json decode failed: {0}")]
    JsonDecode(serde_json::Error),
}

impl ProtocolError {
    /// Returns `true` if this error came from reading bytes rather than
    /// writing them.
    pub fn is_decode(&self) -> bool {
        match self {
            Self::Decode(_) => true,
            #[cfg(feature = "json")]
            Self::JsonDecode(_) => true,
            _ => false,
        }
    }
}
