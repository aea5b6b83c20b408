//! Frame I/O: one message per frame, length-prefixed.
//!
//! ```text
//! ┌──────────────┬───────────────────────┐
//! │ length u32 BE│ payload (length bytes)│
//! └──────────────┴───────────────────────┘
//! ```
//!
//! The transport never looks inside the payload; that's the codec's job.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::TransportError;

/// Size of the length prefix.
pub const HEADER_LEN: usize = 4;

/// Default cap on a single frame's payload (16 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Reads one frame.
///
/// Returns `Ok(None)` when the peer went away before sending a single
/// byte of the frame, whether it closed cleanly (EOF) or the socket
/// reported a hang-up (see [`is_hang_up`]). A close after the first byte
/// is a [`TransportError::ReceiveFailed`] with `UnexpectedEof`: the peer
/// abandoned a message halfway.
pub async fn read_frame<R>(
    reader: &mut R,
    max_size: usize,
) -> Result<Option<Vec<u8>>, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        let n = match reader.read(&mut len_buf[filled..]).await {
            Ok(n) => n,
            Err(e) if filled == 0 && is_hang_up(&e) => return Ok(None),
            Err(e) => return Err(TransportError::ReceiveFailed(e)),
        };
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(TransportError::ReceiveFailed(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed inside frame header",
            )));
        }
        filled += n;
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > max_size {
        return Err(TransportError::FrameTooLarge {
            size: len,
            max: max_size,
        });
    }

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(TransportError::ReceiveFailed)?;
    Ok(Some(payload))
}

/// `true` for the I/O errors a socket reports when the peer hung up
/// rather than something breaking locally.
///
/// A server that drops an accepted connection while a request sits unread
/// in its buffer answers with a TCP reset, so the client sees
/// `ConnectionReset` where a tidier peer would have produced a plain EOF.
pub fn is_hang_up(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}

/// Writes one frame and flushes.
///
/// Header and payload go out in a single write so a peer never sees a
/// header without at least the start of its payload queued behind it.
pub async fn write_frame<W>(
    writer: &mut W,
    payload: &[u8],
    max_size: usize,
) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let too_large = || TransportError::FrameTooLarge {
        size: payload.len(),
        max: max_size,
    };
    if payload.len() > max_size {
        return Err(too_large());
    }
    let len = u32::try_from(payload.len()).map_err(|_| too_large())?;

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(payload);

    writer
        .write_all(&frame)
        .await
        .map_err(TransportError::SendFailed)?;
    writer.flush().await.map_err(TransportError::SendFailed)?;
    Ok(())
}
