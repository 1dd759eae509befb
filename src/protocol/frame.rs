//! Framing layer
//!
//! Every unit on the wire, control message or chunk of file data, is a
//! frame:
//!
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Len (4)  │         Payload             │
//! └──────────┴─────────────────────────────┘
//! ```
//!
//! `Len` is an unsigned big-endian byte count. No upper bound is enforced
//! here; size limits belong to the transfer layer.

use std::io::{ErrorKind, Read, Write};

use bytes::{Bytes, BytesMut};

use crate::error::{Result, XferError};

/// Length prefix size in bytes
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Encode a payload into a single frame buffer
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>> {
    let len = frame_len(payload)?;
    let mut frame = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Write one frame and flush
///
/// The prefix and payload are both written before this returns, so no other
/// frame can land between them on the same writer.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let len = frame_len(payload)?;
    writer
        .write_all(&len.to_be_bytes())
        .and_then(|_| writer.write_all(payload))
        .and_then(|_| writer.flush())
        .map_err(XferError::Connection)
}

/// Read one frame
///
/// Returns `Ok(None)` if the peer closed the stream cleanly before the first
/// length byte. A close anywhere after that is `ConnectionTruncated`.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Bytes>> {
    let len = match read_frame_len(reader)? {
        Some(len) => len,
        None => return Ok(None),
    };

    let mut payload = BytesMut::zeroed(len);
    read_payload(reader, &mut payload)?;
    Ok(Some(payload.freeze()))
}

/// Read only the length prefix of the next frame
///
/// The payload is left unread, so the caller can decide whether to accept a
/// frame of that size before allocating for it. `Ok(None)` means a clean
/// close before the first length byte.
pub fn read_frame_len<R: Read>(reader: &mut R) -> Result<Option<usize>> {
    let mut header = [0u8; LENGTH_PREFIX_SIZE];
    let got = read_full(reader, &mut header)?;
    if got == 0 {
        return Ok(None);
    }
    if got < LENGTH_PREFIX_SIZE {
        return Err(XferError::ConnectionTruncated {
            expected: LENGTH_PREFIX_SIZE as u64,
            received: got as u64,
        });
    }
    Ok(Some(u32::from_be_bytes(header) as usize))
}

/// Fill `buf` with payload bytes; a close before it is full is `ConnectionTruncated`
pub fn read_payload<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let got = read_full(reader, buf)?;
    if got < buf.len() {
        return Err(XferError::ConnectionTruncated {
            expected: buf.len() as u64,
            received: got as u64,
        });
    }
    Ok(())
}

fn frame_len(payload: &[u8]) -> Result<u32> {
    u32::try_from(payload.len()).map_err(|_| {
        XferError::Protocol(format!(
            "frame payload too large: {} bytes (max {})",
            payload.len(),
            u32::MAX
        ))
    })
}

/// Fill `buf` from the reader, stopping early only at end of stream
///
/// Returns the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(XferError::Connection(e)),
        }
    }
    Ok(filled)
}
