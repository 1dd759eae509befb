//! Sender role
//!
//! Splits a source into chunk frames. Used by the server for downloads and
//! by the client for uploads.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::Path;

use bytes::BytesMut;

use super::progress::{ProgressSink, TransferState};
use crate::error::{Result, XferError};
use crate::protocol::write_frame;

/// Stream `total_size` bytes from `source` as chunk frames
///
/// Every chunk is exactly `chunk_size` bytes except the last. A write
/// failure stops the transfer at once; nothing is retried. Returns the hex
/// digest of the bytes sent.
pub fn send_stream<R, W, P>(
    source: &mut R,
    writer: &mut W,
    total_size: u64,
    chunk_size: usize,
    progress: &mut P,
) -> Result<String>
where
    R: Read,
    W: Write,
    P: ProgressSink + ?Sized,
{
    if chunk_size == 0 {
        return Err(XferError::Config("chunk_size must be greater than 0".to_string()));
    }

    let mut state = TransferState::new(total_size);
    let mut buf = BytesMut::zeroed(chunk_size);

    while !state.is_complete() {
        let want = state.remaining().min(chunk_size as u64) as usize;
        let chunk = &mut buf[..want];
        fill_chunk(source, chunk, &state)?;

        write_frame(writer, chunk)?;
        state.record(chunk);
        progress.report(state.percent());
    }

    tracing::trace!("Sent {} bytes", state.bytes_moved());
    Ok(state.finish())
}

/// Stream a file from disk as chunk frames
pub fn send_file<W, P>(
    path: &Path,
    writer: &mut W,
    total_size: u64,
    chunk_size: usize,
    progress: &mut P,
) -> Result<String>
where
    W: Write,
    P: ProgressSink + ?Sized,
{
    let file = File::open(path)?;
    let mut source = BufReader::with_capacity(chunk_size.max(1), file);
    send_stream(&mut source, writer, total_size, chunk_size, progress)
}

/// Read exactly `chunk.len()` bytes from the source
///
/// A source shorter than announced is a local failure: the peer was promised
/// more bytes than exist.
fn fill_chunk<R: Read>(source: &mut R, chunk: &mut [u8], state: &TransferState) -> Result<()> {
    let mut filled = 0;
    while filled < chunk.len() {
        match source.read(&mut chunk[filled..]) {
            Ok(0) => {
                return Err(XferError::Io(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    format!(
                        "source ended after {} of {} bytes",
                        state.bytes_moved() + filled as u64,
                        state.total_size()
                    ),
                )))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(XferError::Io(e)),
        }
    }
    Ok(())
}
