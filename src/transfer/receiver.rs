//! Receiver role
//!
//! Reads chunk frames until the announced size has arrived. Used by the
//! server for uploads and by the client for downloads.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use bytes::BytesMut;

use super::progress::{ProgressSink, TransferState};
use crate::error::{Result, XferError};
use crate::protocol::{read_frame_len, read_payload};

/// Largest slice of a chunk held in memory at once
const RECEIVE_BUFFER_SIZE: usize = 64 * 1024;

/// Receive `total_size` bytes of chunk frames into `sink`
///
/// Terminates when the byte count matches. A close before that is
/// `ConnectionTruncated`. A chunk header announcing more than the bytes
/// still owed is `ChunkLengthMismatch`; it is rejected before any of its
/// payload is read, so the stream is left misaligned and the error is fatal.
/// Payloads are streamed through a fixed buffer, never held whole.
///
/// If writing to `sink` fails, the remaining chunks are still read and
/// discarded so the stream stays aligned for the next message, then the
/// write error is returned.
///
/// Returns the hex digest of the bytes received.
pub fn receive_stream<R, W, P>(
    reader: &mut R,
    sink: &mut W,
    total_size: u64,
    progress: &mut P,
) -> Result<String>
where
    R: Read,
    W: Write,
    P: ProgressSink + ?Sized,
{
    let mut state = TransferState::new(total_size);
    let mut write_error: Option<std::io::Error> = None;
    let buf_len = total_size.min(RECEIVE_BUFFER_SIZE as u64) as usize;
    let mut buf = BytesMut::zeroed(buf_len);

    while !state.is_complete() {
        let chunk_len = match read_frame_len(reader)? {
            Some(len) => len as u64,
            None => {
                return Err(XferError::ConnectionTruncated {
                    expected: total_size,
                    received: state.bytes_moved(),
                })
            }
        };

        if chunk_len > state.remaining() {
            return Err(XferError::ChunkLengthMismatch {
                expected: total_size,
                delivered: state.bytes_moved() + chunk_len,
            });
        }

        let mut left = chunk_len as usize;
        while left > 0 {
            let piece = &mut buf[..left.min(buf_len)];
            if let Err(e) = read_payload(reader, piece) {
                return Err(match e {
                    XferError::ConnectionTruncated { received, .. } => {
                        XferError::ConnectionTruncated {
                            expected: total_size,
                            received: state.bytes_moved() + received,
                        }
                    }
                    other => other,
                });
            }

            if write_error.is_none() {
                if let Err(e) = sink.write_all(piece) {
                    tracing::warn!(
                        "Write failed after {} bytes, draining remaining chunks: {}",
                        state.bytes_moved(),
                        e
                    );
                    write_error = Some(e);
                }
            }

            left -= piece.len();
            state.record(piece);
        }

        if write_error.is_none() {
            progress.report(state.percent());
        }
    }

    if let Some(e) = write_error {
        return Err(XferError::Io(e));
    }
    sink.flush()?;

    Ok(state.finish())
}

/// Receive chunk frames into a new file at `path`
///
/// The destination is created (or truncated) first. See [`receive_into`].
pub fn receive_file<R, P>(
    reader: &mut R,
    path: &Path,
    total_size: u64,
    progress: &mut P,
) -> Result<String>
where
    R: Read,
    P: ProgressSink + ?Sized,
{
    let file = File::create(path)?;
    receive_into(reader, file, path, total_size, progress)
}

/// Receive chunk frames into an already opened destination file
///
/// `path` must name `file`; it is removed again if the transfer fails for
/// any reason, so a partial file never remains under the final name.
pub fn receive_into<R, P>(
    reader: &mut R,
    file: File,
    path: &Path,
    total_size: u64,
    progress: &mut P,
) -> Result<String>
where
    R: Read,
    P: ProgressSink + ?Sized,
{
    let mut sink = BufWriter::new(file);

    let result = receive_stream(reader, &mut sink, total_size, progress);
    drop(sink);

    if result.is_err() {
        discard_partial(path);
    }
    result
}

/// Remove a partially written destination file
pub fn discard_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove partial file {}: {}", path.display(), e);
        }
    }
}
