//! Transfer Engine
//!
//! Chunked streaming of file contents on a connection whose control
//! handshake has already completed.
//!
//! ## Chunk Stream
//! ```text
//! ┌──────────┬──────────────┐┌──────────┬──────────────┐     ┌──────────┬─────────┐
//! │ Len (4)  │ chunk_size B ││ Len (4)  │ chunk_size B │ ... │ Len (4)  │ rest    │
//! └──────────┴──────────────┘└──────────┴──────────────┘     └──────────┴─────────┘
//! ```
//!
//! The stream carries no terminator: the receiver stops once the byte count
//! announced in the handshake has arrived.
//!
//! ## Responsibilities
//! - Sender: split a file into chunk frames, report progress
//! - Receiver: reassemble chunks, detect truncation and overrun
//! - Running MD5 digest on both sides for integrity verification

mod checksum;
mod progress;
mod receiver;
mod sender;

pub use checksum::{digest_bytes, digest_reader, file_digest, verify_digest, Digest};
pub use progress::{ProgressSink, TransferState};
pub use receiver::{discard_partial, receive_file, receive_into, receive_stream};
pub use sender::{send_file, send_stream};
