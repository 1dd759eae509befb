//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Len (4)  │         Payload             │
//! └──────────┴─────────────────────────────┘
//! ```
//!
//! Control messages are JSON payloads; chunk frames carry raw file bytes
//! with the same prefix and are only sent during a transfer.
//!
//! ### Download
//! ```text
//! C → S  {command:"download", filename}
//! S → C  {status:"success", size, md5}  |  {status:"error", message}
//! C → S  {status:"ready"}
//! S → C  N × chunk (totaling size)
//! ```
//!
//! ### Upload
//! ```text
//! C → S  {command:"upload", filename, size}
//! S → C  {status:"ready"}  |  {status:"error", message}
//! C → S  N × chunk (totaling size)
//! S → C  {status:"success", md5}  |  {status:"error", message}
//! ```

mod codec;
mod frame;
mod message;

pub use codec::{
    decode_request, decode_response, encode_request, encode_response, read_request,
    read_response, write_request, write_response,
};
pub use frame::{
    encode_frame, read_frame, read_frame_len, read_payload, write_frame, LENGTH_PREFIX_SIZE,
};
pub use message::{FileMeta, FileRecord, Request, Response, ServerInfo, SuccessBody};
