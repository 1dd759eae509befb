//! Protocol codec
//!
//! Encoding and decoding of control messages, and stream helpers that run
//! them through the framing layer.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Len (4)  │      JSON object (UTF-8)    │
//! └──────────┴─────────────────────────────┘
//! ```
//!
//! ### Requests
//! - `{"command":"list"}`
//! - `{"command":"upload","filename":..,"size":..}`
//! - `{"command":"download","filename":..}`
//! - `{"command":"delete","filename":..}`
//! - `{"command":"info"}`
//! - `{"command":"disconnect"}`
//!
//! ### Responses
//! - `{"status":"success", ...}`
//! - `{"status":"error","message":..}`
//! - `{"status":"ready"}`

use std::io::{Read, Write};

use serde_json::Value;

use super::frame::{read_frame, write_frame};
use super::{Request, Response};
use crate::error::{Result, XferError};

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to JSON bytes
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(request)?)
}

/// Decode a request from JSON bytes
///
/// Distinguishes an unrecognised `command` (`UnknownCommand`) from a message
/// that is not a command at all or lacks required fields (`Protocol`).
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| XferError::Protocol(format!("malformed message: {}", e)))?;

    let command = value
        .as_object()
        .ok_or_else(|| XferError::Protocol("malformed message: not a JSON object".to_string()))?
        .get("command")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            XferError::Protocol("malformed message: missing `command` field".to_string())
        })?;

    if !Request::COMMAND_NAMES.contains(&command) {
        return Err(XferError::UnknownCommand(command.to_string()));
    }

    let command = command.to_string();
    serde_json::from_value(value)
        .map_err(|e| XferError::Protocol(format!("malformed {} command: {}", command, e)))
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to JSON bytes
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(response)?)
}

/// Decode a response from JSON bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    serde_json::from_slice(bytes)
        .map_err(|e| XferError::Protocol(format!("malformed response: {}", e)))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one framed request
///
/// `Ok(None)` means the peer closed the connection between messages. A frame
/// that arrives intact but does not decode is returned as `Ok(Some(Err(..)))`
/// so the caller can answer it and keep the connection.
pub fn read_request<R: Read>(reader: &mut R) -> Result<Option<Result<Request>>> {
    Ok(read_frame(reader)?.map(|payload| decode_request(&payload)))
}

/// Write a framed request
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    write_frame(writer, &encode_request(request)?)
}

/// Read one framed response
///
/// `Ok(None)` means the peer closed the connection.
pub fn read_response<R: Read>(reader: &mut R) -> Result<Option<Response>> {
    match read_frame(reader)? {
        Some(payload) => decode_response(&payload).map(Some),
        None => Ok(None),
    }
}

/// Write a framed response
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    write_frame(writer, &encode_response(response)?)
}
