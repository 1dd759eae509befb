//! Control message definitions
//!
//! Requests are tagged by `command`, responses by `status`. Both travel as
//! JSON objects inside a frame.

use serde::{Deserialize, Serialize};

use crate::error::{Result, XferError};

/// A request from client to server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum Request {
    /// List every file in the server directory
    List,

    /// Announce an upload; chunk data follows the server's `ready`
    Upload { filename: String, size: u64 },

    /// Ask for a file; the server answers with its size and digest
    Download { filename: String },

    /// Remove a file
    Delete { filename: String },

    /// Directory statistics
    Info,

    /// End the session (no reply)
    Disconnect,
}

impl Request {
    /// Every recognised `command` value
    pub const COMMAND_NAMES: [&'static str; 6] =
        ["list", "upload", "download", "delete", "info", "disconnect"];

    /// The wire name of this command
    pub fn name(&self) -> &'static str {
        match self {
            Request::List => "list",
            Request::Upload { .. } => "upload",
            Request::Download { .. } => "download",
            Request::Delete { .. } => "delete",
            Request::Info => "info",
            Request::Disconnect => "disconnect",
        }
    }
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// Modification time, seconds since the Unix epoch
    pub modified: f64,
}

/// Server directory statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub upload_dir: String,
    pub total_files: u64,
    pub total_size: u64,
}

/// Fields a `success` response may carry
///
/// Which ones are present depends on the command being answered; the
/// `Response::into_*` accessors check for the ones each caller needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuccessBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileRecord>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ServerInfo>,
}

/// A response, or the client's `ready` acknowledgement before a download
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    Success(SuccessBody),
    Error { message: String },
    Ready,
}

/// Metadata sent ahead of download data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub size: u64,
    pub md5: String,
}

impl Response {
    // -------------------------------------------------------------------------
    // Constructors
    // -------------------------------------------------------------------------

    pub fn ready() -> Self {
        Response::Ready
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    pub fn listing(files: Vec<FileRecord>) -> Self {
        Response::Success(SuccessBody {
            files: Some(files),
            ..Default::default()
        })
    }

    pub fn file_meta(filename: impl Into<String>, size: u64, md5: impl Into<String>) -> Self {
        Response::Success(SuccessBody {
            size: Some(size),
            filename: Some(filename.into()),
            md5: Some(md5.into()),
            ..Default::default()
        })
    }

    pub fn uploaded(message: impl Into<String>, md5: impl Into<String>) -> Self {
        Response::Success(SuccessBody {
            message: Some(message.into()),
            md5: Some(md5.into()),
            ..Default::default()
        })
    }

    pub fn message(message: impl Into<String>) -> Self {
        Response::Success(SuccessBody {
            message: Some(message.into()),
            ..Default::default()
        })
    }

    pub fn info(info: ServerInfo) -> Self {
        Response::Success(SuccessBody {
            info: Some(info),
            ..Default::default()
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn is_ready(&self) -> bool {
        matches!(self, Response::Ready)
    }

    /// Unwrap a `success` body; `error` becomes `XferError::Remote`
    pub fn into_success(self) -> Result<SuccessBody> {
        match self {
            Response::Success(body) => Ok(body),
            Response::Error { message } => Err(XferError::Remote(message)),
            Response::Ready => Err(XferError::Protocol(
                "expected success response, got ready".to_string(),
            )),
        }
    }

    /// Expect `ready`; `error` becomes `XferError::Remote`
    pub fn into_ready(self) -> Result<()> {
        match self {
            Response::Ready => Ok(()),
            Response::Error { message } => Err(XferError::Remote(message)),
            Response::Success(_) => Err(XferError::Protocol(
                "expected ready response, got success".to_string(),
            )),
        }
    }

    pub fn into_files(self) -> Result<Vec<FileRecord>> {
        self.into_success()?
            .files
            .ok_or_else(|| missing_field("files"))
    }

    pub fn into_file_meta(self) -> Result<FileMeta> {
        let body = self.into_success()?;
        Ok(FileMeta {
            size: body.size.ok_or_else(|| missing_field("size"))?,
            md5: body.md5.ok_or_else(|| missing_field("md5"))?,
        })
    }

    /// The server's digest of an uploaded file
    pub fn into_md5(self) -> Result<String> {
        self.into_success()?.md5.ok_or_else(|| missing_field("md5"))
    }

    pub fn into_message(self) -> Result<String> {
        self.into_success()?
            .message
            .ok_or_else(|| missing_field("message"))
    }

    pub fn into_info(self) -> Result<ServerInfo> {
        self.into_success()?.info.ok_or_else(|| missing_field("info"))
    }
}

fn missing_field(field: &str) -> XferError {
    XferError::Protocol(format!("success response is missing `{}`", field))
}
