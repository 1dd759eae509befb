//! Client Session
//!
//! Issues one command at a time over a single connection and, for uploads
//! and downloads, runs the matching transfer role inline before returning.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{Result, XferError};
use crate::protocol::{
    read_response, write_request, write_response, FileRecord, Request, Response, ServerInfo,
};
use crate::storage::validate_filename;
use crate::transfer::{discard_partial, file_digest, receive_into, send_file, verify_digest, ProgressSink};

/// Outcome of a completed upload or download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    /// Local file: the upload source or the download destination
    pub path: PathBuf,

    /// Bytes transferred
    pub size: u64,

    /// Verified MD5 hex digest
    pub md5: String,
}

/// A connection to a file server
///
/// Methods take `&mut self`, so a new command cannot start while a transfer
/// is still running on the connection.
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    config: ClientConfig,
    server_addr: String,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A, config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let stream = TcpStream::connect(addr).map_err(XferError::Connection)?;
        let server_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true).map_err(XferError::Connection)?;
        if config.timeout_ms > 0 {
            let timeout = Some(Duration::from_millis(config.timeout_ms));
            stream.set_read_timeout(timeout).map_err(XferError::Connection)?;
            stream.set_write_timeout(timeout).map_err(XferError::Connection)?;
        }

        let read_stream = stream.try_clone().map_err(XferError::Connection)?;

        tracing::debug!("Connected to {}", server_addr);
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            config,
            server_addr,
        })
    }

    /// Address of the connected server
    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    /// List the files on the server
    pub fn list_files(&mut self) -> Result<Vec<FileRecord>> {
        self.round_trip(&Request::List)?.into_files()
    }

    /// Server directory statistics
    pub fn server_info(&mut self) -> Result<ServerInfo> {
        self.round_trip(&Request::Info)?.into_info()
    }

    /// Delete a file on the server, returning the server's message
    pub fn delete_file(&mut self, filename: &str) -> Result<String> {
        let request = Request::Delete {
            filename: filename.to_string(),
        };
        self.round_trip(&request)?.into_message()
    }

    /// Upload a local file under its own file name
    ///
    /// The local digest is computed before the command is sent and compared
    /// with the digest the server computes over what it received.
    pub fn upload_file<P>(&mut self, path: &Path, progress: &mut P) -> Result<TransferReport>
    where
        P: ProgressSink + ?Sized,
    {
        let size = match fs::metadata(path) {
            Ok(m) if m.is_file() => m.len(),
            Ok(_) => return Err(XferError::FileNotFound(path.display().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(XferError::FileNotFound(path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| XferError::InvalidFilename(path.display().to_string()))?
            .to_string();
        let local_md5 = file_digest(path)?;

        let request = Request::Upload {
            filename: filename.clone(),
            size,
        };
        self.round_trip(&request)?.into_ready()?;

        let chunk_size = self.config.chunk_size;
        if let Err(e) = send_file(path, &mut self.writer, size, chunk_size, progress) {
            // The server is still counting bytes; closing is the only way
            // to abort it.
            self.close();
            return Err(e);
        }

        let server_md5 = self.expect_response()?.into_md5()?;
        verify_digest(&local_md5, &server_md5)?;
        progress.report(100.0);

        tracing::info!("Uploaded {} ({} bytes)", filename, size);
        Ok(TransferReport {
            path: path.to_path_buf(),
            size,
            md5: local_md5,
        })
    }

    /// Download a file
    ///
    /// Saves to `save_path`, or to `<download_dir>/<filename>` when none is
    /// given. The local file is removed if the transfer is cut short or the
    /// digest does not match.
    pub fn download_file<P>(
        &mut self,
        filename: &str,
        save_path: Option<&Path>,
        progress: &mut P,
    ) -> Result<TransferReport>
    where
        P: ProgressSink + ?Sized,
    {
        validate_filename(filename)?;
        let dest = match save_path {
            Some(path) => path.to_path_buf(),
            None => {
                fs::create_dir_all(&self.config.download_dir)?;
                self.config.download_dir.join(filename)
            }
        };

        let request = Request::Download {
            filename: filename.to_string(),
        };
        let meta = match self.round_trip(&request)?.into_file_meta() {
            Ok(meta) => meta,
            // The server refused the download and expects nothing further
            Err(e @ XferError::Remote(_)) => return Err(e),
            Err(e) => {
                // The server is waiting for an acknowledgement; decline so
                // the next request is not taken for one
                write_response(&mut self.writer, &Response::error(e.to_string()))?;
                return Err(e);
            }
        };

        // Open the destination before acknowledging so a local failure can
        // still be reported to the server instead of leaving data in flight.
        let file = match File::create(&dest) {
            Ok(f) => f,
            Err(e) => {
                write_response(&mut self.writer, &Response::error(e.to_string()))?;
                return Err(e.into());
            }
        };
        write_response(&mut self.writer, &Response::ready())?;

        let md5 = match receive_into(&mut self.reader, file, &dest, meta.size, progress) {
            Ok(md5) => md5,
            Err(e) => {
                if e.is_fatal() {
                    self.close();
                }
                return Err(e);
            }
        };
        if let Err(e) = verify_digest(&meta.md5, &md5) {
            discard_partial(&dest);
            return Err(e);
        }
        progress.report(100.0);

        tracing::info!("Downloaded {} ({} bytes) to {}", filename, meta.size, dest.display());
        Ok(TransferReport {
            path: dest,
            size: meta.size,
            md5,
        })
    }

    /// End the session
    pub fn disconnect(mut self) {
        if let Err(e) = write_request(&mut self.writer, &Request::Disconnect) {
            tracing::debug!("Disconnect request to {} failed: {}", self.server_addr, e);
        }
        self.close();
    }

    fn round_trip(&mut self, request: &Request) -> Result<Response> {
        write_request(&mut self.writer, request)?;
        self.expect_response()
    }

    fn expect_response(&mut self) -> Result<Response> {
        read_response(&mut self.reader)?.ok_or(XferError::ConnectionClosed)
    }

    fn close(&mut self) {
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
    }
}
