//! Connection Handler
//!
//! Runs the command loop for one client connection.
//!
//! ## States
//! ```text
//! AwaitingCommand ──frame──▶ Dispatching ──▶ AwaitingCommand
//!        │                        │
//!        └──close──▶ Closed ◀─────┴──disconnect / framing error
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Result, XferError};
use crate::protocol::{read_request, read_response, write_response, Request, Response};
use crate::storage::FileStore;
use crate::transfer::{file_digest, receive_into, send_file};

/// What the loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    AwaitCommand,
    Close,
}

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// The served directory, shared with every other connection
    store: FileStore,

    config: Arc<Config>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O. Reads have no timeout: an idle client is kept
    /// until it disconnects.
    pub fn new(stream: TcpStream, store: FileStore, config: Arc<Config>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true).map_err(XferError::Connection)?;

        let read_stream = stream.try_clone().map_err(XferError::Connection)?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            store,
            config,
            peer_addr,
        })
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Failures of a single command are answered with an `error` response
    /// and the loop continues. Framing failures end the connection.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let request = match read_request(&mut self.reader) {
                Ok(Some(Ok(request))) => request,
                Ok(Some(Err(e))) => {
                    tracing::warn!("Rejected message from {}: {}", self.peer_addr, e);
                    if self.reply(&Response::error(e.to_string()))? == Next::Close {
                        return Ok(());
                    }
                    continue;
                }
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(e) if is_disconnect(&e) => {
                    tracing::debug!("Connection to {} dropped: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            tracing::trace!("Received command from {}: {:?}", self.peer_addr, request);
            let command = request.name();

            match self.dispatch(request) {
                Ok(Next::AwaitCommand) => {}
                Ok(Next::Close) => {
                    tracing::debug!("Closing connection to {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) if is_disconnect(&e) => {
                    tracing::debug!(
                        "Client {} went away during {}: {}",
                        self.peer_addr, command, e
                    );
                    return Ok(());
                }
                Err(e) if e.is_fatal() => {
                    tracing::warn!("{} from {} failed: {}", command, self.peer_addr, e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("{} from {} failed: {}", command, self.peer_addr, e);
                    if self.reply(&Response::error(e.to_string()))? == Next::Close {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Route a command to its handler
    ///
    /// An `Err` that is not fatal means the peer is still owed a response.
    fn dispatch(&mut self, request: Request) -> Result<Next> {
        match request {
            Request::List => {
                let files = self.store.list()?;
                self.send_response(&Response::listing(files))?;
            }
            Request::Info => {
                let info = self.store.info()?;
                self.send_response(&Response::info(info))?;
            }
            Request::Upload { filename, size } => self.handle_upload(&filename, size)?,
            Request::Download { filename } => return self.handle_download(&filename),
            Request::Delete { filename } => self.handle_delete(&filename)?,
            Request::Disconnect => return Ok(Next::Close),
        }
        Ok(Next::AwaitCommand)
    }

    /// Receive an upload
    ///
    /// Everything that can be refused is checked before `ready` goes out, so
    /// a rejected upload never has chunk data in flight.
    fn handle_upload(&mut self, filename: &str, size: u64) -> Result<()> {
        let path = self.store.path_for(filename)?;
        if size > self.config.max_file_size {
            return Err(XferError::SizeLimitExceeded {
                size,
                max: self.config.max_file_size,
            });
        }

        let _guard = self.store.lock(filename)?;
        let file = File::create(&path)?;

        self.send_response(&Response::ready())?;
        let md5 = receive_into(&mut self.reader, file, &path, size, &mut ())?;

        tracing::info!(
            "Received {} from {} ({} bytes, md5 {})",
            filename, self.peer_addr, size, md5
        );
        self.send_response(&Response::uploaded("file uploaded", md5))
    }

    /// Serve a download
    ///
    /// Once chunk data has started, any failure closes the connection: the
    /// client is waiting for a byte count that can no longer be met.
    fn handle_download(&mut self, filename: &str) -> Result<Next> {
        let path = self.store.path_for(filename)?;
        let _guard = self.store.lock(filename)?;

        let size = self.store.stat(filename)?;
        let md5 = file_digest(&path)?;
        self.send_response(&Response::file_meta(filename, size, md5))?;

        match read_response(&mut self.reader) {
            Ok(Some(ack)) if ack.is_ready() => {}
            Ok(Some(other)) => {
                tracing::warn!(
                    "Client {} did not confirm download of {}: {:?}",
                    self.peer_addr, filename, other
                );
                return Ok(Next::AwaitCommand);
            }
            Ok(None) => return Ok(Next::Close),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    "Client {} sent an invalid acknowledgement for {}: {}",
                    self.peer_addr, filename, e
                );
                return Ok(Next::AwaitCommand);
            }
        }

        let chunk_size = self.config.chunk_size;
        match send_file(&path, &mut self.writer, size, chunk_size, &mut ()) {
            Ok(_) => {
                tracing::info!("Sent {} to {} ({} bytes)", filename, self.peer_addr, size);
                Ok(Next::AwaitCommand)
            }
            Err(e) => {
                tracing::warn!(
                    "Download of {} to {} aborted: {}",
                    filename, self.peer_addr, e
                );
                Ok(Next::Close)
            }
        }
    }

    fn handle_delete(&mut self, filename: &str) -> Result<()> {
        self.store.path_for(filename)?;
        let _guard = self.store.lock(filename)?;

        self.store.remove(filename)?;
        tracing::info!("Deleted {} for {}", filename, self.peer_addr);
        self.send_response(&Response::message("file deleted"))
    }

    /// Send a response to the client
    fn send_response(&mut self, response: &Response) -> Result<()> {
        write_response(&mut self.writer, response)
    }

    /// Send an error response from the loop
    ///
    /// A client that has already gone away ends the loop quietly.
    fn reply(&mut self, response: &Response) -> Result<Next> {
        match self.send_response(response) {
            Ok(()) => Ok(Next::AwaitCommand),
            Err(e) if is_disconnect(&e) => {
                tracing::debug!(
                    "Client {} disconnected before response could be sent: {}",
                    self.peer_addr, e
                );
                Ok(Next::Close)
            }
            Err(e) => Err(e),
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Socket errors that mean the peer is simply gone
fn is_disconnect(err: &XferError) -> bool {
    match err {
        XferError::ConnectionClosed => true,
        XferError::Connection(e) => matches!(
            e.kind(),
            ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::BrokenPipe
                | ErrorKind::UnexpectedEof
        ),
        _ => false,
    }
}
