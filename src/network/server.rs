//! TCP Server
//!
//! Accepts connections and runs each one on its own thread.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Result, XferError};
use crate::storage::FileStore;

use super::Connection;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// TCP server for filexfer
pub struct Server {
    config: Arc<Config>,

    /// The served directory, shared by every connection
    store: FileStore,

    listener: TcpListener,

    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Validate the config, open the served directory, and bind the listener
    pub fn bind(config: Config) -> Result<Self> {
        config.validate()?;

        let store = FileStore::open(&config.upload_dir)?;
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            XferError::Config(format!("cannot listen on {}: {}", config.listen_addr, e))
        })?;

        Ok(Self {
            config: Arc::new(config),
            store,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(XferError::Connection)
    }

    /// The served directory
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Flag that stops the accept loop when set
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the server to stop accepting connections
    ///
    /// Connections already being served run until their clients leave.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Accept connections until shutdown is signalled (blocking)
    pub fn run(&self) -> Result<()> {
        self.listener
            .set_nonblocking(true)
            .map_err(XferError::Connection)?;

        tracing::info!(
            "Serving {} on {}",
            self.store.root().display(),
            self.local_addr()?
        );

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, addr)) => self.spawn_connection(stream, addr),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    // Per-connection failures (e.g. aborted handshakes) must not
                    // stop the server.
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!("Accept loop stopped");
        Ok(())
    }

    /// Serve one connection on a dedicated thread
    fn spawn_connection(&self, stream: TcpStream, addr: SocketAddr) {
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Dropping connection from {}: {}", addr, e);
            return;
        }

        let mut connection =
            match Connection::new(stream, self.store.clone(), Arc::clone(&self.config)) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("Dropping connection from {}: {}", addr, e);
                    return;
                }
            };

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", addr))
            .spawn(move || {
                if let Err(e) = connection.handle() {
                    tracing::debug!("Connection {} ended with error: {}", connection.peer_addr(), e);
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn handler for {}: {}", addr, e);
        }
    }
}
