//! Configuration for filexfer
//!
//! Centralized configuration with sensible defaults. The server and the
//! client each get their own struct; both are passed explicitly into the
//! components that need them.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Result, XferError};

/// Default transfer chunk size (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default upload size limit (2 GiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Convert a size in MiB to bytes, rejecting values that overflow
pub fn mib_to_bytes(mib: u64) -> Result<u64> {
    mib.checked_mul(1024 * 1024)
        .ok_or_else(|| XferError::Config(format!("{} MiB does not fit in 64 bits", mib)))
}

/// Convert a chunk size in KiB to bytes, rejecting values that overflow
pub fn kib_to_chunk_size(kib: u64) -> Result<usize> {
    kib.checked_mul(1024)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .ok_or_else(|| XferError::Config(format!("{} KiB chunks are too large", kib)))
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Flat directory holding every served file
    pub upload_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Transfer Configuration
    // -------------------------------------------------------------------------
    /// Largest upload the server accepts (in bytes)
    pub max_file_size: u64,

    /// Size of each data chunk sent for downloads (in bytes)
    pub chunk_size: usize,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./server_files"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            listen_addr: "0.0.0.0:6666".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(XferError::Config("chunk_size must be greater than 0".to_string()));
        }
        if self.chunk_size > u32::MAX as usize {
            return Err(XferError::Config(format!(
                "chunk_size {} does not fit a frame length",
                self.chunk_size
            )));
        }
        if self.max_file_size == 0 {
            return Err(XferError::Config("max_file_size must be greater than 0".to_string()));
        }
        self.listen_addr.parse::<SocketAddr>().map_err(|e| {
            XferError::Config(format!("invalid listen address {:?}: {}", self.listen_addr, e))
        })?;
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the served directory
    pub fn upload_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = path.into();
        self
    }

    /// Set the upload size limit (in bytes)
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.config.max_file_size = size;
        self
    }

    /// Set the chunk size (in bytes)
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Where downloads land when no explicit path is given
    pub download_dir: PathBuf,

    /// Socket read/write timeout (milliseconds, 0 disables it)
    pub timeout_ms: u64,

    /// Size of each data chunk sent for uploads (in bytes)
    pub chunk_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("./downloads"),
            timeout_ms: 120_000,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size > u32::MAX as usize {
            return Err(XferError::Config(format!(
                "chunk_size must be between 1 and {} bytes",
                u32::MAX
            )));
        }
        Ok(())
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the default download directory
    pub fn download_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.download_dir = path.into();
        self
    }

    /// Set the socket timeout (in milliseconds)
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// Set the chunk size (in bytes)
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
