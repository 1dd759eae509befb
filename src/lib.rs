//! # filexfer
//!
//! A TCP file exchange server and client with:
//! - Length-prefixed framing for control messages and file data
//! - Chunked uploads and downloads with truncation detection
//! - MD5 integrity verification on both transfer directions
//! - One thread per connection, no shared state beyond the served directory
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────┐                      ┌──────────────────────────┐
//! │  Client Session  │◀──── TCP stream ────▶│      Server Session      │
//! │ (one command at  │                      │ (one thread/connection)  │
//! │     a time)      │                      └────────────┬─────────────┘
//! └────────┬─────────┘                                   │
//!          │                             ┌───────────────┼───────────────┐
//!          ▼                             ▼               ▼               ▼
//!   ┌─────────────┐               ┌─────────────┐ ┌─────────────┐ ┌─────────────┐
//!   │  Transfer   │               │  Transfer   │ │  FileStore  │ │  FileLocks  │
//!   │   Engine    │               │   Engine    │ │ (flat dir)  │ │ (per name)  │
//!   └──────┬──────┘               └──────┬──────┘ └─────────────┘ └─────────────┘
//!          │                             │
//!          └──────────────┬──────────────┘
//!                         ▼
//!               ┌───────────────────┐
//!               │ Protocol / Frames │
//!               └───────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod network;
pub mod protocol;
pub mod storage;
pub mod transfer;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{ClientConfig, Config};
pub use error::{Result, XferError};
pub use network::{Client, Server, TransferReport};
pub use transfer::ProgressSink;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of filexfer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
