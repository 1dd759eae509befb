//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One thread per accepted connection, no pool
//! - Client holds exactly one connection and runs one command at a time

mod client;
mod connection;
mod server;

pub use client::{Client, TransferReport};
pub use connection::Connection;
pub use server::Server;
