//! filexfer Server Binary
//!
//! Serves one flat directory over TCP.

use clap::Parser;
use filexfer::config::{self, DEFAULT_CHUNK_SIZE};
use filexfer::{Config, Result, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// filexfer Server
#[derive(Parser, Debug)]
#[command(name = "filexfer-server")]
#[command(about = "TCP file exchange server")]
#[command(version)]
struct Args {
    /// Directory to serve (created if missing)
    #[arg(short, long, default_value = "./server_files")]
    dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:6666")]
    listen: String,

    /// Largest accepted upload in MB
    #[arg(short, long, default_value = "2048")]
    max_size_mb: u64,

    /// Download chunk size in KB
    #[arg(short, long, default_value_t = (DEFAULT_CHUNK_SIZE / 1024) as u64)]
    chunk_kb: u64,
}

/// Convert the size arguments to bytes
fn build_config(args: &Args) -> Result<Config> {
    Ok(Config::builder()
        .upload_dir(&args.dir)
        .listen_addr(&args.listen)
        .max_file_size(config::mib_to_bytes(args.max_size_mb)?)
        .chunk_size(config::kib_to_chunk_size(args.chunk_kb)?)
        .build())
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,filexfer=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("filexfer server v{}", filexfer::VERSION);
    tracing::info!("Serving directory: {}", args.dir);
    tracing::info!("Listen address: {}", args.listen);

    let config = match build_config(&args) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Invalid arguments: {}", e);
            std::process::exit(2);
        }
    };

    let server = match Server::bind(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, initiating shutdown...");
        shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
    }) {
        tracing::warn!("Could not install Ctrl+C handler: {}", e);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
