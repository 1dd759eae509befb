//! Shared helpers for network tests
#![allow(dead_code)]

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use filexfer::{ClientConfig, Config, Server};
use tempfile::TempDir;

pub const TEST_CHUNK: usize = 1024;

/// A server running on a loopback port
pub struct TestServer {
    pub dir: TempDir,
    pub addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub fn start() -> Self {
        Self::start_with_limit(1024 * 1024)
    }

    pub fn start_with_limit(max_file_size: u64) -> Self {
        let dir = TempDir::new().unwrap();
        let config = Config::builder()
            .upload_dir(dir.path())
            .listen_addr("127.0.0.1:0")
            .max_file_size(max_file_size)
            .chunk_size(TEST_CHUNK)
            .build();

        let server = Server::bind(config).unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_handle();
        let handle = thread::spawn(move || server.run().unwrap());

        Self {
            dir,
            addr,
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    pub fn raw_connect(&self) -> TcpStream {
        let stream = TcpStream::connect(self.addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(10)))
            .unwrap();
        stream
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn client_config(download_dir: &Path) -> ClientConfig {
    ClientConfig::builder()
        .download_dir(download_dir)
        .timeout_ms(10_000)
        .chunk_size(TEST_CHUNK)
        .build()
}

/// Deterministic test content
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 253) as u8).collect()
}

/// Serve exactly one connection with a scripted handler
pub fn fake_server<F>(script: F) -> (SocketAddr, JoinHandle<()>)
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        script(stream);
    });
    (addr, handle)
}

/// Poll until `condition` holds or the deadline passes
pub fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}
