//! Transfer checksums
//!
//! MD5 is used only to detect corruption in transit, not as a security
//! control.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::error::{Result, XferError};

/// Read buffer size for whole-file digests
const DIGEST_READ_SIZE: usize = 8192;

/// Incremental MD5 digest
pub struct Digest {
    context: md5::Context,
}

impl Digest {
    pub fn new() -> Self {
        Self {
            context: md5::Context::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.context.consume(data);
    }

    /// Lowercase hex digest
    pub fn finish(self) -> String {
        format!("{:x}", self.context.compute())
    }
}

impl Default for Digest {
    fn default() -> Self {
        Self::new()
    }
}

/// MD5 hex digest of a byte slice
pub fn digest_bytes(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// MD5 hex digest of everything a reader yields
pub fn digest_reader<R: Read>(reader: &mut R) -> Result<String> {
    let mut digest = Digest::new();
    let mut buf = [0u8; DIGEST_READ_SIZE];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => digest.update(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(XferError::Io(e)),
        }
    }
    Ok(digest.finish())
}

/// MD5 hex digest of a file on disk
pub fn file_digest(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    digest_reader(&mut file)
}

/// Compare the digest a peer announced against the one computed locally
pub fn verify_digest(expected: &str, actual: &str) -> Result<()> {
    if expected.eq_ignore_ascii_case(actual) {
        Ok(())
    } else {
        Err(XferError::ChecksumMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}
