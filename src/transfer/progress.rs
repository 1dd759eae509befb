//! Transfer state and progress reporting

use crossbeam::channel::Sender;

use super::checksum::Digest;

/// Receives progress updates after each chunk
///
/// Values are percentages in `0.0..=100.0` and never decrease within one
/// operation.
pub trait ProgressSink {
    fn report(&mut self, percent: f64);
}

/// No progress reporting
impl ProgressSink for () {
    fn report(&mut self, _percent: f64) {}
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn report(&mut self, percent: f64) {
        self(percent)
    }
}

/// Forward progress to another thread; a dropped receiver is ignored
impl ProgressSink for Sender<f64> {
    fn report(&mut self, percent: f64) {
        let _ = self.send(percent);
    }
}

/// Bookkeeping for one transfer in one direction
///
/// Owned by whichever side is sending or receiving and dropped when the
/// operation ends.
pub struct TransferState {
    total_size: u64,
    bytes_moved: u64,
    digest: Digest,
}

impl TransferState {
    pub fn new(total_size: u64) -> Self {
        Self {
            total_size,
            bytes_moved: 0,
            digest: Digest::new(),
        }
    }

    /// Account for one chunk
    pub fn record(&mut self, chunk: &[u8]) {
        self.digest.update(chunk);
        self.bytes_moved += chunk.len() as u64;
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn bytes_moved(&self) -> u64 {
        self.bytes_moved
    }

    pub fn remaining(&self) -> u64 {
        self.total_size.saturating_sub(self.bytes_moved)
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_moved >= self.total_size
    }

    /// Percentage of bytes moved, `100.0` for an empty transfer
    pub fn percent(&self) -> f64 {
        if self.total_size == 0 {
            return 100.0;
        }
        (self.bytes_moved as f64 / self.total_size as f64 * 100.0).min(100.0)
    }

    /// Hex digest of every recorded chunk
    pub fn finish(self) -> String {
        self.digest.finish()
    }
}
