//! Connection ID generation

use std::sync::atomic::{AtomicU64, Ordering};

use crate::ConnectionId;

/// Thread-safe, monotonically increasing ID generator
///
/// IDs start at 1 and are never reused within a process.
#[derive(Debug)]
pub struct IdGenerator {
    next_id: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    /// Get the next available ID
    pub fn next_id(&self) -> ConnectionId {
        ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of IDs handed out so far
    pub fn issued(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed) - 1
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
