//! Tiered pool of reusable byte buffers
//!
//! # Size Classes
//!
//! | Class  | Capacity |
//! |--------|----------|
//! | Small  | 1 KiB    |
//! | Medium | 10 KiB   |
//! | Large  | 1 MiB    |
//!
//! [`BufferPool::get`] picks the smallest class whose capacity covers the size
//! hint. Requests above the largest class are allocated fresh, counted as
//! oversized, and never retained.
//!
//! # Thread Safety
//!
//! The pool is a cheap `Clone` handle over shared state. Each class keeps its
//! idle buffers behind its own `Mutex`, held only for a push or pop, so
//! connections acquire and release independently.
//!
//! Buffers come back with length 0 but their old bytes are NOT zeroed.

use bytes::BytesMut;
use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

pub const SMALL_BUFFER_SIZE: usize = 1024;
pub const MEDIUM_BUFFER_SIZE: usize = 10 * 1024;
pub const LARGE_BUFFER_SIZE: usize = 1024 * 1024;

/// Buffer size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    Small = 0,
    Medium = 1,
    Large = 2,
}

impl SizeClass {
    pub const ALL: [SizeClass; 3] = [SizeClass::Small, SizeClass::Medium, SizeClass::Large];

    pub const fn capacity(self) -> usize {
        match self {
            Self::Small => SMALL_BUFFER_SIZE,
            Self::Medium => MEDIUM_BUFFER_SIZE,
            Self::Large => LARGE_BUFFER_SIZE,
        }
    }

    /// Smallest class that can hold `size` bytes
    pub fn for_size(size: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.capacity() >= size)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Pool sizing options
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Buffers allocated up front per class (small, medium, large)
    pub prewarm: [usize; 3],

    /// Idle buffers retained per class; returns beyond this are dropped
    pub max_idle: [usize; 3],
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            prewarm: [32, 8, 1],
            max_idle: [1024, 128, 8],
        }
    }
}

/// Snapshot of pool usage, for an external metrics collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Buffers currently checked out, per class
    pub in_use: [usize; 3],

    /// Buffers sitting idle, per class
    pub idle: [usize; 3],

    /// Requests that fell outside every class
    pub oversized: u64,
}

impl PoolStats {
    pub fn in_use_of(&self, class: SizeClass) -> usize {
        self.in_use[class.index()]
    }

    pub fn idle_of(&self, class: SizeClass) -> usize {
        self.idle[class.index()]
    }
}

struct Bucket {
    class: SizeClass,
    idle: Mutex<Vec<BytesMut>>,
    in_use: AtomicUsize,
    max_idle: usize,
}

impl Bucket {
    fn new(class: SizeClass, prewarm: usize, max_idle: usize) -> Self {
        let idle = (0..prewarm.min(max_idle))
            .map(|_| BytesMut::with_capacity(class.capacity()))
            .collect();
        Self {
            class,
            idle: Mutex::new(idle),
            in_use: AtomicUsize::new(0),
            max_idle,
        }
    }

    fn acquire(&self) -> BytesMut {
        self.in_use.fetch_add(1, Ordering::Relaxed);
        let reused = self.idle.lock().pop();
        match reused {
            Some(mut buf) => {
                buf.clear();
                buf
            }
            None => BytesMut::with_capacity(self.class.capacity()),
        }
    }

    fn release(&self, mut buf: BytesMut) {
        let _ = self
            .in_use
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));

        // A buffer that grew past the largest class, or lost capacity to a
        // split, no longer fits this bucket.
        let capacity = buf.capacity();
        if capacity < self.class.capacity() || capacity > LARGE_BUFFER_SIZE {
            return;
        }

        buf.clear();
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(buf);
        }
    }
}

struct PoolInner {
    buckets: [Bucket; 3],
    oversized: AtomicU64,
}

/// Shared, size-classed buffer pool
///
/// Constructed once at startup and handed to every component that stages
/// bytes. Tests build their own.
#[derive(Clone)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

impl BufferPool {
    pub fn new(config: PoolConfig) -> Self {
        let buckets = SizeClass::ALL.map(|class| {
            Bucket::new(
                class,
                config.prewarm[class.index()],
                config.max_idle[class.index()],
            )
        });

        Self {
            inner: Arc::new(PoolInner {
                buckets,
                oversized: AtomicU64::new(0),
            }),
        }
    }

    /// Take a buffer with capacity for at least `size_hint` bytes
    pub fn get(&self, size_hint: usize) -> PooledBuf {
        match SizeClass::for_size(size_hint) {
            Some(class) => PooledBuf {
                buf: self.inner.buckets[class.index()].acquire(),
                class: Some(class),
                pool: Some(self.inner.clone()),
            },
            None => {
                self.inner.oversized.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(size_hint, "Oversized buffer request, allocating outside the pool");
                PooledBuf {
                    buf: BytesMut::with_capacity(size_hint),
                    class: None,
                    pool: None,
                }
            }
        }
    }

    /// Return a buffer to its class. Dropping a [`PooledBuf`] does the same.
    pub fn put(&self, buf: PooledBuf) {
        drop(buf);
    }

    pub fn stats(&self) -> PoolStats {
        let mut stats = PoolStats {
            oversized: self.inner.oversized.load(Ordering::Relaxed),
            ..PoolStats::default()
        };
        for bucket in &self.inner.buckets {
            let i = bucket.class.index();
            stats.in_use[i] = bucket.in_use.load(Ordering::Relaxed);
            stats.idle[i] = bucket.idle.lock().len();
        }
        stats
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool").field("stats", &self.stats()).finish()
    }
}

/// A buffer checked out of a [`BufferPool`]
///
/// Goes back to the pool it came from when dropped. Oversized buffers are
/// simply freed.
pub struct PooledBuf {
    buf: BytesMut,
    class: Option<SizeClass>,
    pool: Option<Arc<PoolInner>>,
}

impl PooledBuf {
    /// Class this buffer was drawn from, `None` for oversized allocations
    pub fn class(&self) -> Option<SizeClass> {
        self.class
    }
}

impl Deref for PooledBuf {
    type Target = BytesMut;

    fn deref(&self) -> &BytesMut {
        &self.buf
    }
}

impl DerefMut for PooledBuf {
    fn deref_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }
}

impl AsRef<[u8]> for PooledBuf {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl std::fmt::Debug for PooledBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuf")
            .field("class", &self.class)
            .field("len", &self.buf.len())
            .field("capacity", &self.buf.capacity())
            .finish()
    }
}

impl Drop for PooledBuf {
    fn drop(&mut self) {
        if let (Some(pool), Some(class)) = (self.pool.take(), self.class) {
            pool.buckets[class.index()].release(std::mem::take(&mut self.buf));
        }
    }
}
