//! Reusable byte buffers for response capture.
//!
//! # Responsibilities
//! - Hand out exclusively owned scratch buffers to requests
//! - Take buffers back on drop, cleared, on every exit path
//! - Bound what the pool keeps idle (count and capacity)

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

use bytes::BytesMut;

/// Default number of idle buffers kept around.
pub const DEFAULT_MAX_IDLE: usize = 64;

/// Buffers that grew past this capacity are dropped instead of pooled.
pub const DEFAULT_MAX_RETAINED_CAPACITY: usize = 1024 * 1024;

/// A pool of reusable `BytesMut` buffers, safe to share across requests.
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<BytesMut>>,
    max_idle: usize,
    max_retained_capacity: usize,
}

impl BufferPool {
    /// Create a pool with default bounds.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_IDLE, DEFAULT_MAX_RETAINED_CAPACITY)
    }

    /// Create a pool keeping at most `max_idle` buffers of at most
    /// `max_retained_capacity` bytes each.
    pub fn with_limits(max_idle: usize, max_retained_capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
            max_retained_capacity,
        }
    }

    /// Take a buffer out of the pool, allocating if none is idle.
    ///
    /// The buffer goes back to the pool when the guard is dropped.
    pub fn acquire(self: &Arc<Self>) -> PooledBuffer {
        let buf = self
            .idle
            .lock()
            .map(|mut idle| idle.pop())
            .unwrap_or_default()
            .unwrap_or_default();

        PooledBuffer {
            pool: self.clone(),
            buf: Some(buf),
        }
    }

    /// Number of buffers currently idle.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    fn release(&self, mut buf: BytesMut) {
        if buf.capacity() > self.max_retained_capacity {
            return;
        }
        buf.clear();

        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < self.max_idle {
                idle.push(buf);
            }
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// A RAII guard over a pooled buffer.
#[derive(Debug)]
pub struct PooledBuffer {
    pool: Arc<BufferPool>,
    buf: Option<BytesMut>,
}

impl Deref for PooledBuffer {
    type Target = BytesMut;

    fn deref(&self) -> &Self::Target {
        // Only `Drop` takes the buffer out.
        self.buf.as_ref().expect("pooled buffer used after release")
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buf.as_mut().expect("pooled buffer used after release")
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.release(buf);
        }
    }
}
