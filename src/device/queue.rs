//! The device execution queue
//!
//! A [`Queue`] owns one default execution stream, a fixed pool of
//! parallel streams, the backend library handle bound to the current
//! stream, and a monotonically growing scratch workspace. Batched
//! routines multiplex independent items over the pool with
//! [`Queue::fork`] / [`Queue::revolve`] / [`Queue::join`].
//!
//! A queue is exclusively owned: it is movable but not `Clone`, and it
//! must only be driven from one host thread at a time.

use crate::device::{backend, Device};
use crate::error::{Error, Result};

/// Capacity of the parallel stream pool entered by [`Queue::fork`].
pub const FORK_POOL_SIZE: usize = 10;

/// Default per-call batch argument limit for queue construction.
pub const DEFAULT_BATCH_LIMIT: usize = 50_000;

/// An accelerator execution queue.
///
/// # State machine
///
/// A queue is in *default* mode (one active stream) or *forked* mode
/// (`FORK_POOL_SIZE` active parallel streams with a round-robin cursor):
///
/// - [`fork`](Queue::fork): default → forked (idempotent);
/// - [`revolve`](Queue::revolve): advances the cursor in forked mode,
///   no-op in default mode;
/// - [`join`](Queue::join): forked → default, ordering all forked work
///   before subsequent default-stream work (device-side, not a host
///   drain);
/// - [`sync`](Queue::sync): host-blocking drain of every stream.
///
/// # Ordering
///
/// Operations within one stream execute in issue order. Across streams
/// there is no order unless established by `join`. Returning from an
/// issuing call does not mean the device work finished; only `sync`
/// gives that guarantee to host code.
pub struct Queue {
    device: Device,
    batch_limit: usize,

    // scratch workspace; grows monotonically, never shrinks
    work: u64,
    lwork: usize,

    // 1 = default mode; FORK_POOL_SIZE = forked mode
    num_active_streams: usize,
    current_stream_index: usize,

    imp: backend::QueueImpl,
}

impl Queue {
    /// Create a queue bound to `device` with the default batch limit.
    ///
    /// Allocates the backend execution context, the default stream, the
    /// parallel stream pool, and the library handle. Fails if the
    /// backend cannot initialize a context on that device.
    pub fn new(device: Device) -> Result<Self> {
        Self::with_batch_limit(device, DEFAULT_BATCH_LIMIT)
    }

    /// Create a queue with an explicit batch argument limit.
    pub fn with_batch_limit(device: Device, batch_limit: usize) -> Result<Self> {
        Ok(Self {
            device,
            batch_limit,
            work: 0,
            lwork: 0,
            num_active_streams: 1,
            current_stream_index: 0,
            imp: backend::QueueImpl::new(device)?,
        })
    }

    /// The device this queue is bound to.
    pub fn device(&self) -> Device {
        self.device
    }

    /// Maximum batch size a single batched call may stage through the
    /// workspace.
    pub fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    /// Whether the queue is currently in forked mode.
    pub fn is_forked(&self) -> bool {
        self.num_active_streams > 1
    }

    /// Number of streams work is currently multiplexed over: 1 in
    /// default mode, [`FORK_POOL_SIZE`] in forked mode.
    pub fn num_active_streams(&self) -> usize {
        self.num_active_streams
    }

    /// Block the host until all work issued on every stream owned by
    /// this queue (default and parallel) has completed.
    pub fn sync(&self) -> Result<()> {
        self.imp.sync_all()
    }

    /// Switch from the default stream to the parallel stream pool.
    ///
    /// Work already issued on the default stream happens-before any work
    /// subsequently issued on the parallel streams. Idempotent: calling
    /// `fork` while forked does not reset the cursor.
    pub fn fork(&mut self) -> Result<()> {
        if self.num_active_streams > 1 {
            return Ok(());
        }
        self.imp.fork_streams()?;
        self.num_active_streams = FORK_POOL_SIZE;
        self.current_stream_index = 0;
        self.imp.activate_stream(Some(0))
    }

    /// Advance the round-robin cursor to the next active stream.
    ///
    /// No-op in default mode (there is only one stream to cycle).
    pub fn revolve(&mut self) -> Result<()> {
        if self.num_active_streams == 1 {
            return Ok(());
        }
        self.current_stream_index = (self.current_stream_index + 1) % self.num_active_streams;
        self.imp.activate_stream(Some(self.current_stream_index))
    }

    /// Return to the default stream.
    ///
    /// All work issued on the parallel streams happens-before any work
    /// subsequently issued on the default stream. The wait is enforced
    /// on the device via events, not by blocking the host. No-op in
    /// default mode.
    pub fn join(&mut self) -> Result<()> {
        if self.num_active_streams == 1 {
            return Ok(());
        }
        self.imp.join_streams()?;
        self.num_active_streams = 1;
        self.current_stream_index = 0;
        self.imp.activate_stream(None)
    }

    /// The scratch workspace device address (0 if never grown).
    pub fn work(&self) -> u64 {
        self.work
    }

    /// Workspace capacity in elements of `T`.
    pub fn work_size<T>(&self) -> usize {
        self.lwork / std::mem::size_of::<T>()
    }

    /// Ensure the workspace holds at least `len` elements of `T`.
    ///
    /// If the current capacity is insufficient: synchronize (no in-flight
    /// operation may reference the buffer being freed), free the old
    /// buffer, and allocate exactly the requested size. Never shrinks.
    pub fn work_resize<T>(&mut self, len: usize) -> Result<()> {
        let bytes = len
            .checked_mul(std::mem::size_of::<T>())
            .ok_or_else(|| Error::invalid_arg("len", "workspace size overflows usize"))?;
        if bytes <= self.lwork {
            return Ok(());
        }
        self.sync()?;
        if self.work != 0 {
            self.imp.free(self.work)?;
            self.work = 0;
            self.lwork = 0;
        }
        self.work = self.imp.malloc(bytes)?;
        self.lwork = bytes;
        Ok(())
    }

    pub(crate) fn imp(&self) -> &backend::QueueImpl {
        &self.imp
    }
}

#[cold]
#[inline(never)]
fn drop_warn(what: &str, e: &crate::error::Error) {
    eprintln!("[blasq] queue drop: {what}: {e}");
}

impl Drop for Queue {
    fn drop(&mut self) {
        // Drain before releasing anything still referenced by pending
        // work. Destruction never panics; failures go to stderr.
        if let Err(e) = self.sync() {
            drop_warn("sync failed", &e);
        }
        if self.work != 0 {
            if let Err(e) = self.imp.free(self.work) {
                drop_warn("workspace free failed", &e);
            }
        }
        // Streams, events, and the library handle are released by the
        // backend impl's own Drop.
    }
}

// ----------------------------------------------------------------------------
// Stub-backend instrumentation surface
// ----------------------------------------------------------------------------

#[cfg(all(feature = "stub", not(feature = "cuda")))]
impl Queue {
    /// Snapshot of the operations this queue has recorded (stub backend).
    pub fn recorded_ops(&self) -> Vec<crate::device::stub::OpRecord> {
        self.imp.ops()
    }

    /// Clear the recorded operation log (stub backend).
    pub fn clear_recorded_ops(&self) {
        self.imp.clear_ops()
    }
}
