//! Instrumented host-simulation backend
//!
//! The stub backend models a small pool of virtual devices entirely in
//! host memory. "Device" buffers are 64-byte-aligned host allocations,
//! streams are virtual ids, and every queue operation is appended to an
//! inspectable per-queue log. Numeric kernels are out of scope: BLAS
//! forwarding calls are recorded, not computed.
//!
//! This is the backend integration tests run against; the log exposes
//! call counts, stream placement, and the per-item arguments the batched
//! dispatcher extracted.

use std::alloc::{alloc_zeroed, dealloc, Layout as AllocLayout};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::batch::Routine;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::types::MemcpyKind;

/// Number of virtual devices the stub exposes.
pub const STUB_DEVICE_COUNT: usize = 4;

const ALLOC_ALIGN: usize = 64;

/// A virtual stream id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamId {
    /// The queue's default stream
    Default,
    /// One of the parallel pool streams (0-based slot)
    Parallel(usize),
}

/// One entry in a stub queue's operation log.
#[derive(Clone, Debug)]
pub struct OpRecord {
    /// Operation name: a BLAS routine ("gemm", "trsm", ...) or a queue
    /// primitive ("memcpy", "memset", "fork", "join", "sync").
    pub name: &'static str,
    /// Virtual stream the operation was issued on.
    pub stream: StreamId,
    /// Byte count for copies and sets, 0 otherwise.
    pub bytes: usize,
    /// Routine-specific argument rendering, empty for primitives.
    pub detail: String,
}

// ============================================================================
// Process-global state
// ============================================================================

static CURRENT_DEVICE: AtomicI32 = AtomicI32::new(0);

/// Live allocations: base address -> size in bytes. Shared by device and
/// pinned allocations (both are host memory here).
static ALLOCS: OnceLock<Mutex<HashMap<u64, usize>>> = OnceLock::new();

fn lock_allocs(map: &Mutex<HashMap<u64, usize>>) -> MutexGuard<'_, HashMap<u64, usize>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn set_device(device: Device) -> Result<()> {
    if device.0 < 0 || device.0 as usize >= STUB_DEVICE_COUNT {
        return Err(Error::invalid_arg(
            "device",
            format!("id {} out of range (stub has {})", device.0, STUB_DEVICE_COUNT),
        ));
    }
    CURRENT_DEVICE.store(device.0, Ordering::SeqCst);
    Ok(())
}

pub(crate) fn get_device() -> Result<Device> {
    Ok(Device(CURRENT_DEVICE.load(Ordering::SeqCst)))
}

pub(crate) fn device_count() -> Result<usize> {
    Ok(STUB_DEVICE_COUNT)
}

pub(crate) fn malloc(bytes: usize) -> Result<u64> {
    if bytes == 0 {
        return Ok(0);
    }
    let layout = AllocLayout::from_size_align(bytes, ALLOC_ALIGN)
        .map_err(|_| Error::OutOfMemory { size: bytes })?;
    let ptr = unsafe { alloc_zeroed(layout) };
    if ptr.is_null() {
        return Err(Error::OutOfMemory { size: bytes });
    }
    let map = ALLOCS.get_or_init(|| Mutex::new(HashMap::new()));
    lock_allocs(map).insert(ptr as u64, bytes);
    Ok(ptr as u64)
}

pub(crate) fn malloc_pinned(bytes: usize) -> Result<u64> {
    malloc(bytes)
}

pub(crate) fn free(ptr: u64) -> Result<()> {
    if ptr == 0 {
        return Ok(());
    }
    let map = ALLOCS.get_or_init(|| Mutex::new(HashMap::new()));
    let bytes = lock_allocs(map).remove(&ptr).ok_or_else(|| {
        Error::invalid_arg("ptr", format!("0x{ptr:x} is not a live stub allocation"))
    })?;
    // from_size_align succeeded at allocation time
    let layout = AllocLayout::from_size_align(bytes, ALLOC_ALIGN)
        .map_err(|_| Error::invalid_arg("ptr", "corrupt allocation record"))?;
    unsafe { dealloc(ptr as *mut u8, layout) };
    Ok(())
}

pub(crate) fn free_pinned(ptr: u64) -> Result<()> {
    free(ptr)
}

/// Whether the batched dispatcher may fork for `routine` on this backend.
///
/// Capability hook for backends whose runtime mis-schedules a routine
/// across independent streams. The stub schedules nothing, so everything
/// may fork.
pub(crate) fn fork_allowed(_routine: Routine) -> bool {
    true
}

// ============================================================================
// Queue implementation
// ============================================================================

/// Stub queue internals: a virtual stream cursor plus the operation log.
pub(crate) struct StubQueue {
    #[allow(dead_code)]
    device: Device,
    current: StreamId,
    ops: Mutex<Vec<OpRecord>>,
}

pub(crate) use StubQueue as QueueImpl;

impl StubQueue {
    pub(crate) fn new(device: Device) -> Result<Self> {
        if device.0 < 0 || device.0 as usize >= STUB_DEVICE_COUNT {
            return Err(Error::invalid_arg(
                "device",
                format!("id {} out of range (stub has {})", device.0, STUB_DEVICE_COUNT),
            ));
        }
        Ok(Self {
            device,
            current: StreamId::Default,
            ops: Mutex::new(Vec::new()),
        })
    }

    fn record(&self, name: &'static str, bytes: usize, detail: String) {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(OpRecord {
                name,
                stream: self.current,
                bytes,
                detail,
            });
    }

    /// Record a forwarded BLAS call on the current virtual stream.
    pub(crate) fn blas_call(&self, name: &'static str, detail: String) {
        self.record(name, 0, detail);
    }

    pub(crate) fn ops(&self) -> Vec<OpRecord> {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn clear_ops(&self) {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub(crate) fn sync_all(&self) -> Result<()> {
        self.record("sync", 0, String::new());
        Ok(())
    }

    pub(crate) fn fork_streams(&mut self) -> Result<()> {
        self.record("fork", 0, String::new());
        Ok(())
    }

    pub(crate) fn join_streams(&mut self) -> Result<()> {
        self.record("join", 0, String::new());
        Ok(())
    }

    pub(crate) fn activate_stream(&mut self, index: Option<usize>) -> Result<()> {
        self.current = match index {
            Some(i) => StreamId::Parallel(i),
            None => StreamId::Default,
        };
        Ok(())
    }

    pub(crate) fn memcpy_async(
        &self,
        dst: u64,
        src: u64,
        bytes: usize,
        _kind: MemcpyKind,
    ) -> Result<()> {
        if bytes > 0 {
            // Everything is host memory here; all directions are one copy.
            unsafe {
                std::ptr::copy_nonoverlapping(src as *const u8, dst as *mut u8, bytes);
            }
        }
        self.record("memcpy", bytes, String::new());
        Ok(())
    }

    pub(crate) fn memset_async(&self, ptr: u64, value: u8, bytes: usize) -> Result<()> {
        if bytes > 0 {
            unsafe {
                std::ptr::write_bytes(ptr as *mut u8, value, bytes);
            }
        }
        self.record("memset", bytes, String::new());
        Ok(())
    }

    pub(crate) fn malloc(&self, bytes: usize) -> Result<u64> {
        malloc(bytes)
    }

    pub(crate) fn free(&self, ptr: u64) -> Result<()> {
        free(ptr)
    }
}
