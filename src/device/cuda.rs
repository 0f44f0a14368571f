//! CUDA backend via cudarc (driver API + cuBLAS)
//!
//! Contexts are cached per device (creating a context is expensive and
//! they are process-wide anyway). Resource lifetimes ride on cudarc's
//! safe types; the per-operation calls go through `driver::sys` /
//! `cublas::sys` so every status passes the error-policy choke point.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use cudarc::cublas::{sys as cb, CudaBlas};
use cudarc::driver::safe::{CudaContext, CudaEvent, CudaStream};
use cudarc::driver::sys as cu;

use crate::batch::Routine;
use crate::device::queue::FORK_POOL_SIZE;
use crate::device::Device;
use crate::error::{device_check, Error, Result};
use crate::types::{Diag, MemcpyKind, Op, Side, Uplo};

// ============================================================================
// Context cache and current-device state
// ============================================================================

/// Per-device context cache: device id -> live context.
static CONTEXTS: OnceLock<Mutex<HashMap<i32, Arc<CudaContext>>>> = OnceLock::new();

static CURRENT_DEVICE: AtomicI32 = AtomicI32::new(0);

fn lock_contexts(
    cache: &Mutex<HashMap<i32, Arc<CudaContext>>>,
) -> MutexGuard<'_, HashMap<i32, Arc<CudaContext>>> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Get or create the cached context for a device.
fn context_for(device: Device) -> Result<Arc<CudaContext>> {
    let cache = CONTEXTS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = lock_contexts(cache);
    if let Some(ctx) = guard.get(&device.0) {
        return Ok(ctx.clone());
    }
    let ctx = CudaContext::new(device.0 as usize).map_err(|e| Error::Device {
        func: "cuCtxCreate",
        message: format!("device {}: {:?}", device.0, e),
    })?;
    guard.insert(device.0, ctx.clone());
    Ok(ctx)
}

pub(crate) fn set_device(device: Device) -> Result<()> {
    let ctx = context_for(device)?;
    ctx.bind_to_thread().map_err(|e| Error::Device {
        func: "cuCtxSetCurrent",
        message: format!("{:?}", e),
    })?;
    CURRENT_DEVICE.store(device.0, Ordering::SeqCst);
    Ok(())
}

pub(crate) fn get_device() -> Result<Device> {
    Ok(Device(CURRENT_DEVICE.load(Ordering::SeqCst)))
}

pub(crate) fn device_count() -> Result<usize> {
    let n = cudarc::driver::result::device::get_count().map_err(|e| Error::Device {
        func: "cuDeviceGetCount",
        message: format!("{:?}", e),
    })?;
    Ok(n as usize)
}

pub(crate) fn malloc(bytes: usize) -> Result<u64> {
    set_device(get_device()?)?;
    if bytes == 0 {
        return Ok(0);
    }
    unsafe {
        let mut ptr: u64 = 0;
        let result = cu::cuMemAlloc_v2(&mut ptr, bytes);
        if result != cu::CUresult::CUDA_SUCCESS {
            return Err(Error::OutOfMemory { size: bytes });
        }
        Ok(ptr)
    }
}

pub(crate) fn malloc_pinned(bytes: usize) -> Result<u64> {
    set_device(get_device()?)?;
    if bytes == 0 {
        return Ok(0);
    }
    unsafe {
        let mut ptr: *mut std::ffi::c_void = std::ptr::null_mut();
        let result = cu::cuMemAllocHost_v2(&mut ptr, bytes);
        if result != cu::CUresult::CUDA_SUCCESS {
            return Err(Error::OutOfMemory { size: bytes });
        }
        Ok(ptr as u64)
    }
}

pub(crate) fn free(ptr: u64) -> Result<()> {
    if ptr == 0 {
        return Ok(());
    }
    let result = unsafe { cu::cuMemFree_v2(ptr) };
    device_check("cuMemFree", result != cu::CUresult::CUDA_SUCCESS, || {
        format!("{:?}", result)
    })
}

pub(crate) fn free_pinned(ptr: u64) -> Result<()> {
    if ptr == 0 {
        return Ok(());
    }
    let result = unsafe { cu::cuMemFreeHost(ptr as *mut std::ffi::c_void) };
    device_check("cuMemFreeHost", result != cu::CUresult::CUDA_SUCCESS, || {
        format!("{:?}", result)
    })
}

/// Whether the batched dispatcher may fork for `routine` on this backend.
///
/// Escape hatch for runtime versions that mis-schedule a specific
/// routine across independent streams (an older ROCm runtime did this
/// for trmm); no such case is known for current CUDA runtimes.
pub(crate) fn fork_allowed(_routine: Routine) -> bool {
    true
}

// ============================================================================
// Enum conversion
// ============================================================================

pub(crate) fn op2cublas(op: Op) -> cb::cublasOperation_t {
    match op {
        Op::NoTrans => cb::cublasOperation_t::CUBLAS_OP_N,
        Op::Trans => cb::cublasOperation_t::CUBLAS_OP_T,
        Op::ConjTrans => cb::cublasOperation_t::CUBLAS_OP_C,
    }
}

pub(crate) fn side2cublas(side: Side) -> cb::cublasSideMode_t {
    match side {
        Side::Left => cb::cublasSideMode_t::CUBLAS_SIDE_LEFT,
        Side::Right => cb::cublasSideMode_t::CUBLAS_SIDE_RIGHT,
    }
}

pub(crate) fn uplo2cublas(uplo: Uplo) -> cb::cublasFillMode_t {
    match uplo {
        Uplo::Upper => cb::cublasFillMode_t::CUBLAS_FILL_MODE_UPPER,
        Uplo::Lower => cb::cublasFillMode_t::CUBLAS_FILL_MODE_LOWER,
    }
}

pub(crate) fn diag2cublas(diag: Diag) -> cb::cublasDiagType_t {
    match diag {
        Diag::NonUnit => cb::cublasDiagType_t::CUBLAS_DIAG_NON_UNIT,
        Diag::Unit => cb::cublasDiagType_t::CUBLAS_DIAG_UNIT,
    }
}

/// Route a cuBLAS status through the error policy.
pub(crate) fn check_cublas(func: &'static str, status: cb::cublasStatus_t) -> Result<()> {
    device_check(
        func,
        status != cb::cublasStatus_t::CUBLAS_STATUS_SUCCESS,
        || format!("{:?}", status),
    )
}

// ============================================================================
// Queue implementation
// ============================================================================

/// CUDA queue internals: default + parallel streams, the fork/join
/// events, and the cuBLAS handle bound to the current stream.
pub(crate) struct CudaQueue {
    device: Device,
    #[allow(dead_code)]
    context: Arc<CudaContext>,
    default_stream: Arc<CudaStream>,
    parallel_streams: Vec<Arc<CudaStream>>,
    default_event: CudaEvent,
    parallel_events: Vec<CudaEvent>,
    cublas: CudaBlas,
    // None = default stream
    current: Option<usize>,
}

pub(crate) use CudaQueue as QueueImpl;

impl CudaQueue {
    pub(crate) fn new(device: Device) -> Result<Self> {
        set_device(device)?;
        let context = context_for(device)?;

        let new_stream = |what: &'static str| -> Result<Arc<CudaStream>> {
            context.new_stream().map_err(|e| Error::Device {
                func: what,
                message: format!("{:?}", e),
            })
        };
        let new_event = || -> Result<CudaEvent> {
            context.new_event(None).map_err(|e| Error::Device {
                func: "cuEventCreate",
                message: format!("{:?}", e),
            })
        };

        let default_stream = new_stream("cuStreamCreate")?;
        let mut parallel_streams = Vec::with_capacity(FORK_POOL_SIZE);
        let mut parallel_events = Vec::with_capacity(FORK_POOL_SIZE);
        for _ in 0..FORK_POOL_SIZE {
            parallel_streams.push(new_stream("cuStreamCreate")?);
            parallel_events.push(new_event()?);
        }
        let default_event = new_event()?;

        let cublas = CudaBlas::new(default_stream.clone()).map_err(|e| Error::Device {
            func: "cublasCreate",
            message: format!("{:?}", e),
        })?;

        Ok(Self {
            device,
            context,
            default_stream,
            parallel_streams,
            default_event,
            parallel_events,
            cublas,
            current: None,
        })
    }

    fn current_stream(&self) -> &Arc<CudaStream> {
        match self.current {
            Some(i) => &self.parallel_streams[i],
            None => &self.default_stream,
        }
    }

    /// The cuBLAS handle, bound to the current stream.
    pub(crate) fn cublas_handle(&self) -> cb::cublasHandle_t {
        *self.cublas.handle()
    }

    #[allow(dead_code)]
    pub(crate) fn device(&self) -> Device {
        self.device
    }

    pub(crate) fn sync_all(&self) -> Result<()> {
        self.default_stream
            .synchronize()
            .map_err(|e| Error::Device {
                func: "cuStreamSynchronize",
                message: format!("{:?}", e),
            })?;
        for s in &self.parallel_streams {
            s.synchronize().map_err(|e| Error::Device {
                func: "cuStreamSynchronize",
                message: format!("{:?}", e),
            })?;
        }
        Ok(())
    }

    pub(crate) fn fork_streams(&mut self) -> Result<()> {
        // Order prior default-stream work before anything issued on the
        // pool: record once, make every parallel stream wait.
        self.default_event
            .record(&self.default_stream)
            .map_err(|e| Error::Device {
                func: "cuEventRecord",
                message: format!("{:?}", e),
            })?;
        for s in &self.parallel_streams {
            s.wait(&self.default_event).map_err(|e| Error::Device {
                func: "cuStreamWaitEvent",
                message: format!("{:?}", e),
            })?;
        }
        Ok(())
    }

    pub(crate) fn join_streams(&mut self) -> Result<()> {
        // Device-side barrier: the default stream waits on one event per
        // parallel stream; the host does not block.
        for (s, e) in self.parallel_streams.iter().zip(&self.parallel_events) {
            e.record(s).map_err(|err| Error::Device {
                func: "cuEventRecord",
                message: format!("{:?}", err),
            })?;
            self.default_stream.wait(e).map_err(|err| Error::Device {
                func: "cuStreamWaitEvent",
                message: format!("{:?}", err),
            })?;
        }
        Ok(())
    }

    pub(crate) fn activate_stream(&mut self, index: Option<usize>) -> Result<()> {
        self.current = index;
        let status = unsafe {
            cb::cublasSetStream_v2(self.cublas_handle(), self.current_stream().cu_stream())
        };
        check_cublas("cublasSetStream", status)
    }

    pub(crate) fn memcpy_async(
        &self,
        dst: u64,
        src: u64,
        bytes: usize,
        kind: MemcpyKind,
    ) -> Result<()> {
        if bytes == 0 {
            return Ok(());
        }
        let stream = self.current_stream().cu_stream();
        let (func, result) = unsafe {
            match kind {
                MemcpyKind::HostToDevice => (
                    "cuMemcpyHtoDAsync",
                    cu::cuMemcpyHtoDAsync_v2(dst, src as *const std::ffi::c_void, bytes, stream),
                ),
                MemcpyKind::DeviceToHost => (
                    "cuMemcpyDtoHAsync",
                    cu::cuMemcpyDtoHAsync_v2(dst as *mut std::ffi::c_void, src, bytes, stream),
                ),
                MemcpyKind::DeviceToDevice => (
                    "cuMemcpyDtoDAsync",
                    cu::cuMemcpyDtoDAsync_v2(dst, src, bytes, stream),
                ),
                // Unified addressing resolves the direction.
                MemcpyKind::HostToHost | MemcpyKind::Default => {
                    ("cuMemcpyAsync", cu::cuMemcpyAsync(dst, src, bytes, stream))
                }
            }
        };
        device_check(func, result != cu::CUresult::CUDA_SUCCESS, || {
            format!("{} bytes: {:?}", bytes, result)
        })
    }

    pub(crate) fn memset_async(&self, ptr: u64, value: u8, bytes: usize) -> Result<()> {
        if bytes == 0 {
            return Ok(());
        }
        let result =
            unsafe { cu::cuMemsetD8Async(ptr, value, bytes, self.current_stream().cu_stream()) };
        device_check("cuMemsetD8Async", result != cu::CUresult::CUDA_SUCCESS, || {
            format!("{:?}", result)
        })
    }

    pub(crate) fn malloc(&self, bytes: usize) -> Result<u64> {
        set_device(self.device)?;
        if bytes == 0 {
            return Ok(0);
        }
        unsafe {
            let mut ptr: u64 = 0;
            let result = cu::cuMemAlloc_v2(&mut ptr, bytes);
            if result != cu::CUresult::CUDA_SUCCESS {
                return Err(Error::OutOfMemory { size: bytes });
            }
            Ok(ptr)
        }
    }

    pub(crate) fn free(&self, ptr: u64) -> Result<()> {
        free(ptr)
    }
}
