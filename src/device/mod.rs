//! Device selection, memory movement, and the execution [`Queue`]
//!
//! This module defines the backend-independent device surface: an opaque
//! [`Device`] id, process-global current-device state, allocation and
//! copy/set primitives, and the strided 2D/1D host↔device helpers.
//!
//! Exactly one backend is compiled in, selected by feature:
//!
//! - `cuda`: NVIDIA GPUs via cudarc (driver API + cuBLAS)
//! - `stub` (default): an instrumented host simulation with virtual
//!   streams and an inspectable per-queue operation log
//! - neither: every device-dependent call fails with
//!   [`Error::NotAvailable`](crate::Error::NotAvailable)
//!
//! The public shape is identical regardless of which backend is active.

mod queue;

pub use queue::{Queue, DEFAULT_BATCH_LIMIT, FORK_POOL_SIZE};

#[cfg(feature = "cuda")]
pub(crate) mod cuda;
#[cfg(all(feature = "stub", not(feature = "cuda")))]
pub mod stub;
#[cfg(not(any(feature = "cuda", feature = "stub")))]
pub(crate) mod none;

#[cfg(feature = "cuda")]
pub(crate) use cuda as backend;
#[cfg(all(feature = "stub", not(feature = "cuda")))]
pub(crate) use stub as backend;
#[cfg(not(any(feature = "cuda", feature = "stub")))]
pub(crate) use none as backend;

use crate::error::{Error, Result};
use crate::scalar::Scalar;
use crate::types::MemcpyKind;

/// An opaque, process-scoped accelerator identifier.
///
/// Device ids are small non-negative integers assigned by the backend.
/// The id is immutable once obtained and is not tied to any queue's
/// lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Device(pub(crate) i32);

impl Device {
    /// Create a device id. No backend call is made; validity is checked
    /// when the id is first used (queue construction, `set_device`).
    pub fn new(id: i32) -> Self {
        Device(id)
    }

    /// The backend-assigned numeric id.
    pub fn id(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "device:{}", self.0)
    }
}

// ============================================================================
// Process-global device state
// ============================================================================

/// Make `device` the process-wide current device.
///
/// Allocation calls that take no explicit queue read this state at call
/// time. Tests that change it should reset it to avoid cross-test
/// leakage.
pub fn set_device(device: Device) -> Result<()> {
    backend::set_device(device)
}

/// The process-wide current device.
pub fn get_device() -> Result<Device> {
    backend::get_device()
}

/// Number of devices the backend exposes.
pub fn device_count() -> Result<usize> {
    backend::device_count()
}

// ============================================================================
// Allocation
// ============================================================================

fn alloc_bytes<T>(nelements: usize) -> Result<usize> {
    nelements
        .checked_mul(std::mem::size_of::<T>())
        .ok_or_else(|| Error::invalid_arg("nelements", "allocation size overflows usize"))
}

/// Allocate `nelements` elements of `T` on the current device.
///
/// Returns an opaque device address. Allocation failures are always
/// recoverable errors ([`Error::OutOfMemory`]), independent of the
/// compiled error policy.
pub fn device_malloc<T: Scalar>(nelements: usize) -> Result<u64> {
    backend::malloc(alloc_bytes::<T>(nelements)?)
}

/// Allocate `nelements` elements of `T` on `queue`'s device.
pub fn device_malloc_on<T: Scalar>(nelements: usize, queue: &Queue) -> Result<u64> {
    set_device(queue.device())?;
    queue.imp().malloc(alloc_bytes::<T>(nelements)?)
}

/// Allocate `nelements` elements of `T` in pinned (page-locked) host
/// memory on the current device context.
pub fn device_malloc_pinned<T: Scalar>(nelements: usize) -> Result<u64> {
    backend::malloc_pinned(alloc_bytes::<T>(nelements)?)
}

/// Free a device allocation obtained from [`device_malloc`] or
/// [`device_malloc_on`].
pub fn device_free(ptr: u64) -> Result<()> {
    backend::free(ptr)
}

/// Free a device allocation on `queue`'s device.
pub fn device_free_on(ptr: u64, queue: &Queue) -> Result<()> {
    set_device(queue.device())?;
    queue.imp().free(ptr)
}

/// Free a pinned host allocation obtained from [`device_malloc_pinned`].
pub fn device_free_pinned(ptr: u64) -> Result<()> {
    backend::free_pinned(ptr)
}

// ============================================================================
// Copy / set primitives
// ============================================================================

/// Asynchronously copy `nelements` elements of `T` from `src` to `dst`
/// on `queue`'s current stream.
///
/// `kind` names the direction; [`MemcpyKind::Default`] lets the backend
/// infer it from the addresses. The copy is ordered within the current
/// stream only; call [`Queue::sync`] before reading the destination from
/// the host.
pub fn device_memcpy<T: Scalar>(
    dst: u64,
    src: u64,
    nelements: usize,
    kind: MemcpyKind,
    queue: &Queue,
) -> Result<()> {
    queue
        .imp()
        .memcpy_async(dst, src, alloc_bytes::<T>(nelements)?, kind)
}

/// Asynchronously fill `nelements` elements of `T` at `ptr` with the
/// byte `value` on `queue`'s current stream.
pub fn device_memset<T: Scalar>(ptr: u64, value: u8, nelements: usize, queue: &Queue) -> Result<()> {
    queue
        .imp()
        .memset_async(ptr, value, alloc_bytes::<T>(nelements)?)
}

// ============================================================================
// Strided 2D / 1D transfers
// ============================================================================
//
// Both leading dimensions equal to the row count means the block is
// contiguous and collapses to one bulk copy; otherwise one copy per
// column is issued. Correct for any leading dimension >= the row count
// (padded buffers).

fn check_matrix_args<T>(m: usize, n: usize, ldh: usize, ldd: usize, host_len: usize) -> Result<()> {
    if ldh < m.max(1) {
        return Err(Error::invalid_arg(
            "ldh",
            format!("leading dimension {} < row count {}", ldh, m),
        ));
    }
    if ldd < m.max(1) {
        return Err(Error::invalid_arg(
            "ldd",
            format!("leading dimension {} < row count {}", ldd, m),
        ));
    }
    if m > 0 && n > 0 && host_len < (n - 1) * ldh + m {
        return Err(Error::invalid_arg(
            "host",
            format!(
                "buffer holds {} elements, need {} for {}x{} with ld {}",
                host_len,
                (n - 1) * ldh + m,
                m,
                n,
                ldh
            ),
        ));
    }
    Ok(())
}

fn copy_matrix(
    m: usize,
    n: usize,
    src: u64,
    lds: usize,
    dst: u64,
    ldd: usize,
    elem: usize,
    kind: MemcpyKind,
    queue: &Queue,
) -> Result<()> {
    if m == 0 || n == 0 {
        return Ok(());
    }
    if lds == m && ldd == m {
        // contiguous block, one bulk copy
        queue.imp().memcpy_async(dst, src, m * n * elem, kind)
    } else {
        for j in 0..n {
            queue.imp().memcpy_async(
                dst + (j * ldd * elem) as u64,
                src + (j * lds * elem) as u64,
                m * elem,
                kind,
            )?;
        }
        Ok(())
    }
}

/// Copy an `m`-by-`n` column-major matrix from host to device.
///
/// `ldh`/`ldd` are the host/device leading dimensions (>= `m`).
pub fn device_setmatrix<T: Scalar>(
    m: usize,
    n: usize,
    host: &[T],
    ldh: usize,
    dev: u64,
    ldd: usize,
    queue: &Queue,
) -> Result<()> {
    check_matrix_args::<T>(m, n, ldh, ldd, host.len())?;
    copy_matrix(
        m,
        n,
        host.as_ptr() as u64,
        ldh,
        dev,
        ldd,
        std::mem::size_of::<T>(),
        MemcpyKind::HostToDevice,
        queue,
    )
}

/// Copy an `m`-by-`n` column-major matrix from device to host.
pub fn device_getmatrix<T: Scalar>(
    m: usize,
    n: usize,
    dev: u64,
    ldd: usize,
    host: &mut [T],
    ldh: usize,
    queue: &Queue,
) -> Result<()> {
    check_matrix_args::<T>(m, n, ldh, ldd, host.len())?;
    copy_matrix(
        m,
        n,
        dev,
        ldd,
        host.as_mut_ptr() as u64,
        ldh,
        std::mem::size_of::<T>(),
        MemcpyKind::DeviceToHost,
        queue,
    )
}

fn check_vector_args<T>(n: usize, inch: usize, incd: usize, host_len: usize) -> Result<()> {
    if inch < 1 {
        return Err(Error::invalid_arg("inch", "stride must be >= 1"));
    }
    if incd < 1 {
        return Err(Error::invalid_arg("incd", "stride must be >= 1"));
    }
    if n > 0 && host_len < (n - 1) * inch + 1 {
        return Err(Error::invalid_arg(
            "host",
            format!(
                "buffer holds {} elements, need {} for n={} with stride {}",
                host_len,
                (n - 1) * inch + 1,
                n,
                inch
            ),
        ));
    }
    Ok(())
}

fn copy_vector(
    n: usize,
    src: u64,
    incs: usize,
    dst: u64,
    incd: usize,
    elem: usize,
    kind: MemcpyKind,
    queue: &Queue,
) -> Result<()> {
    if n == 0 {
        return Ok(());
    }
    if incs == 1 && incd == 1 {
        queue.imp().memcpy_async(dst, src, n * elem, kind)
    } else {
        for i in 0..n {
            queue.imp().memcpy_async(
                dst + (i * incd * elem) as u64,
                src + (i * incs * elem) as u64,
                elem,
                kind,
            )?;
        }
        Ok(())
    }
}

/// Copy `n` elements with strides `inch` (host) and `incd` (device) from
/// host to device.
pub fn device_setvector<T: Scalar>(
    n: usize,
    host: &[T],
    inch: usize,
    dev: u64,
    incd: usize,
    queue: &Queue,
) -> Result<()> {
    check_vector_args::<T>(n, inch, incd, host.len())?;
    copy_vector(
        n,
        host.as_ptr() as u64,
        inch,
        dev,
        incd,
        std::mem::size_of::<T>(),
        MemcpyKind::HostToDevice,
        queue,
    )
}

/// Copy `n` elements with strides `incd` (device) and `inch` (host) from
/// device to host.
pub fn device_getvector<T: Scalar>(
    n: usize,
    dev: u64,
    incd: usize,
    host: &mut [T],
    inch: usize,
    queue: &Queue,
) -> Result<()> {
    check_vector_args::<T>(n, inch, incd, host.len())?;
    copy_vector(
        n,
        dev,
        incd,
        host.as_mut_ptr() as u64,
        inch,
        std::mem::size_of::<T>(),
        MemcpyKind::DeviceToHost,
        queue,
    )
}
