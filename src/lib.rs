//! blasq: portable device execution queues and batched level-3 BLAS
//!
//! The crate has three layers:
//!
//! - [`device`]: device selection, memory allocation and movement, and
//!   the [`Queue`] abstraction (one default stream, a fixed pool of
//!   parallel streams, a monotonically growing scratch workspace);
//! - [`blas`]: thin single-call forwarding wrappers, one asynchronous
//!   vendor-library call per routine, uniform over column- and
//!   row-major layouts;
//! - [`batch`]: batched dispatch with broadcast-or-per-item slice
//!   arguments, per-item validation codes, and fork/revolve/join
//!   multiplexing over the queue's stream pool.
//!
//! # Backends
//!
//! Exactly one backend is compiled in:
//!
//! - `cuda`: NVIDIA GPUs through cudarc (CUDA driver API + cuBLAS);
//! - `stub` (default): an instrumented host simulation whose queues log
//!   every operation for inspection, used by the integration tests;
//! - neither: the API keeps its shape and every device call fails with
//!   [`Error::NotAvailable`].
//!
//! # Error policy
//!
//! Backend call failures are recoverable [`Error::Device`] values by
//! default. The `error-abort` feature prints the failing call and
//! aborts instead; `error-unchecked` discards outcomes. Usage errors
//! and allocation failures are always recoverable, under every policy.
//!
//! # Example
//!
//! ```no_run
//! use blasq::{batch, Device, Layout, Op, Queue};
//!
//! fn scaled_products(ptrs_a: &[u64], ptrs_b: &[u64], ptrs_c: &[u64]) -> blasq::Result<()> {
//!     let mut queue = Queue::new(Device::new(0))?;
//!     let mut info = vec![0i64; ptrs_a.len()];
//!     batch::gemm(
//!         Layout::ColMajor,
//!         &[Op::NoTrans],
//!         &[Op::NoTrans],
//!         &[64],
//!         &[64],
//!         &[64],
//!         &[1.0f32],
//!         ptrs_a,
//!         &[64],
//!         ptrs_b,
//!         &[64],
//!         &[0.0f32],
//!         ptrs_c,
//!         &[64],
//!         ptrs_a.len(),
//!         &mut info,
//!         &mut queue,
//!     )?;
//!     queue.sync()
//! }
//! ```

#![warn(missing_docs)]

pub mod batch;
pub mod blas;
pub mod device;
pub mod error;
pub mod scalar;
pub mod types;

pub use device::{
    device_count, get_device, set_device, Device, Queue, DEFAULT_BATCH_LIMIT, FORK_POOL_SIZE,
};
pub use error::{Error, Result};
pub use scalar::Scalar;
pub use types::{Diag, Layout, MemcpyKind, Op, Side, Uplo};

#[cfg(all(feature = "stub", not(feature = "cuda")))]
pub use device::stub::{OpRecord, StreamId, STUB_DEVICE_COUNT};
