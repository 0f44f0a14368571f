//! Batched level-3 BLAS dispatch
//!
//! Each routine here takes slice-valued arguments: a slice of length 1
//! broadcasts one value to every item, a slice of length `batch` supplies
//! a value per item. Any mix of broadcast and per-item arguments is
//! allowed within one call.
//!
//! # Validation and the `info` slice
//!
//! The length of `info` selects the validation mode:
//!
//! - `0`: no per-item argument validation; every item is dispatched;
//! - `1`: arguments are validated, `info[0]` receives the code of the
//!   first malformed item (or 0), and malformed items are skipped;
//! - `batch`: per-item codes, one slot per item; malformed items are
//!   skipped, well-formed siblings still run.
//!
//! A nonzero code is the negated 1-based position of the first offending
//! argument in the routine's signature (the layout argument is position
//! 1). Any other `info` length is an immediate usage error.
//!
//! # Scheduling
//!
//! Items are independent, so the dispatcher forks the queue's parallel
//! stream pool, issues one forwarded call per item, and revolves the
//! round-robin cursor between items; a device-side join orders all of it
//! before subsequent default-stream work. Backends may veto forking for
//! a specific routine, in which case every item runs on the default
//! stream in issue order.

mod check;
mod gemm;
mod rank_update;
mod symm;
mod triangular;

pub use gemm::gemm;
pub use rank_update::{her2k, herk, syr2k, syrk};
pub use symm::{hemm, symm};
pub use triangular::{trmm, trsm};

use crate::device::{backend, set_device, Queue};
use crate::error::{Error, Result};

/// Routine tag handed to the backend fork-capability hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Routine {
    Gemm,
    Symm,
    Hemm,
    Syrk,
    Herk,
    Syr2k,
    Her2k,
    Trmm,
    Trsm,
}

/// Broadcast-aware item access: a length-1 slice supplies every item.
pub(crate) fn extract<T: Copy>(v: &[T], i: usize) -> T {
    if v.len() == 1 {
        v[0]
    } else {
        v[i]
    }
}

/// `info` must have length 0, 1, or `batch`.
pub(crate) fn check_info_size(info: &[i64], batch: usize) -> Result<()> {
    let len = info.len();
    if len == 0 || len == 1 || len == batch {
        Ok(())
    } else {
        Err(Error::invalid_arg(
            "info",
            format!("length {len} must be 0, 1, or batch ({batch})"),
        ))
    }
}

/// Every slice argument must have length 1 (broadcast) or `batch`.
pub(crate) fn check_param_len(arg: &'static str, len: usize, batch: usize) -> Result<()> {
    if len == 1 || len == batch {
        Ok(())
    } else {
        Err(Error::invalid_arg(
            arg,
            format!("length {len} must be 1 or batch ({batch})"),
        ))
    }
}

/// Per-call batch size cap carried by the queue.
pub(crate) fn check_batch(batch: usize, queue: &Queue) -> Result<()> {
    if batch > queue.batch_limit() {
        Err(Error::invalid_arg(
            "batch",
            format!("{batch} exceeds queue batch limit {}", queue.batch_limit()),
        ))
    } else {
        Ok(())
    }
}

/// Write per-item validation codes into the caller's `info` slice.
///
/// With a single shared slot, the first nonzero code wins.
pub(crate) fn publish_info(info: &mut [i64], codes: &[i64]) {
    if info.len() == 1 {
        info[0] = codes.iter().copied().find(|&c| c != 0).unwrap_or(0);
    } else {
        info.copy_from_slice(codes);
    }
}

/// Fork/revolve/join driver shared by every batched routine.
///
/// Items whose validation code is nonzero are skipped. The pool is
/// always rejoined, even when an item fails mid-batch, so the queue is
/// back in default mode before the error propagates.
pub(crate) fn dispatch<F>(
    queue: &mut Queue,
    routine: Routine,
    batch: usize,
    codes: Option<&[i64]>,
    mut item: F,
) -> Result<()>
where
    F: FnMut(usize, &Queue) -> Result<()>,
{
    set_device(queue.device())?;

    let fork = backend::fork_allowed(routine);
    if fork {
        queue.fork()?;
    }

    let mut result = Ok(());
    for i in 0..batch {
        if codes.is_some_and(|c| c[i] != 0) {
            continue;
        }
        if let Err(e) = item(i, queue) {
            result = Err(e);
            break;
        }
        if let Err(e) = queue.revolve() {
            result = Err(e);
            break;
        }
    }

    if fork {
        queue.join()?;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_broadcasts_single_element() {
        let one = [7i64];
        let many = [1i64, 2, 3];
        assert_eq!(extract(&one, 2), 7);
        assert_eq!(extract(&many, 2), 3);
    }

    #[test]
    fn info_size_must_be_zero_one_or_batch() {
        assert!(check_info_size(&[], 5).is_ok());
        assert!(check_info_size(&[0], 5).is_ok());
        assert!(check_info_size(&[0; 5], 5).is_ok());
        assert!(check_info_size(&[0; 3], 5).is_err());
    }

    #[test]
    fn shared_info_slot_takes_first_failure() {
        let mut info = [0i64];
        publish_info(&mut info, &[0, 0, -4, -5]);
        assert_eq!(info[0], -4);

        let mut info = [0i64];
        publish_info(&mut info, &[0, 0, 0]);
        assert_eq!(info[0], 0);
    }
}
