//! Single-call device BLAS forwarding wrappers
//!
//! One asynchronous call per routine, issued on the queue's *current*
//! stream. These are the per-item primitives the batched dispatcher
//! invokes; the numeric work itself is performed by the vendor library
//! (or recorded by the stub backend).
//!
//! Row-major calls are reflected into the column-major form vendor
//! libraries expect (operate on the transposed problem); callers see
//! either layout uniformly.
//!
//! Returning from a wrapper means the call was issued, not that it
//! finished; synchronize the queue before reading results on the host.

use crate::device::Queue;
use crate::error::{Error, Result};
use crate::scalar::Scalar;
use crate::types::{Diag, Layout, Op, Side, Uplo};

#[cfg(feature = "cuda")]
use crate::device::cuda::{check_cublas, diag2cublas, op2cublas, side2cublas, uplo2cublas};

/// Hermitian row-major reflection: conjugate-transpose flips against
/// no-transpose (plain transpose is not a valid Hermitian op argument).
#[cfg(feature = "cuda")]
fn conj_swap(op: Op) -> Op {
    match op {
        Op::NoTrans => Op::ConjTrans,
        _ => Op::NoTrans,
    }
}

/// Vendor BLAS interfaces take 32-bit dimensions; any dimension or
/// leading dimension that cannot survive the narrowing is a usage
/// error, checked on every backend before the call is issued.
fn check_dims(dims: &[(&'static str, i64)]) -> Result<()> {
    for &(arg, value) in dims {
        if i32::try_from(value).is_err() {
            return Err(Error::invalid_arg(
                arg,
                format!("{value} exceeds the 32-bit device BLAS interface"),
            ));
        }
    }
    Ok(())
}

/// General matrix multiply: C = alpha * op(A) * op(B) + beta * C.
#[allow(clippy::too_many_arguments)]
pub fn gemm<T: Scalar>(
    layout: Layout,
    transa: Op,
    transb: Op,
    m: i64,
    n: i64,
    k: i64,
    alpha: T,
    a: u64,
    lda: i64,
    b: u64,
    ldb: i64,
    beta: T,
    c: u64,
    ldc: i64,
    queue: &Queue,
) -> Result<()> {
    check_dims(&[
        ("m", m),
        ("n", n),
        ("k", k),
        ("lda", lda),
        ("ldb", ldb),
        ("ldc", ldc),
    ])?;
    #[cfg(all(feature = "stub", not(feature = "cuda")))]
    {
        queue.imp().blas_call(
            "gemm",
            format!(
                "transa={transa:?} transb={transb:?} m={m} n={n} k={k} \
                 alpha={alpha} beta={beta} lda={lda} ldb={ldb} ldc={ldc}"
            ),
        );
        let _ = (layout, a, b, c);
        return Ok(());
    }
    #[cfg(feature = "cuda")]
    {
        // Row-major: compute C^T = op(B)^T op(A)^T.
        let (transa, transb, m, n, a, lda, b, ldb) = match layout {
            Layout::ColMajor => (transa, transb, m, n, a, lda, b, ldb),
            Layout::RowMajor => (transb, transa, n, m, b, ldb, a, lda),
        };
        let status = unsafe {
            T::cublas_gemm(
                queue.imp().cublas_handle(),
                op2cublas(transa),
                op2cublas(transb),
                m as i32,
                n as i32,
                k as i32,
                alpha,
                a,
                lda as i32,
                b,
                ldb as i32,
                beta,
                c,
                ldc as i32,
            )
        };
        return check_cublas("cublasGemm", status);
    }
    #[cfg(not(any(feature = "cuda", feature = "stub")))]
    {
        let _ = (
            layout, transa, transb, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc, queue,
        );
        return Err(Error::NotAvailable { func: "gemm" });
    }
}

/// Symmetric matrix multiply: C = alpha * A * B + beta * C (A symmetric,
/// applied from `side`).
#[allow(clippy::too_many_arguments)]
pub fn symm<T: Scalar>(
    layout: Layout,
    side: Side,
    uplo: Uplo,
    m: i64,
    n: i64,
    alpha: T,
    a: u64,
    lda: i64,
    b: u64,
    ldb: i64,
    beta: T,
    c: u64,
    ldc: i64,
    queue: &Queue,
) -> Result<()> {
    check_dims(&[("m", m), ("n", n), ("lda", lda), ("ldb", ldb), ("ldc", ldc)])?;
    #[cfg(all(feature = "stub", not(feature = "cuda")))]
    {
        queue.imp().blas_call(
            "symm",
            format!(
                "side={side:?} uplo={uplo:?} m={m} n={n} \
                 alpha={alpha} beta={beta} lda={lda} ldb={ldb} ldc={ldc}"
            ),
        );
        let _ = (layout, a, b, c);
        return Ok(());
    }
    #[cfg(feature = "cuda")]
    {
        let (side, uplo, m, n) = match layout {
            Layout::ColMajor => (side, uplo, m, n),
            Layout::RowMajor => (side.flipped(), uplo.flipped(), n, m),
        };
        let status = unsafe {
            T::cublas_symm(
                queue.imp().cublas_handle(),
                side2cublas(side),
                uplo2cublas(uplo),
                m as i32,
                n as i32,
                alpha,
                a,
                lda as i32,
                b,
                ldb as i32,
                beta,
                c,
                ldc as i32,
            )
        };
        return check_cublas("cublasSymm", status);
    }
    #[cfg(not(any(feature = "cuda", feature = "stub")))]
    {
        let _ = (
            layout, side, uplo, m, n, alpha, a, lda, b, ldb, beta, c, ldc, queue,
        );
        return Err(Error::NotAvailable { func: "symm" });
    }
}

/// Hermitian matrix multiply; for real scalars this is [`symm`].
#[allow(clippy::too_many_arguments)]
pub fn hemm<T: Scalar>(
    layout: Layout,
    side: Side,
    uplo: Uplo,
    m: i64,
    n: i64,
    alpha: T,
    a: u64,
    lda: i64,
    b: u64,
    ldb: i64,
    beta: T,
    c: u64,
    ldc: i64,
    queue: &Queue,
) -> Result<()> {
    check_dims(&[("m", m), ("n", n), ("lda", lda), ("ldb", ldb), ("ldc", ldc)])?;
    #[cfg(all(feature = "stub", not(feature = "cuda")))]
    {
        queue.imp().blas_call(
            "hemm",
            format!(
                "side={side:?} uplo={uplo:?} m={m} n={n} \
                 alpha={alpha} beta={beta} lda={lda} ldb={ldb} ldc={ldc}"
            ),
        );
        let _ = (layout, a, b, c);
        return Ok(());
    }
    #[cfg(feature = "cuda")]
    {
        let (side, uplo, m, n) = match layout {
            Layout::ColMajor => (side, uplo, m, n),
            Layout::RowMajor => (side.flipped(), uplo.flipped(), n, m),
        };
        let status = unsafe {
            T::cublas_hemm(
                queue.imp().cublas_handle(),
                side2cublas(side),
                uplo2cublas(uplo),
                m as i32,
                n as i32,
                alpha,
                a,
                lda as i32,
                b,
                ldb as i32,
                beta,
                c,
                ldc as i32,
            )
        };
        return check_cublas("cublasHemm", status);
    }
    #[cfg(not(any(feature = "cuda", feature = "stub")))]
    {
        let _ = (
            layout, side, uplo, m, n, alpha, a, lda, b, ldb, beta, c, ldc, queue,
        );
        return Err(Error::NotAvailable { func: "hemm" });
    }
}

/// Symmetric rank-k update: C = alpha * op(A) op(A)^T + beta * C.
#[allow(clippy::too_many_arguments)]
pub fn syrk<T: Scalar>(
    layout: Layout,
    uplo: Uplo,
    trans: Op,
    n: i64,
    k: i64,
    alpha: T,
    a: u64,
    lda: i64,
    beta: T,
    c: u64,
    ldc: i64,
    queue: &Queue,
) -> Result<()> {
    check_dims(&[("n", n), ("k", k), ("lda", lda), ("ldc", ldc)])?;
    #[cfg(all(feature = "stub", not(feature = "cuda")))]
    {
        queue.imp().blas_call(
            "syrk",
            format!(
                "uplo={uplo:?} trans={trans:?} n={n} k={k} \
                 alpha={alpha} beta={beta} lda={lda} ldc={ldc}"
            ),
        );
        let _ = (layout, a, c);
        return Ok(());
    }
    #[cfg(feature = "cuda")]
    {
        let (uplo, trans) = match layout {
            Layout::ColMajor => (uplo, trans),
            Layout::RowMajor => (uplo.flipped(), trans.swapped()),
        };
        let status = unsafe {
            T::cublas_syrk(
                queue.imp().cublas_handle(),
                uplo2cublas(uplo),
                op2cublas(trans),
                n as i32,
                k as i32,
                alpha,
                a,
                lda as i32,
                beta,
                c,
                ldc as i32,
            )
        };
        return check_cublas("cublasSyrk", status);
    }
    #[cfg(not(any(feature = "cuda", feature = "stub")))]
    {
        let _ = (layout, uplo, trans, n, k, alpha, a, lda, beta, c, ldc, queue);
        return Err(Error::NotAvailable { func: "syrk" });
    }
}

/// Hermitian rank-k update: C = alpha * op(A) op(A)^H + beta * C.
/// `alpha` and `beta` are real.
#[allow(clippy::too_many_arguments)]
pub fn herk<T: Scalar>(
    layout: Layout,
    uplo: Uplo,
    trans: Op,
    n: i64,
    k: i64,
    alpha: T::Real,
    a: u64,
    lda: i64,
    beta: T::Real,
    c: u64,
    ldc: i64,
    queue: &Queue,
) -> Result<()> {
    check_dims(&[("n", n), ("k", k), ("lda", lda), ("ldc", ldc)])?;
    #[cfg(all(feature = "stub", not(feature = "cuda")))]
    {
        queue.imp().blas_call(
            "herk",
            format!(
                "uplo={uplo:?} trans={trans:?} n={n} k={k} \
                 alpha={alpha} beta={beta} lda={lda} ldc={ldc}"
            ),
        );
        let _ = (layout, a, c);
        return Ok(());
    }
    #[cfg(feature = "cuda")]
    {
        let (uplo, trans) = match layout {
            Layout::ColMajor => (uplo, trans),
            Layout::RowMajor => (uplo.flipped(), conj_swap(trans)),
        };
        let status = unsafe {
            T::cublas_herk(
                queue.imp().cublas_handle(),
                uplo2cublas(uplo),
                op2cublas(trans),
                n as i32,
                k as i32,
                alpha,
                a,
                lda as i32,
                beta,
                c,
                ldc as i32,
            )
        };
        return check_cublas("cublasHerk", status);
    }
    #[cfg(not(any(feature = "cuda", feature = "stub")))]
    {
        let _ = (layout, uplo, trans, n, k, alpha, a, lda, beta, c, ldc, queue);
        return Err(Error::NotAvailable { func: "herk" });
    }
}

/// Symmetric rank-2k update:
/// C = alpha * (op(A) op(B)^T + op(B) op(A)^T) + beta * C.
#[allow(clippy::too_many_arguments)]
pub fn syr2k<T: Scalar>(
    layout: Layout,
    uplo: Uplo,
    trans: Op,
    n: i64,
    k: i64,
    alpha: T,
    a: u64,
    lda: i64,
    b: u64,
    ldb: i64,
    beta: T,
    c: u64,
    ldc: i64,
    queue: &Queue,
) -> Result<()> {
    check_dims(&[("n", n), ("k", k), ("lda", lda), ("ldb", ldb), ("ldc", ldc)])?;
    #[cfg(all(feature = "stub", not(feature = "cuda")))]
    {
        queue.imp().blas_call(
            "syr2k",
            format!(
                "uplo={uplo:?} trans={trans:?} n={n} k={k} \
                 alpha={alpha} beta={beta} lda={lda} ldb={ldb} ldc={ldc}"
            ),
        );
        let _ = (layout, a, b, c);
        return Ok(());
    }
    #[cfg(feature = "cuda")]
    {
        let (uplo, trans) = match layout {
            Layout::ColMajor => (uplo, trans),
            Layout::RowMajor => (uplo.flipped(), trans.swapped()),
        };
        let status = unsafe {
            T::cublas_syr2k(
                queue.imp().cublas_handle(),
                uplo2cublas(uplo),
                op2cublas(trans),
                n as i32,
                k as i32,
                alpha,
                a,
                lda as i32,
                b,
                ldb as i32,
                beta,
                c,
                ldc as i32,
            )
        };
        return check_cublas("cublasSyr2k", status);
    }
    #[cfg(not(any(feature = "cuda", feature = "stub")))]
    {
        let _ = (
            layout, uplo, trans, n, k, alpha, a, lda, b, ldb, beta, c, ldc, queue,
        );
        return Err(Error::NotAvailable { func: "syr2k" });
    }
}

/// Hermitian rank-2k update; `beta` is real.
#[allow(clippy::too_many_arguments)]
pub fn her2k<T: Scalar>(
    layout: Layout,
    uplo: Uplo,
    trans: Op,
    n: i64,
    k: i64,
    alpha: T,
    a: u64,
    lda: i64,
    b: u64,
    ldb: i64,
    beta: T::Real,
    c: u64,
    ldc: i64,
    queue: &Queue,
) -> Result<()> {
    check_dims(&[("n", n), ("k", k), ("lda", lda), ("ldb", ldb), ("ldc", ldc)])?;
    #[cfg(all(feature = "stub", not(feature = "cuda")))]
    {
        queue.imp().blas_call(
            "her2k",
            format!(
                "uplo={uplo:?} trans={trans:?} n={n} k={k} \
                 alpha={alpha} beta={beta} lda={lda} ldb={ldb} ldc={ldc}"
            ),
        );
        let _ = (layout, a, b, c);
        return Ok(());
    }
    #[cfg(feature = "cuda")]
    {
        let (uplo, trans) = match layout {
            Layout::ColMajor => (uplo, trans),
            Layout::RowMajor => (uplo.flipped(), conj_swap(trans)),
        };
        let status = unsafe {
            T::cublas_her2k(
                queue.imp().cublas_handle(),
                uplo2cublas(uplo),
                op2cublas(trans),
                n as i32,
                k as i32,
                alpha,
                a,
                lda as i32,
                b,
                ldb as i32,
                beta,
                c,
                ldc as i32,
            )
        };
        return check_cublas("cublasHer2k", status);
    }
    #[cfg(not(any(feature = "cuda", feature = "stub")))]
    {
        let _ = (
            layout, uplo, trans, n, k, alpha, a, lda, b, ldb, beta, c, ldc, queue,
        );
        return Err(Error::NotAvailable { func: "her2k" });
    }
}

/// Triangular matrix multiply, in place: B = alpha * op(A) * B
/// (or B * op(A) from the right).
#[allow(clippy::too_many_arguments)]
pub fn trmm<T: Scalar>(
    layout: Layout,
    side: Side,
    uplo: Uplo,
    trans: Op,
    diag: Diag,
    m: i64,
    n: i64,
    alpha: T,
    a: u64,
    lda: i64,
    b: u64,
    ldb: i64,
    queue: &Queue,
) -> Result<()> {
    check_dims(&[("m", m), ("n", n), ("lda", lda), ("ldb", ldb)])?;
    #[cfg(all(feature = "stub", not(feature = "cuda")))]
    {
        queue.imp().blas_call(
            "trmm",
            format!(
                "side={side:?} uplo={uplo:?} trans={trans:?} diag={diag:?} \
                 m={m} n={n} alpha={alpha} lda={lda} ldb={ldb}"
            ),
        );
        let _ = (layout, a, b);
        return Ok(());
    }
    #[cfg(feature = "cuda")]
    {
        let (side, uplo, m, n) = match layout {
            Layout::ColMajor => (side, uplo, m, n),
            Layout::RowMajor => (side.flipped(), uplo.flipped(), n, m),
        };
        let status = unsafe {
            T::cublas_trmm(
                queue.imp().cublas_handle(),
                side2cublas(side),
                uplo2cublas(uplo),
                op2cublas(trans),
                diag2cublas(diag),
                m as i32,
                n as i32,
                alpha,
                a,
                lda as i32,
                b,
                ldb as i32,
            )
        };
        return check_cublas("cublasTrmm", status);
    }
    #[cfg(not(any(feature = "cuda", feature = "stub")))]
    {
        let _ = (
            layout, side, uplo, trans, diag, m, n, alpha, a, lda, b, ldb, queue,
        );
        return Err(Error::NotAvailable { func: "trmm" });
    }
}

/// Triangular solve: op(A) * X = alpha * B (or X * op(A) from the
/// right); X overwrites B.
#[allow(clippy::too_many_arguments)]
pub fn trsm<T: Scalar>(
    layout: Layout,
    side: Side,
    uplo: Uplo,
    trans: Op,
    diag: Diag,
    m: i64,
    n: i64,
    alpha: T,
    a: u64,
    lda: i64,
    b: u64,
    ldb: i64,
    queue: &Queue,
) -> Result<()> {
    check_dims(&[("m", m), ("n", n), ("lda", lda), ("ldb", ldb)])?;
    #[cfg(all(feature = "stub", not(feature = "cuda")))]
    {
        queue.imp().blas_call(
            "trsm",
            format!(
                "side={side:?} uplo={uplo:?} trans={trans:?} diag={diag:?} \
                 m={m} n={n} alpha={alpha} lda={lda} ldb={ldb}"
            ),
        );
        let _ = (layout, a, b);
        return Ok(());
    }
    #[cfg(feature = "cuda")]
    {
        let (side, uplo, m, n) = match layout {
            Layout::ColMajor => (side, uplo, m, n),
            Layout::RowMajor => (side.flipped(), uplo.flipped(), n, m),
        };
        let status = unsafe {
            T::cublas_trsm(
                queue.imp().cublas_handle(),
                side2cublas(side),
                uplo2cublas(uplo),
                op2cublas(trans),
                diag2cublas(diag),
                m as i32,
                n as i32,
                alpha,
                a,
                lda as i32,
                b,
                ldb as i32,
            )
        };
        return check_cublas("cublasTrsm", status);
    }
    #[cfg(not(any(feature = "cuda", feature = "stub")))]
    {
        let _ = (
            layout, side, uplo, trans, diag, m, n, alpha, a, lda, b, ldb, queue,
        );
        return Err(Error::NotAvailable { func: "trsm" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_must_fit_the_32_bit_interface() {
        assert!(check_dims(&[("m", 5), ("lda", i32::MAX as i64)]).is_ok());

        let err = check_dims(&[("n", 8), ("m", i32::MAX as i64 + 1)]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidArgument { arg: "m", .. }
        ));
    }
}
