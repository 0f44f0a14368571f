//! Batched symmetric and Hermitian rank-k / rank-2k updates

use crate::batch::{
    check, check_batch, check_info_size, check_param_len, dispatch, extract, publish_info, Routine,
};
use crate::blas;
use crate::device::Queue;
use crate::error::Result;
use crate::scalar::Scalar;
use crate::types::{Layout, Op, Uplo};

/// Batched syrk: for each item, C = alpha * op(A) op(A)^T + beta * C.
#[allow(clippy::too_many_arguments)]
pub fn syrk<T: Scalar>(
    layout: Layout,
    uplo: &[Uplo],
    trans: &[Op],
    n: &[i64],
    k: &[i64],
    alpha: &[T],
    a: &[u64],
    lda: &[i64],
    beta: &[T],
    c: &[u64],
    ldc: &[i64],
    batch: usize,
    info: &mut [i64],
    queue: &mut Queue,
) -> Result<()> {
    check_info_size(info, batch)?;
    check_batch(batch, queue)?;
    if batch == 0 {
        return Ok(());
    }
    check_param_len("uplo", uplo.len(), batch)?;
    check_param_len("trans", trans.len(), batch)?;
    check_param_len("n", n.len(), batch)?;
    check_param_len("k", k.len(), batch)?;
    check_param_len("alpha", alpha.len(), batch)?;
    check_param_len("a", a.len(), batch)?;
    check_param_len("lda", lda.len(), batch)?;
    check_param_len("beta", beta.len(), batch)?;
    check_param_len("c", c.len(), batch)?;
    check_param_len("ldc", ldc.len(), batch)?;

    let codes = if info.is_empty() {
        None
    } else {
        let codes = check::syrk(layout, trans, n, k, lda, ldc, batch);
        publish_info(info, &codes);
        Some(codes)
    };

    dispatch(queue, Routine::Syrk, batch, codes.as_deref(), |i, q| {
        blas::syrk(
            layout,
            extract(uplo, i),
            extract(trans, i),
            extract(n, i),
            extract(k, i),
            extract(alpha, i),
            extract(a, i),
            extract(lda, i),
            extract(beta, i),
            extract(c, i),
            extract(ldc, i),
            q,
        )
    })
}

/// Batched herk: for each item, C = alpha * op(A) op(A)^H + beta * C.
/// `alpha` and `beta` are real.
#[allow(clippy::too_many_arguments)]
pub fn herk<T: Scalar>(
    layout: Layout,
    uplo: &[Uplo],
    trans: &[Op],
    n: &[i64],
    k: &[i64],
    alpha: &[T::Real],
    a: &[u64],
    lda: &[i64],
    beta: &[T::Real],
    c: &[u64],
    ldc: &[i64],
    batch: usize,
    info: &mut [i64],
    queue: &mut Queue,
) -> Result<()> {
    check_info_size(info, batch)?;
    check_batch(batch, queue)?;
    if batch == 0 {
        return Ok(());
    }
    check_param_len("uplo", uplo.len(), batch)?;
    check_param_len("trans", trans.len(), batch)?;
    check_param_len("n", n.len(), batch)?;
    check_param_len("k", k.len(), batch)?;
    check_param_len("alpha", alpha.len(), batch)?;
    check_param_len("a", a.len(), batch)?;
    check_param_len("lda", lda.len(), batch)?;
    check_param_len("beta", beta.len(), batch)?;
    check_param_len("c", c.len(), batch)?;
    check_param_len("ldc", ldc.len(), batch)?;

    let codes = if info.is_empty() {
        None
    } else {
        let codes = check::syrk(layout, trans, n, k, lda, ldc, batch);
        publish_info(info, &codes);
        Some(codes)
    };

    dispatch(queue, Routine::Herk, batch, codes.as_deref(), |i, q| {
        blas::herk::<T>(
            layout,
            extract(uplo, i),
            extract(trans, i),
            extract(n, i),
            extract(k, i),
            extract(alpha, i),
            extract(a, i),
            extract(lda, i),
            extract(beta, i),
            extract(c, i),
            extract(ldc, i),
            q,
        )
    })
}

/// Batched syr2k: for each item,
/// C = alpha * (op(A) op(B)^T + op(B) op(A)^T) + beta * C.
#[allow(clippy::too_many_arguments)]
pub fn syr2k<T: Scalar>(
    layout: Layout,
    uplo: &[Uplo],
    trans: &[Op],
    n: &[i64],
    k: &[i64],
    alpha: &[T],
    a: &[u64],
    lda: &[i64],
    b: &[u64],
    ldb: &[i64],
    beta: &[T],
    c: &[u64],
    ldc: &[i64],
    batch: usize,
    info: &mut [i64],
    queue: &mut Queue,
) -> Result<()> {
    check_info_size(info, batch)?;
    check_batch(batch, queue)?;
    if batch == 0 {
        return Ok(());
    }
    check_param_len("uplo", uplo.len(), batch)?;
    check_param_len("trans", trans.len(), batch)?;
    check_param_len("n", n.len(), batch)?;
    check_param_len("k", k.len(), batch)?;
    check_param_len("alpha", alpha.len(), batch)?;
    check_param_len("a", a.len(), batch)?;
    check_param_len("lda", lda.len(), batch)?;
    check_param_len("b", b.len(), batch)?;
    check_param_len("ldb", ldb.len(), batch)?;
    check_param_len("beta", beta.len(), batch)?;
    check_param_len("c", c.len(), batch)?;
    check_param_len("ldc", ldc.len(), batch)?;

    let codes = if info.is_empty() {
        None
    } else {
        let codes = check::syr2k(layout, trans, n, k, lda, ldb, ldc, batch);
        publish_info(info, &codes);
        Some(codes)
    };

    dispatch(queue, Routine::Syr2k, batch, codes.as_deref(), |i, q| {
        blas::syr2k(
            layout,
            extract(uplo, i),
            extract(trans, i),
            extract(n, i),
            extract(k, i),
            extract(alpha, i),
            extract(a, i),
            extract(lda, i),
            extract(b, i),
            extract(ldb, i),
            extract(beta, i),
            extract(c, i),
            extract(ldc, i),
            q,
        )
    })
}

/// Batched her2k: as [`syr2k`] with conjugate transposes; `beta` is real.
#[allow(clippy::too_many_arguments)]
pub fn her2k<T: Scalar>(
    layout: Layout,
    uplo: &[Uplo],
    trans: &[Op],
    n: &[i64],
    k: &[i64],
    alpha: &[T],
    a: &[u64],
    lda: &[i64],
    b: &[u64],
    ldb: &[i64],
    beta: &[T::Real],
    c: &[u64],
    ldc: &[i64],
    batch: usize,
    info: &mut [i64],
    queue: &mut Queue,
) -> Result<()> {
    check_info_size(info, batch)?;
    check_batch(batch, queue)?;
    if batch == 0 {
        return Ok(());
    }
    check_param_len("uplo", uplo.len(), batch)?;
    check_param_len("trans", trans.len(), batch)?;
    check_param_len("n", n.len(), batch)?;
    check_param_len("k", k.len(), batch)?;
    check_param_len("alpha", alpha.len(), batch)?;
    check_param_len("a", a.len(), batch)?;
    check_param_len("lda", lda.len(), batch)?;
    check_param_len("b", b.len(), batch)?;
    check_param_len("ldb", ldb.len(), batch)?;
    check_param_len("beta", beta.len(), batch)?;
    check_param_len("c", c.len(), batch)?;
    check_param_len("ldc", ldc.len(), batch)?;

    let codes = if info.is_empty() {
        None
    } else {
        let codes = check::syr2k(layout, trans, n, k, lda, ldb, ldc, batch);
        publish_info(info, &codes);
        Some(codes)
    };

    dispatch(queue, Routine::Her2k, batch, codes.as_deref(), |i, q| {
        blas::her2k::<T>(
            layout,
            extract(uplo, i),
            extract(trans, i),
            extract(n, i),
            extract(k, i),
            extract(alpha, i),
            extract(a, i),
            extract(lda, i),
            extract(b, i),
            extract(ldb, i),
            extract(beta, i),
            extract(c, i),
            extract(ldc, i),
            q,
        )
    })
}
