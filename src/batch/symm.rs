//! Batched symmetric and Hermitian matrix multiply

use crate::batch::{
    check, check_batch, check_info_size, check_param_len, dispatch, extract, publish_info, Routine,
};
use crate::blas;
use crate::device::Queue;
use crate::error::Result;
use crate::scalar::Scalar;
use crate::types::{Layout, Side, Uplo};

/// Batched symm: for each item, C = alpha * A * B + beta * C with A
/// symmetric, applied from `side`.
#[allow(clippy::too_many_arguments)]
pub fn symm<T: Scalar>(
    layout: Layout,
    side: &[Side],
    uplo: &[Uplo],
    m: &[i64],
    n: &[i64],
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
    check_param_len("side", side.len(), batch)?;
    check_param_len("uplo", uplo.len(), batch)?;
    check_param_len("m", m.len(), batch)?;
    check_param_len("n", n.len(), batch)?;
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
        let codes = check::symm(layout, side, m, n, lda, ldb, ldc, batch);
        publish_info(info, &codes);
        Some(codes)
    };

    dispatch(queue, Routine::Symm, batch, codes.as_deref(), |i, q| {
        blas::symm(
            layout,
            extract(side, i),
            extract(uplo, i),
            extract(m, i),
            extract(n, i),
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

/// Batched hemm: as [`symm`] with A Hermitian. For real scalar types the
/// two coincide.
#[allow(clippy::too_many_arguments)]
pub fn hemm<T: Scalar>(
    layout: Layout,
    side: &[Side],
    uplo: &[Uplo],
    m: &[i64],
    n: &[i64],
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
    check_param_len("side", side.len(), batch)?;
    check_param_len("uplo", uplo.len(), batch)?;
    check_param_len("m", m.len(), batch)?;
    check_param_len("n", n.len(), batch)?;
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
        let codes = check::symm(layout, side, m, n, lda, ldb, ldc, batch);
        publish_info(info, &codes);
        Some(codes)
    };

    dispatch(queue, Routine::Hemm, batch, codes.as_deref(), |i, q| {
        blas::hemm(
            layout,
            extract(side, i),
            extract(uplo, i),
            extract(m, i),
            extract(n, i),
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
