//! Batched triangular multiply and solve

use crate::batch::{
    check, check_batch, check_info_size, check_param_len, dispatch, extract, publish_info, Routine,
};
use crate::blas;
use crate::device::Queue;
use crate::error::Result;
use crate::scalar::Scalar;
use crate::types::{Diag, Layout, Op, Side, Uplo};

/// Batched trmm: for each item, B = alpha * op(A) * B (or B * op(A) from
/// the right), in place.
#[allow(clippy::too_many_arguments)]
pub fn trmm<T: Scalar>(
    layout: Layout,
    side: &[Side],
    uplo: &[Uplo],
    trans: &[Op],
    diag: &[Diag],
    m: &[i64],
    n: &[i64],
    alpha: &[T],
    a: &[u64],
    lda: &[i64],
    b: &[u64],
    ldb: &[i64],
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
    check_param_len("trans", trans.len(), batch)?;
    check_param_len("diag", diag.len(), batch)?;
    check_param_len("m", m.len(), batch)?;
    check_param_len("n", n.len(), batch)?;
    check_param_len("alpha", alpha.len(), batch)?;
    check_param_len("a", a.len(), batch)?;
    check_param_len("lda", lda.len(), batch)?;
    check_param_len("b", b.len(), batch)?;
    check_param_len("ldb", ldb.len(), batch)?;

    let codes = if info.is_empty() {
        None
    } else {
        let codes = check::trmm(layout, side, m, n, lda, ldb, batch);
        publish_info(info, &codes);
        Some(codes)
    };

    dispatch(queue, Routine::Trmm, batch, codes.as_deref(), |i, q| {
        blas::trmm(
            layout,
            extract(side, i),
            extract(uplo, i),
            extract(trans, i),
            extract(diag, i),
            extract(m, i),
            extract(n, i),
            extract(alpha, i),
            extract(a, i),
            extract(lda, i),
            extract(b, i),
            extract(ldb, i),
            q,
        )
    })
}

/// Batched trsm: for each item, solve op(A) * X = alpha * B (or
/// X * op(A) from the right); X overwrites B.
#[allow(clippy::too_many_arguments)]
pub fn trsm<T: Scalar>(
    layout: Layout,
    side: &[Side],
    uplo: &[Uplo],
    trans: &[Op],
    diag: &[Diag],
    m: &[i64],
    n: &[i64],
    alpha: &[T],
    a: &[u64],
    lda: &[i64],
    b: &[u64],
    ldb: &[i64],
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
    check_param_len("trans", trans.len(), batch)?;
    check_param_len("diag", diag.len(), batch)?;
    check_param_len("m", m.len(), batch)?;
    check_param_len("n", n.len(), batch)?;
    check_param_len("alpha", alpha.len(), batch)?;
    check_param_len("a", a.len(), batch)?;
    check_param_len("lda", lda.len(), batch)?;
    check_param_len("b", b.len(), batch)?;
    check_param_len("ldb", ldb.len(), batch)?;

    let codes = if info.is_empty() {
        None
    } else {
        let codes = check::trmm(layout, side, m, n, lda, ldb, batch);
        publish_info(info, &codes);
        Some(codes)
    };

    dispatch(queue, Routine::Trsm, batch, codes.as_deref(), |i, q| {
        blas::trsm(
            layout,
            extract(side, i),
            extract(uplo, i),
            extract(trans, i),
            extract(diag, i),
            extract(m, i),
            extract(n, i),
            extract(alpha, i),
            extract(a, i),
            extract(lda, i),
            extract(b, i),
            extract(ldb, i),
            q,
        )
    })
}
