//! Batched general matrix multiply

use crate::batch::{
    check, check_batch, check_info_size, check_param_len, dispatch, extract, publish_info, Routine,
};
use crate::blas;
use crate::device::Queue;
use crate::error::Result;
use crate::scalar::Scalar;
use crate::types::{Layout, Op};

/// Batched gemm: for each item, C = alpha * op(A) * op(B) + beta * C.
///
/// Every slice argument is broadcast (length 1) or per-item (length
/// `batch`); `a`, `b`, `c` hold device addresses. See the
/// [module docs](crate::batch) for validation modes and scheduling.
#[allow(clippy::too_many_arguments)]
pub fn gemm<T: Scalar>(
    layout: Layout,
    transa: &[Op],
    transb: &[Op],
    m: &[i64],
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
    check_param_len("transa", transa.len(), batch)?;
    check_param_len("transb", transb.len(), batch)?;
    check_param_len("m", m.len(), batch)?;
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
        let codes = check::gemm(layout, transa, transb, m, n, k, lda, ldb, ldc, batch);
        publish_info(info, &codes);
        Some(codes)
    };

    dispatch(queue, Routine::Gemm, batch, codes.as_deref(), |i, q| {
        blas::gemm(
            layout,
            extract(transa, i),
            extract(transb, i),
            extract(m, i),
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
