//! Per-item argument validation for batched routines
//!
//! Each validator produces one code per item: 0 for a well-formed item,
//! otherwise the negated 1-based signature position of the first
//! offending argument (layout is position 1). Dimensions must be
//! non-negative and each leading dimension must cover the stored rows of
//! its matrix under the item's layout/transpose/side.

use crate::batch::extract;
use crate::types::{Layout, Op, Side};

/// Stored row count of a possibly transposed operand: `rows` when the
/// operand is not transposed in the stored layout, `cols` otherwise.
/// Row-major storage inverts the rule.
fn stored_rows(layout: Layout, trans: Op, rows: i64, cols: i64) -> i64 {
    match (layout, trans) {
        (Layout::ColMajor, Op::NoTrans) | (Layout::RowMajor, Op::Trans | Op::ConjTrans) => rows,
        _ => cols,
    }
}

/// Stored row count of an untransposed output/right-hand-side block.
fn block_rows(layout: Layout, m: i64, n: i64) -> i64 {
    match layout {
        Layout::ColMajor => m,
        Layout::RowMajor => n,
    }
}

fn ld_ok(ld: i64, rows: i64) -> bool {
    ld >= rows.max(1)
}

#[allow(clippy::too_many_arguments)]
pub(super) fn gemm(
    layout: Layout,
    transa: &[Op],
    transb: &[Op],
    m: &[i64],
    n: &[i64],
    k: &[i64],
    lda: &[i64],
    ldb: &[i64],
    ldc: &[i64],
    batch: usize,
) -> Vec<i64> {
    (0..batch)
        .map(|i| {
            let (ta, tb) = (extract(transa, i), extract(transb, i));
            let (m, n, k) = (extract(m, i), extract(n, i), extract(k, i));
            if m < 0 {
                -4
            } else if n < 0 {
                -5
            } else if k < 0 {
                -6
            } else if !ld_ok(extract(lda, i), stored_rows(layout, ta, m, k)) {
                -9
            } else if !ld_ok(extract(ldb, i), stored_rows(layout, tb, k, n)) {
                -11
            } else if !ld_ok(extract(ldc, i), block_rows(layout, m, n)) {
                -14
            } else {
                0
            }
        })
        .collect()
}

/// Shared by symm and hemm (identical signatures).
#[allow(clippy::too_many_arguments)]
pub(super) fn symm(
    layout: Layout,
    side: &[Side],
    m: &[i64],
    n: &[i64],
    lda: &[i64],
    ldb: &[i64],
    ldc: &[i64],
    batch: usize,
) -> Vec<i64> {
    (0..batch)
        .map(|i| {
            let (m, n) = (extract(m, i), extract(n, i));
            // A is m-by-m from the left, n-by-n from the right; row-major
            // storage flips which side that is.
            let a_rows = match (layout, extract(side, i)) {
                (Layout::ColMajor, Side::Left) | (Layout::RowMajor, Side::Right) => m,
                _ => n,
            };
            if m < 0 {
                -4
            } else if n < 0 {
                -5
            } else if !ld_ok(extract(lda, i), a_rows) {
                -8
            } else if !ld_ok(extract(ldb, i), block_rows(layout, m, n)) {
                -10
            } else if !ld_ok(extract(ldc, i), block_rows(layout, m, n)) {
                -13
            } else {
                0
            }
        })
        .collect()
}

/// Shared by syrk and herk.
#[allow(clippy::too_many_arguments)]
pub(super) fn syrk(
    layout: Layout,
    trans: &[Op],
    n: &[i64],
    k: &[i64],
    lda: &[i64],
    ldc: &[i64],
    batch: usize,
) -> Vec<i64> {
    (0..batch)
        .map(|i| {
            let (n, k) = (extract(n, i), extract(k, i));
            if n < 0 {
                -4
            } else if k < 0 {
                -5
            } else if !ld_ok(extract(lda, i), stored_rows(layout, extract(trans, i), n, k)) {
                -8
            } else if !ld_ok(extract(ldc, i), n) {
                -11
            } else {
                0
            }
        })
        .collect()
}

/// Shared by syr2k and her2k.
#[allow(clippy::too_many_arguments)]
pub(super) fn syr2k(
    layout: Layout,
    trans: &[Op],
    n: &[i64],
    k: &[i64],
    lda: &[i64],
    ldb: &[i64],
    ldc: &[i64],
    batch: usize,
) -> Vec<i64> {
    (0..batch)
        .map(|i| {
            let (n, k) = (extract(n, i), extract(k, i));
            let ab_rows = stored_rows(layout, extract(trans, i), n, k);
            if n < 0 {
                -4
            } else if k < 0 {
                -5
            } else if !ld_ok(extract(lda, i), ab_rows) {
                -8
            } else if !ld_ok(extract(ldb, i), ab_rows) {
                -10
            } else if !ld_ok(extract(ldc, i), n) {
                -13
            } else {
                0
            }
        })
        .collect()
}

/// Shared by trmm and trsm (identical signatures).
#[allow(clippy::too_many_arguments)]
pub(super) fn trmm(
    layout: Layout,
    side: &[Side],
    m: &[i64],
    n: &[i64],
    lda: &[i64],
    ldb: &[i64],
    batch: usize,
) -> Vec<i64> {
    (0..batch)
        .map(|i| {
            let (m, n) = (extract(m, i), extract(n, i));
            let a_rows = match (layout, extract(side, i)) {
                (Layout::ColMajor, Side::Left) | (Layout::RowMajor, Side::Right) => m,
                _ => n,
            };
            if m < 0 {
                -6
            } else if n < 0 {
                -7
            } else if !ld_ok(extract(lda, i), a_rows) {
                -10
            } else if !ld_ok(extract(ldb, i), block_rows(layout, m, n)) {
                -12
            } else {
                0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemm_flags_negative_dimension() {
        let codes = gemm(
            Layout::ColMajor,
            &[Op::NoTrans],
            &[Op::NoTrans],
            &[2, -1, 2],
            &[2],
            &[2],
            &[2],
            &[2],
            &[2],
            3,
        );
        assert_eq!(codes, vec![0, -4, 0]);
    }

    #[test]
    fn gemm_lda_accounts_for_transpose() {
        // NoTrans: A stored m-by-k, lda >= m = 4. Trans: k-by-m, lda >= k = 2.
        let codes = gemm(
            Layout::ColMajor,
            &[Op::NoTrans, Op::Trans],
            &[Op::NoTrans],
            &[4],
            &[3],
            &[2],
            &[2],
            &[2],
            &[4],
            2,
        );
        assert_eq!(codes, vec![-9, 0]);
    }

    #[test]
    fn gemm_row_major_inverts_ld_rule() {
        // Row-major NoTrans A stored as k rows: lda >= k = 2, not m = 4.
        let codes = gemm(
            Layout::RowMajor,
            &[Op::NoTrans],
            &[Op::NoTrans],
            &[4],
            &[3],
            &[2],
            &[2],
            &[3],
            &[3],
            1,
        );
        assert_eq!(codes, vec![0]);
    }

    #[test]
    fn trmm_side_selects_triangular_extent() {
        // Right side: A is n-by-n, lda >= 5.
        let codes = trmm(
            Layout::ColMajor,
            &[Side::Left, Side::Right],
            &[3],
            &[5],
            &[3],
            &[3],
            2,
        );
        assert_eq!(codes, vec![0, -10]);
    }

    #[test]
    fn zero_dimensions_are_well_formed() {
        let codes = syrk(Layout::ColMajor, &[Op::NoTrans], &[0], &[0], &[1], &[1], 1);
        assert_eq!(codes, vec![0]);
    }
}
