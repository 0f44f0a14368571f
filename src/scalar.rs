//! Scalar element types accepted by device BLAS routines
//!
//! The [`Scalar`] trait is sealed over the four standard BLAS precisions:
//! `f32`, `f64`, `Complex<f32>`, `Complex<f64>`. Under the `cuda` feature
//! it also carries the per-precision cuBLAS entry points, so generic
//! routine wrappers dispatch to the right vendor symbol with no runtime
//! branching.
//!
//! For real scalars the Hermitian routines (hemm, herk, her2k) coincide
//! with their symmetric counterparts and are forwarded accordingly.

use std::fmt;

use num_complex::Complex;

#[cfg(feature = "cuda")]
use cudarc::cublas::sys;

mod private {
    use num_complex::Complex;

    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for Complex<f32> {}
    impl Sealed for Complex<f64> {}
}

/// A BLAS scalar type: `f32`, `f64`, `Complex<f32>` or `Complex<f64>`.
#[allow(clippy::missing_safety_doc)]
pub trait Scalar:
    Copy + Send + Sync + PartialEq + fmt::Debug + fmt::Display + private::Sealed + 'static
{
    /// The associated real type (`Self` for real scalars).
    type Real: Scalar;

    /// Short precision name ("f32", "c64", ...).
    const NAME: &'static str;

    // ------------------------------------------------------------------
    // cuBLAS entry points. Device buffers are raw device addresses; all
    // dimension arguments are already validated and narrowed by the
    // caller. Callers must hold a live handle bound to the intended
    // stream.
    // ------------------------------------------------------------------

    /// C = alpha * op(A) * op(B) + beta * C
    #[cfg(feature = "cuda")]
    #[allow(clippy::too_many_arguments)]
    unsafe fn cublas_gemm(
        h: sys::cublasHandle_t,
        transa: sys::cublasOperation_t,
        transb: sys::cublasOperation_t,
        m: i32,
        n: i32,
        k: i32,
        alpha: Self,
        a: u64,
        lda: i32,
        b: u64,
        ldb: i32,
        beta: Self,
        c: u64,
        ldc: i32,
    ) -> sys::cublasStatus_t;

    /// C = alpha * A * B + beta * C with A symmetric (side-dependent)
    #[cfg(feature = "cuda")]
    #[allow(clippy::too_many_arguments)]
    unsafe fn cublas_symm(
        h: sys::cublasHandle_t,
        side: sys::cublasSideMode_t,
        uplo: sys::cublasFillMode_t,
        m: i32,
        n: i32,
        alpha: Self,
        a: u64,
        lda: i32,
        b: u64,
        ldb: i32,
        beta: Self,
        c: u64,
        ldc: i32,
    ) -> sys::cublasStatus_t;

    /// Hermitian variant of [`Scalar::cublas_symm`]
    #[cfg(feature = "cuda")]
    #[allow(clippy::too_many_arguments)]
    unsafe fn cublas_hemm(
        h: sys::cublasHandle_t,
        side: sys::cublasSideMode_t,
        uplo: sys::cublasFillMode_t,
        m: i32,
        n: i32,
        alpha: Self,
        a: u64,
        lda: i32,
        b: u64,
        ldb: i32,
        beta: Self,
        c: u64,
        ldc: i32,
    ) -> sys::cublasStatus_t;

    /// C = alpha * op(A) * op(A)^T + beta * C
    #[cfg(feature = "cuda")]
    #[allow(clippy::too_many_arguments)]
    unsafe fn cublas_syrk(
        h: sys::cublasHandle_t,
        uplo: sys::cublasFillMode_t,
        trans: sys::cublasOperation_t,
        n: i32,
        k: i32,
        alpha: Self,
        a: u64,
        lda: i32,
        beta: Self,
        c: u64,
        ldc: i32,
    ) -> sys::cublasStatus_t;

    /// C = alpha * op(A) * op(A)^H + beta * C; alpha and beta are real
    #[cfg(feature = "cuda")]
    #[allow(clippy::too_many_arguments)]
    unsafe fn cublas_herk(
        h: sys::cublasHandle_t,
        uplo: sys::cublasFillMode_t,
        trans: sys::cublasOperation_t,
        n: i32,
        k: i32,
        alpha: Self::Real,
        a: u64,
        lda: i32,
        beta: Self::Real,
        c: u64,
        ldc: i32,
    ) -> sys::cublasStatus_t;

    /// C = alpha * (op(A) op(B)^T + op(B) op(A)^T) + beta * C
    #[cfg(feature = "cuda")]
    #[allow(clippy::too_many_arguments)]
    unsafe fn cublas_syr2k(
        h: sys::cublasHandle_t,
        uplo: sys::cublasFillMode_t,
        trans: sys::cublasOperation_t,
        n: i32,
        k: i32,
        alpha: Self,
        a: u64,
        lda: i32,
        b: u64,
        ldb: i32,
        beta: Self,
        c: u64,
        ldc: i32,
    ) -> sys::cublasStatus_t;

    /// Hermitian rank-2k update; beta is real
    #[cfg(feature = "cuda")]
    #[allow(clippy::too_many_arguments)]
    unsafe fn cublas_her2k(
        h: sys::cublasHandle_t,
        uplo: sys::cublasFillMode_t,
        trans: sys::cublasOperation_t,
        n: i32,
        k: i32,
        alpha: Self,
        a: u64,
        lda: i32,
        b: u64,
        ldb: i32,
        beta: Self::Real,
        c: u64,
        ldc: i32,
    ) -> sys::cublasStatus_t;

    /// B = alpha * op(A) * B (triangular multiply, in place)
    #[cfg(feature = "cuda")]
    #[allow(clippy::too_many_arguments)]
    unsafe fn cublas_trmm(
        h: sys::cublasHandle_t,
        side: sys::cublasSideMode_t,
        uplo: sys::cublasFillMode_t,
        trans: sys::cublasOperation_t,
        diag: sys::cublasDiagType_t,
        m: i32,
        n: i32,
        alpha: Self,
        a: u64,
        lda: i32,
        b: u64,
        ldb: i32,
    ) -> sys::cublasStatus_t;

    /// Solve op(A) * X = alpha * B (or X * op(A)), X overwrites B
    #[cfg(feature = "cuda")]
    #[allow(clippy::too_many_arguments)]
    unsafe fn cublas_trsm(
        h: sys::cublasHandle_t,
        side: sys::cublasSideMode_t,
        uplo: sys::cublasFillMode_t,
        trans: sys::cublasOperation_t,
        diag: sys::cublasDiagType_t,
        m: i32,
        n: i32,
        alpha: Self,
        a: u64,
        lda: i32,
        b: u64,
        ldb: i32,
    ) -> sys::cublasStatus_t;
}

// ============================================================================
// Real precisions
// ============================================================================

/// Generate a real `Scalar` impl. Hermitian routines forward to the
/// symmetric ones, matching the reference BLAS convention for real types.
macro_rules! impl_real_scalar {
    ($t:ty, $name:literal, $gemm:ident, $symm:ident, $syrk:ident,
     $syr2k:ident, $trmm:ident, $trsm:ident) => {
        impl Scalar for $t {
            type Real = $t;
            const NAME: &'static str = $name;

            #[cfg(feature = "cuda")]
            unsafe fn cublas_gemm(
                h: sys::cublasHandle_t,
                transa: sys::cublasOperation_t,
                transb: sys::cublasOperation_t,
                m: i32,
                n: i32,
                k: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                b: u64,
                ldb: i32,
                beta: Self,
                c: u64,
                ldc: i32,
            ) -> sys::cublasStatus_t {
                sys::$gemm(
                    h,
                    transa,
                    transb,
                    m,
                    n,
                    k,
                    &alpha,
                    a as *const $t,
                    lda,
                    b as *const $t,
                    ldb,
                    &beta,
                    c as *mut $t,
                    ldc,
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_symm(
                h: sys::cublasHandle_t,
                side: sys::cublasSideMode_t,
                uplo: sys::cublasFillMode_t,
                m: i32,
                n: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                b: u64,
                ldb: i32,
                beta: Self,
                c: u64,
                ldc: i32,
            ) -> sys::cublasStatus_t {
                sys::$symm(
                    h,
                    side,
                    uplo,
                    m,
                    n,
                    &alpha,
                    a as *const $t,
                    lda,
                    b as *const $t,
                    ldb,
                    &beta,
                    c as *mut $t,
                    ldc,
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_hemm(
                h: sys::cublasHandle_t,
                side: sys::cublasSideMode_t,
                uplo: sys::cublasFillMode_t,
                m: i32,
                n: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                b: u64,
                ldb: i32,
                beta: Self,
                c: u64,
                ldc: i32,
            ) -> sys::cublasStatus_t {
                Self::cublas_symm(h, side, uplo, m, n, alpha, a, lda, b, ldb, beta, c, ldc)
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_syrk(
                h: sys::cublasHandle_t,
                uplo: sys::cublasFillMode_t,
                trans: sys::cublasOperation_t,
                n: i32,
                k: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                beta: Self,
                c: u64,
                ldc: i32,
            ) -> sys::cublasStatus_t {
                sys::$syrk(
                    h,
                    uplo,
                    trans,
                    n,
                    k,
                    &alpha,
                    a as *const $t,
                    lda,
                    &beta,
                    c as *mut $t,
                    ldc,
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_herk(
                h: sys::cublasHandle_t,
                uplo: sys::cublasFillMode_t,
                trans: sys::cublasOperation_t,
                n: i32,
                k: i32,
                alpha: Self::Real,
                a: u64,
                lda: i32,
                beta: Self::Real,
                c: u64,
                ldc: i32,
            ) -> sys::cublasStatus_t {
                Self::cublas_syrk(h, uplo, trans, n, k, alpha, a, lda, beta, c, ldc)
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_syr2k(
                h: sys::cublasHandle_t,
                uplo: sys::cublasFillMode_t,
                trans: sys::cublasOperation_t,
                n: i32,
                k: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                b: u64,
                ldb: i32,
                beta: Self,
                c: u64,
                ldc: i32,
            ) -> sys::cublasStatus_t {
                sys::$syr2k(
                    h,
                    uplo,
                    trans,
                    n,
                    k,
                    &alpha,
                    a as *const $t,
                    lda,
                    b as *const $t,
                    ldb,
                    &beta,
                    c as *mut $t,
                    ldc,
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_her2k(
                h: sys::cublasHandle_t,
                uplo: sys::cublasFillMode_t,
                trans: sys::cublasOperation_t,
                n: i32,
                k: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                b: u64,
                ldb: i32,
                beta: Self::Real,
                c: u64,
                ldc: i32,
            ) -> sys::cublasStatus_t {
                Self::cublas_syr2k(h, uplo, trans, n, k, alpha, a, lda, b, ldb, beta, c, ldc)
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_trmm(
                h: sys::cublasHandle_t,
                side: sys::cublasSideMode_t,
                uplo: sys::cublasFillMode_t,
                trans: sys::cublasOperation_t,
                diag: sys::cublasDiagType_t,
                m: i32,
                n: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                b: u64,
                ldb: i32,
            ) -> sys::cublasStatus_t {
                // cuBLAS trmm is out of place; pass B as both input and
                // output for the in-place reference semantics.
                sys::$trmm(
                    h,
                    side,
                    uplo,
                    trans,
                    diag,
                    m,
                    n,
                    &alpha,
                    a as *const $t,
                    lda,
                    b as *const $t,
                    ldb,
                    b as *mut $t,
                    ldb,
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_trsm(
                h: sys::cublasHandle_t,
                side: sys::cublasSideMode_t,
                uplo: sys::cublasFillMode_t,
                trans: sys::cublasOperation_t,
                diag: sys::cublasDiagType_t,
                m: i32,
                n: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                b: u64,
                ldb: i32,
            ) -> sys::cublasStatus_t {
                sys::$trsm(
                    h,
                    side,
                    uplo,
                    trans,
                    diag,
                    m,
                    n,
                    &alpha,
                    a as *const $t,
                    lda,
                    b as *mut $t,
                    ldb,
                )
            }
        }
    };
}

impl_real_scalar!(
    f32,
    "f32",
    cublasSgemm_v2,
    cublasSsymm_v2,
    cublasSsyrk_v2,
    cublasSsyr2k_v2,
    cublasStrmm_v2,
    cublasStrsm_v2
);
impl_real_scalar!(
    f64,
    "f64",
    cublasDgemm_v2,
    cublasDsymm_v2,
    cublasDsyrk_v2,
    cublasDsyr2k_v2,
    cublasDtrmm_v2,
    cublasDtrsm_v2
);

// ============================================================================
// Complex precisions
// ============================================================================

/// Generate a complex `Scalar` impl. `num_complex::Complex<T>` is
/// `repr(C)` with re/im fields, layout-compatible with the vendor
/// complex structs, so scalar references and device addresses cast
/// directly.
macro_rules! impl_complex_scalar {
    ($t:ty, $real:ty, $name:literal, $cu:ty, $gemm:ident, $symm:ident,
     $hemm:ident, $syrk:ident, $herk:ident, $syr2k:ident, $her2k:ident,
     $trmm:ident, $trsm:ident) => {
        impl Scalar for $t {
            type Real = $real;
            const NAME: &'static str = $name;

            #[cfg(feature = "cuda")]
            unsafe fn cublas_gemm(
                h: sys::cublasHandle_t,
                transa: sys::cublasOperation_t,
                transb: sys::cublasOperation_t,
                m: i32,
                n: i32,
                k: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                b: u64,
                ldb: i32,
                beta: Self,
                c: u64,
                ldc: i32,
            ) -> sys::cublasStatus_t {
                sys::$gemm(
                    h,
                    transa,
                    transb,
                    m,
                    n,
                    k,
                    &alpha as *const $t as *const $cu,
                    a as *const $cu,
                    lda,
                    b as *const $cu,
                    ldb,
                    &beta as *const $t as *const $cu,
                    c as *mut $cu,
                    ldc,
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_symm(
                h: sys::cublasHandle_t,
                side: sys::cublasSideMode_t,
                uplo: sys::cublasFillMode_t,
                m: i32,
                n: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                b: u64,
                ldb: i32,
                beta: Self,
                c: u64,
                ldc: i32,
            ) -> sys::cublasStatus_t {
                sys::$symm(
                    h,
                    side,
                    uplo,
                    m,
                    n,
                    &alpha as *const $t as *const $cu,
                    a as *const $cu,
                    lda,
                    b as *const $cu,
                    ldb,
                    &beta as *const $t as *const $cu,
                    c as *mut $cu,
                    ldc,
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_hemm(
                h: sys::cublasHandle_t,
                side: sys::cublasSideMode_t,
                uplo: sys::cublasFillMode_t,
                m: i32,
                n: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                b: u64,
                ldb: i32,
                beta: Self,
                c: u64,
                ldc: i32,
            ) -> sys::cublasStatus_t {
                sys::$hemm(
                    h,
                    side,
                    uplo,
                    m,
                    n,
                    &alpha as *const $t as *const $cu,
                    a as *const $cu,
                    lda,
                    b as *const $cu,
                    ldb,
                    &beta as *const $t as *const $cu,
                    c as *mut $cu,
                    ldc,
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_syrk(
                h: sys::cublasHandle_t,
                uplo: sys::cublasFillMode_t,
                trans: sys::cublasOperation_t,
                n: i32,
                k: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                beta: Self,
                c: u64,
                ldc: i32,
            ) -> sys::cublasStatus_t {
                sys::$syrk(
                    h,
                    uplo,
                    trans,
                    n,
                    k,
                    &alpha as *const $t as *const $cu,
                    a as *const $cu,
                    lda,
                    &beta as *const $t as *const $cu,
                    c as *mut $cu,
                    ldc,
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_herk(
                h: sys::cublasHandle_t,
                uplo: sys::cublasFillMode_t,
                trans: sys::cublasOperation_t,
                n: i32,
                k: i32,
                alpha: Self::Real,
                a: u64,
                lda: i32,
                beta: Self::Real,
                c: u64,
                ldc: i32,
            ) -> sys::cublasStatus_t {
                sys::$herk(
                    h,
                    uplo,
                    trans,
                    n,
                    k,
                    &alpha,
                    a as *const $cu,
                    lda,
                    &beta,
                    c as *mut $cu,
                    ldc,
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_syr2k(
                h: sys::cublasHandle_t,
                uplo: sys::cublasFillMode_t,
                trans: sys::cublasOperation_t,
                n: i32,
                k: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                b: u64,
                ldb: i32,
                beta: Self,
                c: u64,
                ldc: i32,
            ) -> sys::cublasStatus_t {
                sys::$syr2k(
                    h,
                    uplo,
                    trans,
                    n,
                    k,
                    &alpha as *const $t as *const $cu,
                    a as *const $cu,
                    lda,
                    b as *const $cu,
                    ldb,
                    &beta as *const $t as *const $cu,
                    c as *mut $cu,
                    ldc,
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_her2k(
                h: sys::cublasHandle_t,
                uplo: sys::cublasFillMode_t,
                trans: sys::cublasOperation_t,
                n: i32,
                k: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                b: u64,
                ldb: i32,
                beta: Self::Real,
                c: u64,
                ldc: i32,
            ) -> sys::cublasStatus_t {
                sys::$her2k(
                    h,
                    uplo,
                    trans,
                    n,
                    k,
                    &alpha as *const $t as *const $cu,
                    a as *const $cu,
                    lda,
                    b as *const $cu,
                    ldb,
                    &beta,
                    c as *mut $cu,
                    ldc,
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_trmm(
                h: sys::cublasHandle_t,
                side: sys::cublasSideMode_t,
                uplo: sys::cublasFillMode_t,
                trans: sys::cublasOperation_t,
                diag: sys::cublasDiagType_t,
                m: i32,
                n: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                b: u64,
                ldb: i32,
            ) -> sys::cublasStatus_t {
                sys::$trmm(
                    h,
                    side,
                    uplo,
                    trans,
                    diag,
                    m,
                    n,
                    &alpha as *const $t as *const $cu,
                    a as *const $cu,
                    lda,
                    b as *const $cu,
                    ldb,
                    b as *mut $cu,
                    ldb,
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_trsm(
                h: sys::cublasHandle_t,
                side: sys::cublasSideMode_t,
                uplo: sys::cublasFillMode_t,
                trans: sys::cublasOperation_t,
                diag: sys::cublasDiagType_t,
                m: i32,
                n: i32,
                alpha: Self,
                a: u64,
                lda: i32,
                b: u64,
                ldb: i32,
            ) -> sys::cublasStatus_t {
                sys::$trsm(
                    h,
                    side,
                    uplo,
                    trans,
                    diag,
                    m,
                    n,
                    &alpha as *const $t as *const $cu,
                    a as *const $cu,
                    lda,
                    b as *mut $cu,
                    ldb,
                )
            }
        }
    };
}

impl_complex_scalar!(
    Complex<f32>,
    f32,
    "c32",
    sys::cuComplex,
    cublasCgemm_v2,
    cublasCsymm_v2,
    cublasChemm_v2,
    cublasCsyrk_v2,
    cublasCherk_v2,
    cublasCsyr2k_v2,
    cublasCher2k_v2,
    cublasCtrmm_v2,
    cublasCtrsm_v2
);
impl_complex_scalar!(
    Complex<f64>,
    f64,
    "c64",
    sys::cuDoubleComplex,
    cublasZgemm_v2,
    cublasZsymm_v2,
    cublasZhemm_v2,
    cublasZsyrk_v2,
    cublasZherk_v2,
    cublasZsyr2k_v2,
    cublasZher2k_v2,
    cublasZtrmm_v2,
    cublasZtrsm_v2
);
