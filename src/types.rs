//! Shared argument enums for device BLAS calls
//!
//! These mirror the standard BLAS argument conventions. They are
//! backend-free; conversion to vendor constants lives with each backend.

/// Matrix element storage order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Column-major storage (Fortran order)
    ColMajor,
    /// Row-major storage (C order)
    RowMajor,
}

/// Transposition operation applied to a matrix argument
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    /// Use the matrix as stored
    NoTrans,
    /// Use the transpose
    Trans,
    /// Use the conjugate transpose
    ConjTrans,
}

/// Which side a matrix multiplies from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Matrix on the left: op(A) * B
    Left,
    /// Matrix on the right: B * op(A)
    Right,
}

/// Which triangle of a matrix is referenced
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Uplo {
    /// Upper triangle
    Upper,
    /// Lower triangle
    Lower,
}

/// Whether a triangular matrix has an implicit unit diagonal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Diag {
    /// Diagonal elements are stored
    NonUnit,
    /// Diagonal elements are assumed to be one
    Unit,
}

/// Direction of a memory copy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemcpyKind {
    /// Host to host
    HostToHost,
    /// Host to device
    HostToDevice,
    /// Device to host
    DeviceToHost,
    /// Device to device
    DeviceToDevice,
    /// Let the backend infer the direction from the addresses
    Default,
}

#[cfg(feature = "cuda")]
impl Side {
    /// The opposite side, used when reflecting a row-major call into the
    /// column-major form vendor libraries expect.
    pub(crate) fn flipped(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[cfg(feature = "cuda")]
impl Uplo {
    /// The opposite triangle (row-major reflection).
    pub(crate) fn flipped(self) -> Self {
        match self {
            Uplo::Upper => Uplo::Lower,
            Uplo::Lower => Uplo::Upper,
        }
    }
}

#[cfg(feature = "cuda")]
impl Op {
    /// Swap Trans and NoTrans (row-major reflection for real-valued
    /// rank-k updates).
    pub(crate) fn swapped(self) -> Self {
        match self {
            Op::NoTrans => Op::Trans,
            Op::Trans => Op::NoTrans,
            Op::ConjTrans => Op::ConjTrans,
        }
    }
}
