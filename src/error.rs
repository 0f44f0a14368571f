//! Error types and the device error policy for blasq

use thiserror::Error;

/// Result type alias using blasq's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in blasq operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid argument provided to an operation.
    ///
    /// Usage errors are detected synchronously before any device work is
    /// issued and are never routed through the device error policy.
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Out of device (or pinned host) memory
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// A backend runtime or library call failed
    #[error("Device error in {func}: {message}")]
    Device {
        /// The originating call site
        func: &'static str,
        /// Backend-supplied diagnostic text
        message: String,
    },

    /// Operation has no implementation for the compiled-in backend
    #[error("Unsupported function for this backend: {func}")]
    Unsupported {
        /// The unsupported function
        func: &'static str,
    },

    /// No accelerator backend is compiled in
    #[error("Device support not available (called {func})")]
    NotAvailable {
        /// The function that required a backend
        func: &'static str,
    },
}

impl Error {
    /// Create an invalid-argument error
    pub fn invalid_arg(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Device error policy
// ============================================================================

// Exactly one policy is active per build:
//   default           -> report: failures become recoverable Error::Device
//   error-abort       -> print call site + diagnostic, abort the process
//   error-unchecked   -> discard the outcome
//
// Usage errors and unsupported-configuration errors never pass through
// here; they short-circuit before any backend call is attempted.

/// Apply the active error policy to the outcome of one backend call.
///
/// `func` is the originating call site (e.g. `"cuMemAllocAsync"`) so that
/// diagnostics are actionable. `message` is evaluated lazily; under the
/// unchecked policy it is never called.
///
/// Only compiled when a backend with fallible calls is present (the
/// stub backend never fails a device call).
#[cfg(any(feature = "cuda", test))]
#[cfg(not(any(feature = "error-abort", feature = "error-unchecked")))]
pub(crate) fn device_check(
    func: &'static str,
    failed: bool,
    message: impl FnOnce() -> String,
) -> Result<()> {
    if failed {
        Err(Error::Device {
            func,
            message: message(),
        })
    } else {
        Ok(())
    }
}

/// Abort-on-error policy: print the call site and diagnostic, then abort.
#[cfg(any(feature = "cuda", test))]
#[cfg(feature = "error-abort")]
pub(crate) fn device_check(
    func: &'static str,
    failed: bool,
    message: impl FnOnce() -> String,
) -> Result<()> {
    if failed {
        eprintln!("[blasq] device error in {}: {}", func, message());
        std::process::abort();
    }
    Ok(())
}

/// Unchecked policy: the backend call's outcome is discarded.
#[cfg(any(feature = "cuda", test))]
#[cfg(all(feature = "error-unchecked", not(feature = "error-abort")))]
pub(crate) fn device_check(
    _func: &'static str,
    _failed: bool,
    _message: impl FnOnce() -> String,
) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_error_carries_call_site() {
        let err = Error::Device {
            func: "cublasSgemm_v2",
            message: "CUBLAS_STATUS_EXECUTION_FAILED".into(),
        };
        let text = err.to_string();
        assert!(text.contains("cublasSgemm_v2"));
        assert!(text.contains("CUBLAS_STATUS_EXECUTION_FAILED"));
    }

    #[cfg(not(any(feature = "error-abort", feature = "error-unchecked")))]
    #[test]
    fn report_policy_returns_recoverable_error() {
        assert!(device_check("ok_call", false, || unreachable!()).is_ok());
        let err = device_check("bad_call", true, || "boom".into()).unwrap_err();
        assert!(matches!(err, Error::Device { func: "bad_call", .. }));
    }
}
