//! Unified error handling for SoaForge
//!
//! Consolidates the layout errors (planning/binding arithmetic) and the
//! backend errors (device allocation/import) into a single type with
//! error categorization. All errors in this crate are structural: they
//! indicate a wrong layout declaration, an undersized chunk, or a backend
//! rejection, and none of them are retryable.

use std::fmt;

use thiserror::Error;

use crate::backend::BackendError;
use crate::layout::LayoutError;

/// Unified error type for SoaForge
///
/// Wraps the two domain errors so callers that drive the whole
/// plan/allocate/bind/locate sequence can use a single `Result` type.
#[derive(Debug, Error)]
pub enum SoaForgeError {
    /// Layout planning or chunk binding failed
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Device backend rejected an allocation or import
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Result alias using [`SoaForgeError`].
pub type ForgeResult<T> = std::result::Result<T, SoaForgeError>;

impl SoaForgeError {
    /// Categorize the error for handling decisions.
    ///
    /// Layout errors are user errors: the caller declared a malformed field
    /// list or bound against a chunk it sized wrong. Backend errors come
    /// from the device runtime.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SoaForgeError::Layout(_) => ErrorCategory::User,
            SoaForgeError::Backend(_) => ErrorCategory::Backend,
        }
    }

    /// Check if this is a user-facing error (actionable by the caller)
    pub fn is_user_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::User)
    }

    /// Check if this error originated in the device backend
    pub fn is_backend_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::Backend)
    }
}

/// Error category for handling decisions
///
/// No category is retryable: a failed plan or bind will fail the same way
/// again until the caller fixes the field list or the chunk size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User error - malformed field list or undersized chunk
    User,
    /// Backend error - device allocation or import failure
    Backend,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::User => write!(f, "User"),
            ErrorCategory::Backend => write!(f, "Backend"),
        }
    }
}
