//! Error types for slablru

use std::fmt;

/// Result type alias for slablru operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache construction
///
/// `put` and `get` on a constructed cache cannot fail, so construction is the
/// only place an [`Error`] is produced. A lookup miss is `None`, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Capacity was zero, negative, or does not fit in `usize`
    InvalidCapacity,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidCapacity => write!(f, "Invalid capacity: must be a positive integer"),
        }
    }
}

impl std::error::Error for Error {}
