//! Data-model error types.

use thiserror::Error;

/// Result type alias for data-model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by ticket and claim mutators.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied value violates the wire-format rules
    /// (empty entry, embedded space, empty claim type).
    ///
    /// Setters fail with this error before any mutation occurs.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
