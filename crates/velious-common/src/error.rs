//! Error types for velious-common.

use thiserror::Error;

/// Common error type for Velious operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A read ran past the end of the underlying data.
    #[error("unexpected end of data at offset {offset}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
