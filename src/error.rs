//! Poly1305 error types

use thiserror::Error;

/// Errors surfaced by the MAC engine.
///
/// A verification mismatch is never an error; it is reported as a plain
/// `false` from [`crate::verify`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Key material of unexpected length
    #[error("invalid key length: {len} bytes (expected 32)")]
    InvalidKeyLength {
        /// Length of the rejected key
        len: usize,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
