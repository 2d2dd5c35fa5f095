//! Error types for pixbuf loading and saving.
//!
//! Loaders report every failure as [`PixbufError::Failed`] carrying a
//! human-readable description of the stage that failed. The remaining
//! variants belong to the host side: format lookup, buffer validation and
//! plain file I/O.
//!
//! # Usage
//!
//! ```rust
//! use pixbuf_core::{PixbufError, PixbufResult};
//!
//! fn check_channels(n: u8) -> PixbufResult<()> {
//!     if !(1..=4).contains(&n) {
//!         return Err(PixbufError::failed(format!("Unsupported number of components: {n}")));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_channels(5).is_err());
//! ```

use std::io;
use thiserror::Error;

/// Result type alias using [`PixbufError`] as the error type.
pub type PixbufResult<T> = Result<T, PixbufError>;

/// Errors surfaced by pixbuf modules and the module registry.
#[derive(Debug, Error)]
pub enum PixbufError {
    /// The operation failed. The message names the failing stage.
    #[error("operation failed: {0}")]
    Failed(String),

    /// The module does not implement the requested operation.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// No registered module recognizes the data.
    #[error("unknown image type: {0}")]
    UnknownType(String),

    /// Pixel buffer does not match the declared layout.
    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl PixbufError {
    /// Creates a [`PixbufError::Failed`] from any message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Creates a [`PixbufError::UnsupportedOperation`] from any message.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation(message.into())
    }

    /// Returns `true` for [`PixbufError::Failed`].
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns `true` for [`PixbufError::UnsupportedOperation`].
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation(_))
    }
}
