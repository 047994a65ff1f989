//! Error types for the rotation transform.

use thiserror::Error;

/// Error types for rotate-and-expand operations.
#[derive(Debug, Error)]
pub enum RotateError {
    /// A caller-supplied argument violates a precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The destination buffer cannot be created.
    #[error("cannot allocate a {width}x{height} destination buffer")]
    Allocation {
        /// Requested destination width in pixels.
        width: u32,
        /// Requested destination height in pixels.
        height: u32,
    },

    /// The draw operation on the destination surface failed.
    #[error("rendering failed: {0}")]
    Rendering(String),
}

/// Result alias for rotation operations.
pub type RotateResult<T> = Result<T, RotateError>;
