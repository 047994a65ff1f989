//! Pivot Core - rotate-and-expand image transform
//!
//! This crate rotates a raster image by an arbitrary angle about its center,
//! expanding the destination canvas so no content is clipped. The composite
//! uses bilinear interpolation with anti-aliased edges, drawn through a
//! small software canvas abstraction.
//!
//! ```ignore
//! use pivot_core::{rotate, Rotator};
//!
//! let tilted = rotate(&image, 12.5)?;
//! let quarter = Rotator::RIGHT_NINETY.apply(&image)?;
//! ```

pub mod error;
pub mod image;
pub mod rotate;
pub mod surface;

pub use error::{RotateError, RotateResult};
pub use image::{Image, PixelFormat};
pub use rotate::{compute_rotated_bounds, rotate, Rotator};
pub use surface::{Canvas, DrawContext, Interpolation};
