//! Rotate-and-expand: bounding-box math and the rotation filter.
//!
//! The filter rotates a source image by an arbitrary angle about its center
//! and expands the destination canvas so no content is clipped. Angles are
//! in degrees, positive = clockwise; values outside ±360 wrap naturally
//! through the trigonometry, so no normalization is performed. 0, ±90 and
//! 180 degrees are not special-cased: every angle flows through the same
//! corner math and composite draw.

use serde::{Deserialize, Serialize};

use crate::error::{RotateError, RotateResult};
use crate::image::Image;
use crate::surface::{Canvas, Interpolation};

/// Compute the dimensions of the bounding box for a rotated image.
///
/// Rotates the four corners of a `width` x `height` rectangle by
/// `angle_degrees` and returns the rounded axis-aligned extent of the
/// result. This is the exact size [`rotate`] allocates, independent of
/// pixel content.
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let w = f64::from(width);
    let h = f64::from(height);

    let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)];

    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for (x, y) in corners {
        let nx = cos * x - sin * y;
        let ny = sin * x + cos * y;
        min_x = min_x.min(nx);
        max_x = max_x.max(nx);
        min_y = min_y.min(ny);
        max_y = max_y.max(ny);
    }

    // The extents are non-negative, so round() is round-half-up here.
    (
        (max_x - min_x).round() as u32,
        (max_y - min_y).round() as u32,
    )
}

/// Rotate an image by an arbitrary angle, expanding the canvas.
///
/// The source is drawn into a newly allocated destination of the same pixel
/// format, rotated about the destination center with bilinear interpolation
/// and anti-aliased edges. Background pixels outside the rotated footprint
/// are the canvas default: transparent black for `Rgba8`, black otherwise.
///
/// # Arguments
///
/// * `image` - Source image; degenerate zero-size images are not rejected
///   and yield a degenerate result
/// * `angle_degrees` - Rotation angle in degrees, positive = clockwise
///
/// # Errors
///
/// * [`RotateError::InvalidArgument`] for a non-finite angle (nothing is
///   allocated)
/// * [`RotateError::Allocation`] if the destination buffer cannot be created
/// * [`RotateError::Rendering`] if the composite draw fails
pub fn rotate(image: &Image, angle_degrees: f64) -> RotateResult<Image> {
    if !angle_degrees.is_finite() {
        return Err(RotateError::InvalidArgument(format!(
            "rotation angle must be finite, got {angle_degrees}"
        )));
    }

    let theta = angle_degrees.to_radians();
    let (dst_w, dst_h) = compute_rotated_bounds(image.width, image.height, angle_degrees);

    let mut canvas = Canvas::new(dst_w, dst_h, image.format)?;
    {
        let mut ctx = canvas.context();
        ctx.set_interpolation(Interpolation::Bilinear);
        ctx.set_antialias(true);
        ctx.rotate_about(theta, f64::from(dst_w) / 2.0, f64::from(dst_h) / 2.0);

        let center_x = (f64::from(dst_w) - f64::from(image.width)) / 2.0;
        let center_y = (f64::from(dst_h) - f64::from(image.height)) / 2.0;
        ctx.draw_image(image, center_x.round() as i32, center_y.round() as i32)?;
    }
    Ok(canvas.into_image())
}

/// A rotation strategy bound to a fixed angle.
///
/// Plain value type; construct one with [`Rotator::new`] or use the
/// pre-bound constants. Carries no state beyond the angle and no algorithmic
/// difference from calling [`rotate`] directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotator {
    /// Rotation angle in degrees, positive = clockwise.
    pub angle_degrees: f64,
}

impl Rotator {
    /// Rotate a quarter turn counter-clockwise.
    pub const LEFT_NINETY: Rotator = Rotator {
        angle_degrees: -90.0,
    };

    /// Rotate a quarter turn clockwise.
    pub const RIGHT_NINETY: Rotator = Rotator {
        angle_degrees: 90.0,
    };

    /// Rotate a half turn.
    pub const ONE_EIGHTY: Rotator = Rotator {
        angle_degrees: 180.0,
    };

    /// Create a rotator for the given angle in degrees.
    pub fn new(angle_degrees: f64) -> Self {
        Self { angle_degrees }
    }

    /// Apply the rotation to an image; see [`rotate`].
    pub fn apply(&self, image: &Image) -> RotateResult<Image> {
        rotate(image, self.angle_degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PixelFormat;

    /// Gradient test image so misplaced pixels are detectable.
    fn gradient(width: u32, height: u32, format: PixelFormat) -> Image {
        let ch = format.channels();
        let mut pixels = Vec::with_capacity(width as usize * height as usize * ch);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 251) as u8;
                for _ in 0..ch {
                    pixels.push(v);
                }
            }
        }
        Image::from_raw(width, height, format, pixels)
    }

    #[test]
    fn test_zero_rotation_dimensions() {
        let (w, h) = compute_rotated_bounds(100, 50, 0.0);
        assert_eq!((w, h), (100, 50));
    }

    #[test]
    fn test_90_rotation_swaps_dimensions() {
        assert_eq!(compute_rotated_bounds(100, 50, 90.0), (50, 100));
        assert_eq!(compute_rotated_bounds(100, 50, -90.0), (50, 100));
    }

    #[test]
    fn test_180_rotation_dimensions() {
        assert_eq!(compute_rotated_bounds(100, 50, 180.0), (100, 50));
    }

    #[test]
    fn test_45_rotation_dimensions() {
        // 10 * (cos 45 + sin 45) = 14.142, rounds to 14.
        assert_eq!(compute_rotated_bounds(10, 10, 45.0), (14, 14));
    }

    #[test]
    fn test_beyond_full_turn_dimensions() {
        // Trigonometry wraps; no normalization needed.
        assert_eq!(compute_rotated_bounds(100, 50, 450.0), (50, 100));
        assert_eq!(compute_rotated_bounds(100, 50, -720.0), (100, 50));
    }

    #[test]
    fn test_rotate_allocates_bounding_box() {
        let img = gradient(100, 50, PixelFormat::Rgb8);

        let out = rotate(&img, 90.0).unwrap();
        assert_eq!((out.width, out.height), (50, 100));
        assert_eq!(out.format, img.format);

        let out = rotate(&img, 0.0).unwrap();
        assert_eq!((out.width, out.height), (100, 50));

        let out = rotate(&img, 33.0).unwrap();
        assert_eq!(
            (out.width, out.height),
            compute_rotated_bounds(100, 50, 33.0)
        );
    }

    #[test]
    fn test_rotate_zero_is_identity_content() {
        let img = gradient(17, 9, PixelFormat::Rgb8);
        let out = rotate(&img, 0.0).unwrap();
        assert_eq!(out.pixels, img.pixels);
    }

    #[test]
    fn test_rotate_90_moves_pixels() {
        let img = gradient(100, 50, PixelFormat::Gray8);
        let out = rotate(&img, 90.0).unwrap();

        // Clockwise quarter turn: dest(x, y) = src(y, h - 1 - x).
        assert_eq!(
            out.pixels[out.offset(10, 20)],
            img.pixels[img.offset(20, 39)]
        );
        assert_eq!(out.pixels[out.offset(25, 50)], img.pixels[img.offset(50, 24)]);
    }

    #[test]
    fn test_rotate_180_moves_pixels() {
        let img = gradient(12, 8, PixelFormat::Gray8);
        let out = rotate(&img, 180.0).unwrap();
        assert_eq!(
            out.pixels[out.offset(3, 2)],
            img.pixels[img.offset(12 - 1 - 3, 8 - 1 - 2)]
        );
    }

    #[test]
    fn test_rotate_non_finite_angle() {
        let img = gradient(4, 4, PixelFormat::Rgb8);
        assert!(matches!(
            rotate(&img, f64::NAN).unwrap_err(),
            RotateError::InvalidArgument(_)
        ));
        assert!(matches!(
            rotate(&img, f64::INFINITY).unwrap_err(),
            RotateError::InvalidArgument(_)
        ));
        assert!(matches!(
            rotate(&img, f64::NEG_INFINITY).unwrap_err(),
            RotateError::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_rotate_degenerate_image() {
        let img = Image::new(0, 0, PixelFormat::Rgba8).unwrap();
        let out = rotate(&img, 37.5).unwrap();
        assert_eq!((out.width, out.height), (0, 0));
        assert!(out.pixels.is_empty());
    }

    #[test]
    fn test_rotate_expands_canvas() {
        let img = gradient(100, 100, PixelFormat::Rgb8);
        let out = rotate(&img, 45.0).unwrap();
        assert!(out.width > img.width);
        assert!(out.height > img.height);
    }

    #[test]
    fn test_rotate_preserves_center_content() {
        // Solid mid-gray: after an arbitrary rotation the center region is
        // interior, so interpolation cannot change it.
        let img = Image::from_raw(20, 20, PixelFormat::Gray8, vec![80u8; 400]);
        let out = rotate(&img, 17.0).unwrap();
        let v = out.pixels[out.offset(out.width / 2, out.height / 2)];
        assert!((i32::from(v) - 80).abs() <= 1, "center was {v}");
    }

    #[test]
    fn test_rotate_inverse_recovers_center() {
        let img = Image::from_raw(20, 20, PixelFormat::Gray8, vec![200u8; 400]);
        let once = rotate(&img, 30.0).unwrap();
        let back = rotate(&once, -30.0).unwrap();
        // Lossy round trip: only the central region is expected to match.
        let v = back.pixels[back.offset(back.width / 2, back.height / 2)];
        assert!((i32::from(v) - 200).abs() <= 2, "center was {v}");
    }

    #[test]
    fn test_rotate_background_is_zero() {
        let img = Image::from_raw(10, 10, PixelFormat::Gray8, vec![255u8; 100]);
        let out = rotate(&img, 45.0).unwrap();
        // The bounding-box corners lie outside the rotated footprint.
        assert_eq!(out.pixels[out.offset(0, 0)], 0);
        assert_eq!(out.pixels[out.offset(out.width - 1, 0)], 0);
        assert_eq!(out.pixels[out.offset(0, out.height - 1)], 0);
        assert_eq!(out.pixels[out.offset(out.width - 1, out.height - 1)], 0);
    }

    #[test]
    fn test_named_rotators() {
        let img = gradient(100, 50, PixelFormat::Rgb8);

        let left = Rotator::LEFT_NINETY.apply(&img).unwrap();
        assert_eq!((left.width, left.height), (50, 100));

        let right = Rotator::RIGHT_NINETY.apply(&img).unwrap();
        assert_eq!((right.width, right.height), (50, 100));

        let half = Rotator::ONE_EIGHTY.apply(&img).unwrap();
        assert_eq!((half.width, half.height), (100, 50));

        // A named rotator is only a pre-bound angle.
        assert_eq!(right.pixels, rotate(&img, 90.0).unwrap().pixels);
    }

    #[test]
    fn test_rotator_value_semantics() {
        let r = Rotator::new(12.5);
        assert_eq!(r, Rotator { angle_degrees: 12.5 });
        assert_ne!(r, Rotator::RIGHT_NINETY);
    }
}
