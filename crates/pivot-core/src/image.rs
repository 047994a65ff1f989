//! Pixel buffer types shared by the transform and the drawing surface.

use serde::{Deserialize, Serialize};

use crate::error::{RotateError, RotateResult};

/// In-memory representation of a pixel: channel count and order.
///
/// All formats are 8 bits per channel, tightly packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Single-channel grayscale.
    Gray8,
    /// Three-channel RGB.
    #[default]
    Rgb8,
    /// Four-channel RGB with alpha.
    Rgba8,
}

impl PixelFormat {
    /// Number of bytes (= channels) per pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }

    /// Returns true if the format carries an alpha channel.
    #[inline]
    pub fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Rgba8)
    }
}

/// An owned rectangular pixel buffer.
///
/// Pixel data is row-major, `width * height * channels` bytes. The buffer is
/// never shared: transforms take a source by reference and return a newly
/// allocated destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel format of the buffer.
    pub format: PixelFormat,
    /// Pixel data in row-major order.
    pub pixels: Vec<u8>,
}

impl Image {
    /// Allocate a zero-filled image.
    ///
    /// Zero is the documented background value: fully transparent black for
    /// `Rgba8`, black for `Rgb8` and `Gray8`.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> RotateResult<Self> {
        let len = byte_len(width, height, format)
            .ok_or(RotateError::Allocation { width, height })?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| RotateError::Allocation { width, height })?;
        pixels.resize(len, 0);
        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    /// Wrap an existing pixel buffer.
    pub fn from_raw(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            Some(pixels.len()),
            byte_len(width, height, format),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            format,
            pixels,
        }
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/degenerate image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Byte offset of the pixel at `(x, y)`. Caller guarantees bounds.
    #[inline]
    pub(crate) fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.format.channels()
    }
}

/// Buffer length in bytes for the given dimensions, or `None` on overflow.
pub(crate) fn byte_len(width: u32, height: u32, format: PixelFormat) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(format.channels())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_channels() {
        assert_eq!(PixelFormat::Gray8.channels(), 1);
        assert_eq!(PixelFormat::Rgb8.channels(), 3);
        assert_eq!(PixelFormat::Rgba8.channels(), 4);
    }

    #[test]
    fn test_format_alpha() {
        assert!(!PixelFormat::Gray8.has_alpha());
        assert!(!PixelFormat::Rgb8.has_alpha());
        assert!(PixelFormat::Rgba8.has_alpha());
    }

    #[test]
    fn test_image_allocation() {
        let img = Image::new(100, 50, PixelFormat::Rgb8).unwrap();

        assert_eq!(img.width, 100);
        assert_eq!(img.height, 50);
        assert_eq!(img.pixel_count(), 5000);
        assert_eq!(img.byte_size(), 15000);
        assert!(!img.is_empty());
        assert!(img.pixels.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_image_allocation_overflow() {
        let err = Image::new(u32::MAX, u32::MAX, PixelFormat::Rgba8).unwrap_err();
        assert!(matches!(
            err,
            RotateError::Allocation {
                width: u32::MAX,
                height: u32::MAX
            }
        ));
    }

    #[test]
    fn test_image_empty() {
        let img = Image::new(0, 0, PixelFormat::Gray8).unwrap();
        assert!(img.is_empty());
        assert_eq!(img.byte_size(), 0);
    }

    #[test]
    fn test_from_raw() {
        let pixels = vec![7u8; 4 * 3 * 3];
        let img = Image::from_raw(4, 3, PixelFormat::Rgb8, pixels);
        assert_eq!(img.byte_size(), 36);
    }

    #[test]
    fn test_pixel_offset() {
        let img = Image::new(10, 10, PixelFormat::Rgba8).unwrap();
        assert_eq!(img.offset(0, 0), 0);
        assert_eq!(img.offset(3, 2), (2 * 10 + 3) * 4);
    }
}
