//! Software drawing surface: canvas, scoped draw context, affine transform.
//!
//! The rotation filter paints through this capability rather than touching
//! destination pixels directly. A [`Canvas`] owns the destination buffer; a
//! [`DrawContext`] is a scoped borrow of it that carries the current
//! transform and quality settings, and is released on every exit path when
//! it goes out of scope.
//!
//! # Resampling
//!
//! Draws are inverse-mapped: for each destination pixel the context computes
//! which source position contributes to it, samples the source there, and
//! composites the result. With anti-aliasing enabled, pixels straddling the
//! source edge are blended with the existing canvas content by their
//! coverage fraction.

use crate::error::{RotateError, RotateResult};
use crate::image::{byte_len, Image, PixelFormat};

/// Interpolation quality for draws on a [`DrawContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Nearest-neighbor sampling (fastest, lowest quality).
    Nearest,
    /// Weighted average of the four nearest source pixels.
    #[default]
    Bilinear,
}

/// A 2x3 affine matrix mapping draw coordinates to canvas pixels.
///
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Affine {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Affine {
    const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Rotation by `radians` keeping `(px, py)` fixed.
    ///
    /// Positive angles rotate clockwise in raster (y-down) coordinates.
    fn rotation_about(radians: f64, px: f64, py: f64) -> Affine {
        let (sin, cos) = radians.sin_cos();
        Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: px - cos * px + sin * py,
            f: py - sin * px - cos * py,
        }
    }

    /// Concatenation applying `inner` first, then `self`.
    fn compose(self, inner: Affine) -> Affine {
        Affine {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    /// Inverse transform, or `None` if the matrix is singular.
    fn invert(self) -> Option<Affine> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f64::EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let a = self.d * inv_det;
        let b = -self.b * inv_det;
        let c = -self.c * inv_det;
        let d = self.a * inv_det;
        Some(Affine {
            a,
            b,
            c,
            d,
            e: -(a * self.e + c * self.f),
            f: -(b * self.e + d * self.f),
        })
    }

    #[inline]
    fn apply(self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

/// Destination surface for composite draws.
///
/// The backing buffer starts zeroed: fully transparent black for `Rgba8`,
/// black for `Rgb8` and `Gray8`. This is the deterministic background of
/// every pixel no draw touches.
#[derive(Debug)]
pub struct Canvas {
    image: Image,
}

impl Canvas {
    /// Allocate a canvas with the given dimensions and format.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> RotateResult<Self> {
        Ok(Self {
            image: Image::new(width, height, format)?,
        })
    }

    /// Borrow a drawing context.
    ///
    /// The context starts with the identity transform, nearest-neighbor
    /// interpolation, and anti-aliasing off. The borrow is released when the
    /// context goes out of scope, on every exit path.
    pub fn context(&mut self) -> DrawContext<'_> {
        DrawContext {
            target: &mut self.image,
            transform: Affine::IDENTITY,
            interpolation: Interpolation::Nearest,
            antialias: false,
        }
    }

    /// Consume the canvas and return the painted image.
    pub fn into_image(self) -> Image {
        self.image
    }
}

/// Scoped drawing handle on a [`Canvas`].
#[derive(Debug)]
pub struct DrawContext<'a> {
    target: &'a mut Image,
    transform: Affine,
    interpolation: Interpolation,
    antialias: bool,
}

impl DrawContext<'_> {
    /// Set the interpolation quality for subsequent draws.
    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// Enable or disable edge anti-aliasing for subsequent draws.
    pub fn set_antialias(&mut self, antialias: bool) {
        self.antialias = antialias;
    }

    /// Concatenate a rotation of `radians` about `(px, py)` onto the current
    /// transform. Positive angles rotate clockwise in raster coordinates.
    pub fn rotate_about(&mut self, radians: f64, px: f64, py: f64) {
        self.transform = self
            .transform
            .compose(Affine::rotation_about(radians, px, py));
    }

    /// Composite `source` with its top-left corner at `(dx, dy)` in draw
    /// coordinates, mapped through the current transform.
    ///
    /// Pixels outside the source footprint are left untouched.
    pub fn draw_image(&mut self, source: &Image, dx: i32, dy: i32) -> RotateResult<()> {
        let expected = byte_len(source.width, source.height, source.format);
        if Some(source.pixels.len()) != expected {
            return Err(RotateError::Rendering(format!(
                "source buffer holds {} bytes, dimensions require {}",
                source.pixels.len(),
                expected.unwrap_or(usize::MAX),
            )));
        }
        if source.format != self.target.format {
            return Err(RotateError::Rendering(
                "source and canvas pixel formats differ".into(),
            ));
        }
        if source.is_empty() || self.target.is_empty() {
            return Ok(());
        }
        let inverse = self
            .transform
            .invert()
            .ok_or_else(|| RotateError::Rendering("draw transform is not invertible".into()))?;

        let src_w = f64::from(source.width);
        let src_h = f64::from(source.height);
        let (dx, dy) = (f64::from(dx), f64::from(dy));
        let (tx0, tx1, ty0, ty1) = self.device_bounds(dx, dy, src_w, src_h);

        let ch = self.target.format.channels();
        let mut sample = [0.0f64; 4];
        for ty in ty0..ty1 {
            for tx in tx0..tx1 {
                // Map the destination pixel center back into source space.
                let (ux, uy) = inverse.apply(f64::from(tx) + 0.5, f64::from(ty) + 0.5);
                let sx = ux - dx;
                let sy = uy - dy;

                let weight = if self.antialias {
                    edge_coverage(sx, src_w) * edge_coverage(sy, src_h)
                } else if sx >= 0.0 && sx < src_w && sy >= 0.0 && sy < src_h {
                    1.0
                } else {
                    0.0
                };
                if weight <= 0.0 {
                    continue;
                }

                match self.interpolation {
                    Interpolation::Bilinear => sample_bilinear(source, sx, sy, &mut sample),
                    Interpolation::Nearest => sample_nearest(source, sx, sy, &mut sample),
                }

                let base = self.target.offset(tx, ty);
                for (i, value) in sample.iter().take(ch).enumerate() {
                    let out = if weight >= 1.0 {
                        *value
                    } else {
                        value * weight + f64::from(self.target.pixels[base + i]) * (1.0 - weight)
                    };
                    self.target.pixels[base + i] = out.clamp(0.0, 255.0).round() as u8;
                }
            }
        }

        Ok(())
    }

    /// Half-open destination pixel range covered by the transformed source
    /// rectangle, padded one pixel for the anti-aliased fringe and clamped
    /// to the canvas.
    fn device_bounds(&self, dx: f64, dy: f64, src_w: f64, src_h: f64) -> (u32, u32, u32, u32) {
        let corners = [
            (dx, dy),
            (dx + src_w, dy),
            (dx, dy + src_h),
            (dx + src_w, dy + src_h),
        ];

        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for (x, y) in corners {
            let (ux, uy) = self.transform.apply(x, y);
            min_x = min_x.min(ux);
            max_x = max_x.max(ux);
            min_y = min_y.min(uy);
            max_y = max_y.max(uy);
        }

        let w = f64::from(self.target.width);
        let h = f64::from(self.target.height);
        let tx0 = (min_x - 1.0).floor().clamp(0.0, w) as u32;
        let tx1 = (max_x + 1.0).ceil().clamp(0.0, w) as u32;
        let ty0 = (min_y - 1.0).floor().clamp(0.0, h) as u32;
        let ty1 = (max_y + 1.0).ceil().clamp(0.0, h) as u32;
        (tx0, tx1, ty0, ty1)
    }
}

/// Coverage of a sample at position `p` along an axis of length `len`.
///
/// 1.0 in the interior, linear falloff across the half-pixel band straddling
/// each edge, 0.0 outside. A sample exactly on the edge is half covered.
#[inline]
fn edge_coverage(p: f64, len: f64) -> f64 {
    let dist = p.min(len - p);
    (dist + 0.5).clamp(0.0, 1.0)
}

/// Sample the four nearest source pixels with bilinear weights.
///
/// Taps are clamped to the image bounds, so positions in the anti-aliased
/// fringe just outside the image sample the nearest edge pixel.
fn sample_bilinear(source: &Image, sx: f64, sy: f64, out: &mut [f64; 4]) {
    let w = i64::from(source.width);
    let h = i64::from(source.height);

    // Pixel-center space: the center of pixel (0, 0) is at (0.5, 0.5).
    let px = sx - 0.5;
    let py = sy - 0.5;
    let x0 = px.floor();
    let y0 = py.floor();
    let fx = px - x0;
    let fy = py - y0;
    let x0 = x0 as i64;
    let y0 = y0 as i64;

    let clamp_x = |x: i64| x.clamp(0, w - 1) as u32;
    let clamp_y = |y: i64| y.clamp(0, h - 1) as u32;
    let p00 = source.offset(clamp_x(x0), clamp_y(y0));
    let p10 = source.offset(clamp_x(x0 + 1), clamp_y(y0));
    let p01 = source.offset(clamp_x(x0), clamp_y(y0 + 1));
    let p11 = source.offset(clamp_x(x0 + 1), clamp_y(y0 + 1));

    let ch = source.format.channels();
    for (i, value) in out.iter_mut().take(ch).enumerate() {
        *value = f64::from(source.pixels[p00 + i]) * (1.0 - fx) * (1.0 - fy)
            + f64::from(source.pixels[p10 + i]) * fx * (1.0 - fy)
            + f64::from(source.pixels[p01 + i]) * (1.0 - fx) * fy
            + f64::from(source.pixels[p11 + i]) * fx * fy;
    }
}

/// Sample the single nearest source pixel.
fn sample_nearest(source: &Image, sx: f64, sy: f64, out: &mut [f64; 4]) {
    let w = i64::from(source.width);
    let h = i64::from(source.height);
    let x = (sx.floor() as i64).clamp(0, w - 1) as u32;
    let y = (sy.floor() as i64).clamp(0, h - 1) as u32;

    let base = source.offset(x, y);
    let ch = source.format.channels();
    for (i, value) in out.iter_mut().take(ch).enumerate() {
        *value = f64::from(source.pixels[base + i]);
    }
}
