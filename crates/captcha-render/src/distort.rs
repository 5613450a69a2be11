//! Glyph distortion: crop, rotate, then quad-warp
//!
//! Cropping first makes the rotation pivot on the ink. The rotated raster
//! grows to fit its corners. The warp then squeezes a jittered
//! quadrilateral of an enlarged copy back into the rotated box, so the
//! output size never depends on the jitter.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

use captcha_core::{GlyphRaster, RandomSource};

/// Rotation range in degrees, either direction
pub const MAX_ROTATION: f64 = 30.0;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Crop, rotate by U(-30°, 30°), and quad-warp a glyph
///
/// The result is exactly as large as the rotated bounding box.
pub fn distort(raster: &GlyphRaster, rng: &mut dyn RandomSource) -> GlyphRaster {
    let cropped = crop_to_ink(raster);
    let angle = rng.uniform(-MAX_ROTATION, MAX_ROTATION);
    let rotated = rotate_expand(&cropped, angle);
    log::trace!(
        "distort: {}x{} -> crop {}x{} -> rotate {:.1}° -> {}x{}",
        raster.width(),
        raster.height(),
        cropped.width(),
        cropped.height(),
        angle,
        rotated.width(),
        rotated.height()
    );
    warp(&rotated, rng)
}

/// Tight box of pixels with any alpha, as `(left, top, right, bottom)`, exclusive
pub fn ink_bounds(raster: &GlyphRaster) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, px) in raster.enumerate_pixels() {
        if px[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x + 1, y + 1),
            Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x + 1), b.max(y + 1)),
        });
    }
    bounds
}

/// Crop to the ink; a raster with no ink at all (a space) is kept whole
pub fn crop_to_ink(raster: &GlyphRaster) -> GlyphRaster {
    match ink_bounds(raster) {
        Some((l, t, r, b)) => imageops::crop_imm(raster, l, t, r - l, b - t).to_image(),
        None => raster.clone(),
    }
}

/// Rotate counter-clockwise by `degrees` about the centre, growing the canvas to fit
///
/// The new size is `ceil(max) - floor(min)` of the rotated corners.
/// Sampling is bilinear; anything that maps outside the source is
/// transparent.
pub fn rotate_expand(src: &GlyphRaster, degrees: f64) -> GlyphRaster {
    let (w, h) = (src.width() as f64, src.height() as f64);

    // Rounding to 15 places keeps exact angles (0°, 90°) from growing the
    // canvas by a stray ulp.
    let theta = degrees.to_radians();
    let round15 = |v: f64| (v * 1e15).round() / 1e15;
    let (cos, sin) = (round15(theta.cos()), round15(theta.sin()));
    let (cx, cy) = (w / 2.0, h / 2.0);

    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for (x, y) in [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)] {
        let tx = cos * (x - cx) + sin * (y - cy) + cx;
        let ty = -sin * (x - cx) + cos * (y - cy) + cy;
        min_x = min_x.min(tx);
        max_x = max_x.max(tx);
        min_y = min_y.min(ty);
        max_y = max_y.max(ty);
    }

    let nw = ((max_x.ceil() - min_x.floor()) as u32).max(1);
    let nh = ((max_y.ceil() - min_y.floor()) as u32).max(1);

    // One transparent pixel all round so the bilinear taps at the ink edge
    // blend into transparency instead of falling off the image.
    let mut padded: GlyphRaster =
        ImageBuffer::from_pixel(src.width() + 2, src.height() + 2, TRANSPARENT);
    imageops::replace(&mut padded, src, 1, 1);

    // Pixel-index centres: the source centre sits one pixel in from the padding
    let (pcx, pcy) = ((w + 1.0) / 2.0, (h + 1.0) / 2.0);
    let (ncx, ncy) = ((nw as f64 - 1.0) / 2.0, (nh as f64 - 1.0) / 2.0);

    // Image y points down, so a counter-clockwise turn is a negative angle here
    let projection = Projection::translate(ncx as f32, ncy as f32)
        * Projection::rotate(-theta as f32)
        * Projection::translate(-pcx as f32, -pcy as f32);

    let mut out: GlyphRaster = ImageBuffer::from_pixel(nw, nh, TRANSPARENT);
    warp_into(&padded, &projection, Interpolation::Bilinear, TRANSPARENT, &mut out);
    out
}

/// The four random corner offsets of one warp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarpJitter {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl WarpJitter {
    /// Draw `x1, y1, x2, y2` (in that order), truncated toward zero
    pub fn draw(rng: &mut dyn RandomSource, dx: f64, dy: f64) -> Self {
        let x1 = rng.uniform(-dx, dx) as i64;
        let y1 = rng.uniform(-dy, dy) as i64;
        let x2 = rng.uniform(-dx, dx) as i64;
        let y2 = rng.uniform(-dy, dy) as i64;
        Self { x1, y1, x2, y2 }
    }

    /// Working canvas that leaves room for every corner offset
    pub fn expanded(&self, width: u32, height: u32) -> (u32, u32) {
        (
            width + self.x1.unsigned_abs() as u32 + self.x2.unsigned_abs() as u32,
            height + self.y1.unsigned_abs() as u32 + self.y2.unsigned_abs() as u32,
        )
    }

    /// Source quadrilateral inside a `w2 × h2` working canvas
    ///
    /// The asymmetric signs are deliberate and define the distortion
    /// profile; do not "fix" them.
    pub fn corners(&self, w2: u32, h2: u32) -> QuadCorners {
        let (w2, h2) = (w2 as f64, h2 as f64);
        let (x1, y1, x2, y2) = (self.x1 as f64, self.y1 as f64, self.x2 as f64, self.y2 as f64);
        QuadCorners {
            nw: (x1, y1),
            sw: (-x1, h2 - y2),
            se: (w2 + x2, h2 + y2),
            ne: (w2 - x2, -y1),
        }
    }
}

/// Source corners that map onto the destination rectangle's corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadCorners {
    pub nw: (f64, f64),
    pub sw: (f64, f64),
    pub se: (f64, f64),
    pub ne: (f64, f64),
}

/// Map the quadrilateral `corners` of `src` onto a `width × height` raster
///
/// Destination pixel centres are mapped bilinearly between the four
/// corners and sampled nearest-neighbour; anything outside `src` is
/// transparent.
pub fn quad_transform(src: &GlyphRaster, width: u32, height: u32, corners: &QuadCorners) -> GlyphRaster {
    let (w, h) = (width as f64, height as f64);
    let QuadCorners { nw, sw, se, ne } = *corners;

    let ax = [
        nw.0,
        (ne.0 - nw.0) / w,
        (sw.0 - nw.0) / h,
        (se.0 - sw.0 - ne.0 + nw.0) / (w * h),
    ];
    let ay = [
        nw.1,
        (ne.1 - nw.1) / w,
        (sw.1 - nw.1) / h,
        (se.1 - sw.1 - ne.1 + nw.1) / (w * h),
    ];

    let (sw_px, sh_px) = (src.width() as i64, src.height() as i64);
    let coord = |v: f64| if v < 0.0 { -1 } else { v as i64 };

    ImageBuffer::from_fn(width, height, |x, y| {
        let (u, v) = (x as f64 + 0.5, y as f64 + 0.5);
        let xin = ax[0] + ax[1] * u + ax[2] * v + ax[3] * u * v;
        let yin = ay[0] + ay[1] * u + ay[2] * v + ay[3] * u * v;
        let (sx, sy) = (coord(xin), coord(yin));
        if sx < 0 || sy < 0 || sx >= sw_px || sy >= sh_px {
            TRANSPARENT
        } else {
            *src.get_pixel(sx as u32, sy as u32)
        }
    })
}

/// Warp by stretching the whole raster over the enlarged working canvas
///
/// `dx = width·U(0.1, 0.3)` and `dy = height·U(0.2, 0.3)` bound the corner
/// jitter. The output keeps the input size.
pub fn warp(raster: &GlyphRaster, rng: &mut dyn RandomSource) -> GlyphRaster {
    let (width, height) = raster.dimensions();
    let dx = width as f64 * rng.uniform(0.1, 0.3);
    let dy = height as f64 * rng.uniform(0.2, 0.3);

    let jitter = WarpJitter::draw(rng, dx, dy);
    let (w2, h2) = jitter.expanded(width, height);
    log::trace!("warp: {:?} working canvas {}x{}", jitter, w2, h2);

    let stretched = imageops::resize(raster, w2, h2, FilterType::CatmullRom);
    quad_transform(&stretched, width, height, &jitter.corners(w2, h2))
}

/// Warp by padding the raster instead of stretching it
///
/// The raster is placed at `(|x1|, |y1|)` on a transparent working canvas;
/// `dx_factor` and `dy_factor` scale the jitter bounds directly.
pub fn warp_padded(
    raster: &GlyphRaster,
    rng: &mut dyn RandomSource,
    dx_factor: f64,
    dy_factor: f64,
) -> GlyphRaster {
    let (width, height) = raster.dimensions();
    let jitter = WarpJitter::draw(rng, width as f64 * dx_factor, height as f64 * dy_factor);
    let (w2, h2) = jitter.expanded(width, height);

    let mut padded: GlyphRaster = ImageBuffer::from_pixel(w2, h2, TRANSPARENT);
    imageops::replace(
        &mut padded,
        raster,
        jitter.x1.abs(),
        jitter.y1.abs(),
    );
    quad_transform(&padded, width, height, &jitter.corners(w2, h2))
}

/// Grow the raster by `(dx, dy)` on the top-left, shifting the content
pub fn pad_top_left(raster: &GlyphRaster, dx: u32, dy: u32) -> GlyphRaster {
    let mut padded: GlyphRaster =
        ImageBuffer::from_pixel(raster.width() + dx, raster.height() + dy, TRANSPARENT);
    imageops::replace(&mut padded, raster, dx as i64, dy as i64);
    padded
}
