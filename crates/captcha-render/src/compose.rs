//! Laying distorted glyphs out on the background
//!
//! Glyphs are placed left to right with a random, never-positive kerning
//! step, so neighbours may overlap but never swap places. The canvas grows
//! to fit the whole run and is squeezed back to the requested size at the
//! end, which is what guarantees the output dimensions.

use image::imageops::{self, FilterType};
use image::ImageBuffer;

use captcha_core::error::Result;
use captcha_core::{Canvas, Color, GlyphRaster, RandomSource};

use crate::distort::distort;
use crate::font_set::FontSet;
use crate::glyph::render_glyph;

/// Intensity curve applied to glyph luma before blending: `v ↦ min(255, ⌊1.97·v⌋)`
///
/// Amplifying partial coverage gives a hard mask, so overlapping glyphs
/// stay dark instead of washing each other out.
pub const MASK_CURVE: [u8; 256] = mask_curve();

const fn mask_curve() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let v = i * 197 / 100;
        table[i] = if v > 255 { 255 } else { v as u8 };
        i += 1;
    }
    table
}

/// ITU-R 601 luma with 16-bit fixed-point weights
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

/// Hard blending mask of a glyph: its luma pushed through [`MASK_CURVE`]
pub fn glyph_mask(glyph: &GlyphRaster) -> image::GrayImage {
    ImageBuffer::from_fn(glyph.width(), glyph.height(), |x, y| {
        let px = glyph.get_pixel(x, y);
        image::Luma([MASK_CURVE[luma(px[0], px[1], px[2]) as usize]])
    })
}

/// Blend `glyph` onto `canvas` at `(x, y)` through its hard mask
///
/// Only the glyph's colour channels are used; its alpha is ignored, as the
/// mask already carries coverage. Pixels falling outside the canvas are
/// clipped.
pub fn paste_with_mask(canvas: &mut Canvas, glyph: &GlyphRaster, x: i64, y: i64) {
    let mask = glyph_mask(glyph);
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);

    for (gx, gy, px) in glyph.enumerate_pixels() {
        let (cx, cy) = (x + gx as i64, y + gy as i64);
        if cx < 0 || cy < 0 || cx >= cw || cy >= ch {
            continue;
        }
        let m = mask.get_pixel(gx, gy)[0] as u32;
        if m == 0 {
            continue;
        }
        let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
        for c in 0..3 {
            dst[c] = ((px[c] as u32 * m + dst[c] as u32 * (255 - m) + 127) / 255) as u8;
        }
    }
}

/// Render and distort every character, with random blank glyphs mixed in
///
/// Each input character has an even chance of being preceded by a distorted
/// space, so the result holds between `n` and `2n` rasters.
pub fn collect_glyphs(
    text: &str,
    fonts: &FontSet,
    color: Color,
    rng: &mut dyn RandomSource,
) -> Result<Vec<GlyphRaster>> {
    let mut glyphs = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        if rng.coin() {
            glyphs.push(distorted_glyph(' ', fonts, color, rng)?);
        }
        glyphs.push(distorted_glyph(ch, fonts, color, rng)?);
    }
    Ok(glyphs)
}

fn distorted_glyph(
    ch: char,
    fonts: &FontSet,
    color: Color,
    rng: &mut dyn RandomSource,
) -> Result<GlyphRaster> {
    let face = fonts.choose(rng);
    let raster = render_glyph(ch, face.as_ref(), color, rng)?;
    Ok(distort(&raster, rng))
}

/// Place `glyphs` on a background and fit the result to `width × height`
///
/// `char_count` is the number of characters in the original text (not the
/// number of glyphs) and sets the average advance used for the start offset
/// and the kerning range.
///
/// # Panics
///
/// Panics if `char_count` is zero; callers reject empty text first.
pub fn compose(
    background: Color,
    glyphs: &[GlyphRaster],
    char_count: usize,
    width: u32,
    height: u32,
    rng: &mut dyn RandomSource,
) -> Canvas {
    let text_width: u32 = glyphs.iter().map(|g| g.width()).sum();
    let canvas_width = text_width.max(width);
    let mut canvas: Canvas = ImageBuffer::from_pixel(canvas_width, height, background.to_rgb());

    let average = text_width as i64 / char_count as i64;
    let rand = (0.25 * average as f64) as i64;
    let mut offset = (average as f64 * 0.1) as i64;

    log::debug!(
        "compose: {} glyphs, text_width={} canvas={}x{} average={} kerning=[-{}, 0]",
        glyphs.len(),
        text_width,
        canvas_width,
        height,
        average,
        rand
    );

    for glyph in glyphs {
        let (gw, gh) = glyph.dimensions();
        let top = (height as i64 - gh as i64) / 2;
        paste_with_mask(&mut canvas, glyph, offset, top);
        offset += gw as i64 + rng.int_in(-rand, 0);
    }

    if canvas_width > width {
        canvas = imageops::resize(&canvas, width, height, FilterType::CatmullRom);
    }
    canvas
}

/// Fill a canvas with one colour
pub fn blank_canvas(width: u32, height: u32, color: Color) -> Canvas {
    ImageBuffer::from_pixel(width, height, color.to_rgb())
}
