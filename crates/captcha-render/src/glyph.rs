//! Turning one character into a small colored raster

use image::{ImageBuffer, Rgba};

use captcha_core::error::{RenderError, Result};
use captcha_core::{Color, GlyphFace, GlyphRaster, RandomSource};

/// Largest horizontal margin added before the glyph
pub const MAX_JITTER_X: i64 = 4;
/// Largest vertical margin added above the glyph
pub const MAX_JITTER_Y: i64 = 6;

/// Render `ch` with a random margin on the top-left
///
/// The raster is the measured line box grown by `dx ∈ [0, 4]` and
/// `dy ∈ [0, 6]`, with the character drawn at `(dx, dy)`. The margin leaves
/// room for rotation later on and is cropped away before distortion.
pub fn render_glyph(
    ch: char,
    face: &dyn GlyphFace,
    color: Color,
    rng: &mut dyn RandomSource,
) -> Result<GlyphRaster> {
    let (width, height) = face.measure(ch)?;

    let dx = rng.int_in(0, MAX_JITTER_X) as u32;
    let dy = rng.int_in(0, MAX_JITTER_Y) as u32;

    log::trace!(
        "glyph {:?}: face={}@{}px box={}x{} jitter=({}, {})",
        ch,
        face.name(),
        face.pixel_size(),
        width,
        height,
        dx,
        dy
    );

    draw_glyph(ch, face, color, width + dx, height + dy, dx as f32, dy as f32)
}

/// Draw `ch` into a `width × height` transparent raster at `(x, y)`
pub fn draw_glyph(
    ch: char,
    face: &dyn GlyphFace,
    color: Color,
    width: u32,
    height: u32,
    x: f32,
    y: f32,
) -> Result<GlyphRaster> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height }.into());
    }

    let coverage = face.rasterize(ch, width, height, x, y)?;
    if coverage.len() != (width * height) as usize {
        return Err(RenderError::InvalidDimensions { width, height }.into());
    }

    Ok(ink_over_transparent(&coverage, width, height, color))
}

/// Blend `color` over transparent black through a coverage mask
///
/// Every channel, alpha included, is scaled by coverage. Edges therefore
/// darken towards black rather than fading to the ink colour, which is what
/// the luma mask in compositing expects.
pub fn ink_over_transparent(coverage: &[u8], width: u32, height: u32, color: Color) -> GlyphRaster {
    let scale = |channel: u8, cov: u8| ((channel as u32 * cov as u32 + 127) / 255) as u8;

    ImageBuffer::from_fn(width, height, |x, y| {
        let cov = coverage[(y * width + x) as usize];
        Rgba([
            scale(color.r, cov),
            scale(color.g, cov),
            scale(color.b, cov),
            scale(color.a, cov),
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use captcha_core::{CaptchaError, RngSource};

    /// Fills its whole line box except for a one-pixel border
    struct BoxFace;

    impl GlyphFace for BoxFace {
        fn name(&self) -> &str {
            "box"
        }
        fn pixel_size(&self) -> f32 {
            20.0
        }
        fn measure(&self, ch: char) -> Result<(u32, u32)> {
            match ch {
                'A'..='Z' | ' ' => Ok((12, 20)),
                _ => Err(RenderError::GlyphNotFound(ch).into()),
            }
        }
        fn rasterize(&self, ch: char, w: u32, h: u32, x: f32, y: f32) -> Result<Vec<u8>> {
            let mut mask = vec![0; (w * h) as usize];
            if ch == ' ' {
                return Ok(mask);
            }
            let (x0, y0) = (x as u32 + 1, y as u32 + 1);
            for py in y0..(y0 + 18).min(h) {
                for px in x0..(x0 + 10).min(w) {
                    mask[(py * w + px) as usize] = 255;
                }
            }
            Ok(mask)
        }
    }

    #[test]
    fn raster_grows_by_jitter() {
        let mut rng = RngSource::seeded(9);
        for _ in 0..50 {
            let g = render_glyph('A', &BoxFace, Color::black(), &mut rng).unwrap();
            assert!((12..=16).contains(&g.width()), "width {}", g.width());
            assert!((20..=26).contains(&g.height()), "height {}", g.height());
        }
    }

    #[test]
    fn ink_lands_at_the_jitter_offset() {
        let mut rng = RngSource::seeded(2);
        let color = Color::rgba(200, 100, 50, 230);
        let g = render_glyph('B', &BoxFace, color, &mut rng).unwrap();
        let dx = g.width() - 12;
        let dy = g.height() - 20;

        assert_eq!(g.get_pixel(dx, dy)[3], 0, "border pixel stays clear");
        assert_eq!(*g.get_pixel(dx + 1, dy + 1), Rgba([200, 100, 50, 230]));
    }

    #[test]
    fn missing_glyphs_propagate() {
        let mut rng = RngSource::seeded(0);
        let result = render_glyph('é', &BoxFace, Color::black(), &mut rng);
        assert!(matches!(
            result,
            Err(CaptchaError::Render(RenderError::GlyphNotFound('é')))
        ));
    }

    #[test]
    fn partial_coverage_darkens_every_channel() {
        let g = ink_over_transparent(&[128], 1, 1, Color::rgba(255, 200, 0, 255));
        assert_eq!(*g.get_pixel(0, 0), Rgba([128, 100, 0, 128]));
    }
}
