//! Captcha Core: the shared vocabulary of the CAPTCHA pipeline
//!
//! Text goes in, a distorted canvas comes out. Every character travels
//! the same road:
//!
//! 1. **Render** - A randomly chosen face draws the character with a little margin
//! 2. **Distort** - The glyph is cropped, rotated and quad-warped
//! 3. **Compose** - Glyphs are laid out with random kerning and blended through a hard mask
//! 4. **Noise** - Curves and dots are stroked over the composition
//! 5. **Smooth** - One 3x3 smoothing pass softens everything
//!
//! This crate holds the types that flow between those stages, the error
//! enums, and the traits that let backends and fonts be swapped:
//!
//! - [`GlyphFace`] - A font at a fixed pixel size
//! - [`Backend`] - Anything that renders text into a [`Canvas`]
//! - [`Drawing`] / [`GlyphDrawing`] - Stages of a declarative backend
//! - [`Exporter`] - Canvas to file bytes
//! - [`RandomSource`] - The single gate every random draw passes through

pub mod error;
pub mod random;
pub mod traits;

pub use error::{CaptchaError, Result};
pub use random::{RandomSource, RngSource};
pub use traits::{Backend, Drawing, Exporter, GlyphDrawing, GlyphFace};

/// The opaque RGB buffer being composed into the final image
pub type Canvas = image::RgbImage;

/// One rendered character with transparency
///
/// Pixels hold the ink blended over transparent black, so colour channels
/// are already scaled by coverage.
pub type GlyphRaster = image::RgbaImage;

/// Colours and target size of one generation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptchaParams {
    pub width: u32,
    pub height: u32,
    /// Canvas fill behind the text
    pub background: Color,
    /// Ink for glyphs and noise; alpha carries the drawn opacity
    pub color: Color,
}

/// Simple RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Each RGB channel drawn from `low..=high`, fully opaque
    pub fn random(rng: &mut dyn RandomSource, low: u8, high: u8) -> Self {
        let r = rng.int_in(low as i64, high as i64) as u8;
        let g = rng.int_in(low as i64, high as i64) as u8;
        let b = rng.int_in(low as i64, high as i64) as u8;
        Self::rgb(r, g, b)
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_rgb(self) -> image::Rgb<u8> {
        image::Rgb([self.r, self.g, self.b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_colors_respect_bounds() {
        let mut rng = RngSource::seeded(11);
        for _ in 0..200 {
            let c = Color::random(&mut rng, 238, 255);
            assert!(c.r >= 238 && c.g >= 238 && c.b >= 238);
            assert_eq!(c.a, 255);
        }
    }

    #[test]
    fn with_alpha_keeps_channels() {
        let c = Color::rgb(10, 20, 30).with_alpha(220);
        assert_eq!(c, Color::rgba(10, 20, 30, 220));
        assert_eq!(c.to_rgb(), image::Rgb([10, 20, 30]));
    }
}
