//! The explicit pipeline: glyphs, composition, arc, dots, smoothing

use captcha_core::error::{CaptchaError, Result};
use captcha_core::{Backend, Canvas, CaptchaParams, Color, RandomSource};
use captcha_render::noise::{DOT_COUNT, DOT_WIDTH};
use captcha_render::{collect_glyphs, compose, paint_curve, paint_dots, smooth, FontSet};

use crate::config::CaptchaConfig;

/// Near-white background channels
pub const BACKGROUND_RANGE: (u8, u8) = (238, 255);
/// Text colour channels
pub const TEXT_RANGE: (u8, u8) = (10, 200);
/// Opacity stored in the text colour's alpha
pub const OPACITY_RANGE: (i64, i64) = (220, 255);

/// Generator that distorts each character on its own before laying them out
#[derive(Debug, Clone)]
pub struct ImageCaptcha {
    width: u32,
    height: u32,
    fonts: FontSet,
}

impl ImageCaptcha {
    /// Load the configured fonts and check the configuration
    pub fn new(config: &CaptchaConfig) -> Result<Self> {
        config.validate()?;
        let fonts = FontSet::load(&config.fonts, &config.font_sizes)?;
        Self::with_fonts(config.width, config.height, fonts)
    }

    /// Use an already-resolved font set
    pub fn with_fonts(width: u32, height: u32, fonts: FontSet) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CaptchaError::ConfigError(format!(
                "image size must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            fonts,
        })
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    /// Draw this call's colours
    ///
    /// The opacity is drawn before the text colour's channels.
    pub fn random_params(&self, rng: &mut dyn RandomSource) -> CaptchaParams {
        let background = Color::random(rng, BACKGROUND_RANGE.0, BACKGROUND_RANGE.1);
        let opacity = rng.int_in(OPACITY_RANGE.0, OPACITY_RANGE.1) as u8;
        let color = Color::random(rng, TEXT_RANGE.0, TEXT_RANGE.1).with_alpha(opacity);
        CaptchaParams {
            width: self.width,
            height: self.height,
            background,
            color,
        }
    }

    /// Render, distort and lay out `text` on a plain background
    pub fn create_captcha_image(
        &self,
        text: &str,
        params: &CaptchaParams,
        rng: &mut dyn RandomSource,
    ) -> Result<Canvas> {
        let char_count = text.chars().count();
        if char_count == 0 {
            return Err(CaptchaError::EmptyText);
        }

        let glyphs = collect_glyphs(text, &self.fonts, params.color, rng)?;
        Ok(compose(
            params.background,
            &glyphs,
            char_count,
            params.width,
            params.height,
            rng,
        ))
    }

    /// The full pipeline with caller-chosen colours
    pub fn render_with_params(
        &self,
        text: &str,
        params: &CaptchaParams,
        rng: &mut dyn RandomSource,
    ) -> Result<Canvas> {
        let mut canvas = self.create_captcha_image(text, params, rng)?;
        paint_curve(&mut canvas, params.color, rng)?;
        paint_dots(&mut canvas, params.color, rng, DOT_WIDTH, DOT_COUNT)?;
        Ok(smooth(&canvas))
    }
}

impl Backend for ImageCaptcha {
    fn name(&self) -> &'static str {
        "image"
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn render(&self, text: &str, rng: &mut dyn RandomSource) -> Result<Canvas> {
        let params = self.random_params(rng);
        log::debug!(
            "image captcha {:?}: background={:?} color={:?}",
            text,
            params.background,
            params.color
        );
        self.render_with_params(text, &params, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use captcha_core::RngSource;

    #[test]
    fn params_stay_in_their_ranges() {
        let captcha = ImageCaptcha {
            width: 160,
            height: 60,
            fonts: stub_fonts(),
        };
        let mut rng = RngSource::seeded(21);
        for _ in 0..100 {
            let p = captcha.random_params(&mut rng);
            assert!([p.background.r, p.background.g, p.background.b]
                .iter()
                .all(|c| (238..=255).contains(c)));
            assert!([p.color.r, p.color.g, p.color.b]
                .iter()
                .all(|c| (10..=200).contains(c)));
            assert!(p.color.a >= 220);
            assert_eq!(p.background.a, 255);
        }
    }

    #[test]
    fn opacity_is_drawn_before_the_text_channels() {
        /// Hands out 1, 2, 3, ... clamped into the requested range
        struct Counter(i64);
        impl RandomSource for Counter {
            fn int_in(&mut self, low: i64, high: i64) -> i64 {
                self.0 += 1;
                (low + self.0).min(high)
            }
            fn uniform(&mut self, low: f64, _high: f64) -> f64 {
                low
            }
        }

        let captcha = ImageCaptcha {
            width: 10,
            height: 10,
            fonts: stub_fonts(),
        };
        let p = captcha.random_params(&mut Counter(0));
        assert_eq!(p.background, Color::rgb(239, 240, 241));
        assert_eq!(p.color, Color::rgba(15, 16, 17, 224));
    }

    #[test]
    fn noise_and_smoothing_follow_composition() {
        let captcha = ImageCaptcha {
            width: 80,
            height: 30,
            fonts: stub_fonts(),
        };
        let params = CaptchaParams {
            width: 80,
            height: 30,
            background: Color::rgb(250, 250, 250),
            color: Color::rgba(20, 40, 160, 240),
        };

        let full = captcha
            .render_with_params("AB", &params, &mut RngSource::seeded(17))
            .unwrap();

        let mut rng = RngSource::seeded(17);
        let mut expected = captcha.create_captcha_image("AB", &params, &mut rng).unwrap();
        let composed = expected.clone();
        paint_curve(&mut expected, params.color, &mut rng).unwrap();
        paint_dots(&mut expected, params.color, &mut rng, DOT_WIDTH, DOT_COUNT).unwrap();
        let expected = smooth(&expected);

        assert_eq!(full, expected);
        assert_ne!(full, composed, "noise and smoothing must change the composition");
    }

    #[test]
    fn zero_sized_output_is_rejected() {
        assert!(matches!(
            ImageCaptcha::with_fonts(0, 60, stub_fonts()),
            Err(CaptchaError::ConfigError(_))
        ));
    }

    fn stub_fonts() -> FontSet {
        use captcha_core::GlyphFace;
        use std::sync::Arc;

        struct Dot;
        impl GlyphFace for Dot {
            fn name(&self) -> &str {
                "dot"
            }
            fn pixel_size(&self) -> f32 {
                1.0
            }
            fn measure(&self, _ch: char) -> Result<(u32, u32)> {
                Ok((1, 1))
            }
            fn rasterize(&self, _ch: char, w: u32, h: u32, _x: f32, _y: f32) -> Result<Vec<u8>> {
                Ok(vec![255; (w * h) as usize])
            }
        }

        FontSet::new(vec![Arc::new(Dot)]).unwrap()
    }
}
