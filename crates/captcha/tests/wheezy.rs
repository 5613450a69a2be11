//! The declarative backend behind the same facade
#![cfg(feature = "wheezy")]

use std::sync::Arc;

use captcha::error::{RenderError, Result};
use captcha::wheezy::{Background, Curve, Noise, Smooth, Text, WHEEZY_BACKGROUND, WHEEZY_INK};
use captcha::{
    Backend, Captcha, CaptchaConfig, Drawing, FontSet, GlyphFace, RngSource, Strategy,
    WheezyCaptcha,
};

struct BlockFace;

impl GlyphFace for BlockFace {
    fn name(&self) -> &str {
        "block"
    }

    fn pixel_size(&self) -> f32 {
        65.0
    }

    fn measure(&self, ch: char) -> Result<(u32, u32)> {
        if ch.is_ascii_alphanumeric() {
            Ok((40, 65))
        } else {
            Err(RenderError::GlyphNotFound(ch).into())
        }
    }

    fn rasterize(&self, _ch: char, width: u32, height: u32, x: f32, y: f32) -> Result<Vec<u8>> {
        let mut mask = vec![0u8; (width * height) as usize];
        for py in (y as u32 + 10)..(y as u32 + 55).min(height) {
            for px in (x as u32 + 8)..(x as u32 + 32).min(width) {
                mask[(py * width + px) as usize] = 255;
            }
        }
        Ok(mask)
    }
}

fn block_fonts() -> FontSet {
    FontSet::new(vec![Arc::new(BlockFace) as Arc<dyn GlyphFace>]).unwrap()
}

#[test]
fn stock_pipeline_has_five_stages() {
    let captcha = WheezyCaptcha::with_fonts(200, 75, block_fonts()).unwrap();
    assert_eq!(
        captcha.stages(),
        ["background", "text", "curve", "noise", "smooth"]
    );
    assert_eq!(captcha.name(), "wheezy");
}

#[test]
fn output_matches_the_configured_size() {
    let captcha = Captcha::from_backend(WheezyCaptcha::with_fonts(200, 75, block_fonts()).unwrap());
    for (seed, text) in ["A", "WHEEZY", "LONGERTEXTHERE"].iter().enumerate() {
        let image = captcha
            .generate_image_with(text, &mut RngSource::seeded(seed as u64))
            .unwrap();
        assert_eq!(image.dimensions(), (200, 75));
    }
}

#[test]
fn text_is_drawn_in_the_ink_colour() {
    // The pale yellow background has less blue than red; the ink has more
    let captcha = WheezyCaptcha::from_drawings(
        200,
        75,
        vec![
            Box::new(Background::default()) as Box<dyn Drawing>,
            Box::new(Text::new(block_fonts(), WHEEZY_INK, Text::default_drawings())),
        ],
    )
    .unwrap();

    let image = captcha.render("AB", &mut RngSource::seeded(2)).unwrap();
    assert!(image.pixels().any(|p| p[2] as i32 > p[0] as i32 + 40));
    assert!(image.pixels().any(|p| *p == WHEEZY_BACKGROUND.to_rgb()));
}

#[test]
fn noise_and_curve_need_no_fonts() {
    let captcha = WheezyCaptcha::from_drawings(
        120,
        50,
        vec![
            Box::new(Background::default()) as Box<dyn Drawing>,
            Box::new(Curve::default()),
            Box::new(Noise::default()),
            Box::new(Smooth),
        ],
    )
    .unwrap();
    let image = captcha.render("x", &mut RngSource::seeded(0)).unwrap();
    assert_eq!(image.dimensions(), (120, 50));
}

#[test]
fn missing_font_file_fails_construction() {
    let config = CaptchaConfig::wheezy().with_fonts(vec!["/nonexistent/font.ttf".into()]);
    assert!(Captcha::new(&config, Strategy::Wheezy).is_err());
}

#[test]
fn system_fonts_build_the_wheezy_backend_when_installed() {
    let Ok(captcha) = Captcha::new(&CaptchaConfig::wheezy(), Strategy::Wheezy) else {
        return;
    };
    assert_eq!(captcha.backend_name(), "wheezy");
    assert_eq!(captcha.dimensions(), (200, 75));
}
