//! The declarative pipeline: a list of drawings run over a white canvas
//!
//! Every stage is a [`Drawing`]. The text stage has its own list of
//! [`GlyphDrawing`]s applied to each character before it is placed.
//! [`WheezyCaptcha::new`] assembles the stock pipeline:
//!
//! ```text
//! background -> text(warp, rotate, offset) -> curve -> noise -> smooth
//! ```

use image::ImageBuffer;

use captcha_core::error::{CaptchaError, Result};
use captcha_core::{Backend, Canvas, Color, Drawing, GlyphDrawing, GlyphRaster, RandomSource};
use captcha_render::distort::{crop_to_ink, pad_top_left, rotate_expand, warp_padded};
use captcha_render::glyph::draw_glyph;
use captcha_render::noise::{BEZIER_POINTS, BEZIER_WIDTH, NOISE_COUNT, NOISE_LEVEL};
use captcha_render::{paint_bezier_curve, paint_noise, paste_with_mask, smooth, FontSet};

use crate::config::CaptchaConfig;

/// Pale yellow used for the background and the noise dashes
pub const WHEEZY_BACKGROUND: Color = Color::rgb(0xEE, 0xEE, 0xCC);
/// Steel blue used for the text and the curve
pub const WHEEZY_INK: Color = Color::rgb(0x5C, 0x87, 0xB2);
/// Fraction of each glyph's width the next one advances by
pub const SQUEEZE_FACTOR: f64 = 0.8;

/// Fill the whole canvas with one colour
#[derive(Debug, Clone, Copy)]
pub struct Background {
    pub color: Color,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            color: WHEEZY_BACKGROUND,
        }
    }
}

impl Drawing for Background {
    fn name(&self) -> &'static str {
        "background"
    }

    fn draw(&self, mut canvas: Canvas, _text: &str, _rng: &mut dyn RandomSource) -> Result<Canvas> {
        let fill = self.color.to_rgb();
        canvas.pixels_mut().for_each(|px| *px = fill);
        Ok(canvas)
    }
}

/// Draw each character in a random face, transform it, then lay the run out centred
pub struct Text {
    fonts: FontSet,
    color: Color,
    drawings: Vec<Box<dyn GlyphDrawing>>,
}

impl Text {
    pub fn new(fonts: FontSet, color: Color, drawings: Vec<Box<dyn GlyphDrawing>>) -> Self {
        Self {
            fonts,
            color,
            drawings,
        }
    }

    /// Stock glyph stages: warp, rotate, offset
    pub fn default_drawings() -> Vec<Box<dyn GlyphDrawing>> {
        vec![
            Box::new(Warp::default()),
            Box::new(Rotate::default()),
            Box::new(Offset::default()),
        ]
    }

    fn char_image(&self, ch: char, rng: &mut dyn RandomSource) -> Result<GlyphRaster> {
        let face = self.fonts.choose(rng);
        let (w, h) = face.measure(ch)?;
        let glyph = draw_glyph(ch, face.as_ref(), self.color, w, h, 0.0, 0.0)?;

        let mut glyph = crop_to_ink(&glyph);
        for drawing in &self.drawings {
            glyph = drawing.apply(glyph, rng);
        }
        Ok(glyph)
    }
}

impl Drawing for Text {
    fn name(&self) -> &'static str {
        "text"
    }

    fn draw(&self, mut canvas: Canvas, text: &str, rng: &mut dyn RandomSource) -> Result<Canvas> {
        let glyphs = text
            .chars()
            .map(|ch| self.char_image(ch, rng))
            .collect::<Result<Vec<_>>>()?;
        let Some((last, rest)) = glyphs.split_last() else {
            return Ok(canvas);
        };

        let (width, height) = (canvas.width() as i64, canvas.height() as i64);
        let advance = |g: &GlyphRaster| (g.width() as f64 * SQUEEZE_FACTOR) as i64;
        let run: i64 = rest.iter().map(advance).sum::<i64>() + last.width() as i64;
        let mut offset = (width - run) / 2;

        for glyph in &glyphs {
            let top = (height - glyph.height() as i64) / 2;
            paste_with_mask(&mut canvas, glyph, offset, top);
            offset += advance(glyph);
        }
        Ok(canvas)
    }
}

/// Quad-warp a glyph with jitter proportional to its size
#[derive(Debug, Clone, Copy)]
pub struct Warp {
    pub dx_factor: f64,
    pub dy_factor: f64,
}

impl Default for Warp {
    fn default() -> Self {
        Self {
            dx_factor: 0.27,
            dy_factor: 0.21,
        }
    }
}

impl GlyphDrawing for Warp {
    fn name(&self) -> &'static str {
        "warp"
    }

    fn apply(&self, glyph: GlyphRaster, rng: &mut dyn RandomSource) -> GlyphRaster {
        warp_padded(&glyph, rng, self.dx_factor, self.dy_factor)
    }
}

/// Rotate a glyph by up to `angle` degrees either way, expanding to fit
#[derive(Debug, Clone, Copy)]
pub struct Rotate {
    pub angle: f64,
}

impl Default for Rotate {
    fn default() -> Self {
        Self { angle: 25.0 }
    }
}

impl GlyphDrawing for Rotate {
    fn name(&self) -> &'static str {
        "rotate"
    }

    fn apply(&self, glyph: GlyphRaster, rng: &mut dyn RandomSource) -> GlyphRaster {
        rotate_expand(&glyph, rng.uniform(-self.angle, self.angle))
    }
}

/// Shift a glyph right and down inside a larger transparent box
#[derive(Debug, Clone, Copy)]
pub struct Offset {
    pub dx_factor: f64,
    pub dy_factor: f64,
}

impl Default for Offset {
    fn default() -> Self {
        Self {
            dx_factor: 0.1,
            dy_factor: 0.2,
        }
    }
}

impl GlyphDrawing for Offset {
    fn name(&self) -> &'static str {
        "offset"
    }

    fn apply(&self, glyph: GlyphRaster, rng: &mut dyn RandomSource) -> GlyphRaster {
        let dx = (rng.unit() * glyph.width() as f64 * self.dx_factor) as u32;
        let dy = (rng.unit() * glyph.height() as f64 * self.dy_factor) as u32;
        pad_top_left(&glyph, dx, dy)
    }
}

/// Bezier curve across the width
#[derive(Debug, Clone, Copy)]
pub struct Curve {
    pub color: Color,
    pub width: f32,
    pub number: usize,
}

impl Default for Curve {
    fn default() -> Self {
        Self {
            color: WHEEZY_INK,
            width: BEZIER_WIDTH,
            number: BEZIER_POINTS,
        }
    }
}

impl Drawing for Curve {
    fn name(&self) -> &'static str {
        "curve"
    }

    fn draw(&self, mut canvas: Canvas, _text: &str, rng: &mut dyn RandomSource) -> Result<Canvas> {
        paint_bezier_curve(&mut canvas, self.color, rng, self.width, self.number)?;
        Ok(canvas)
    }
}

/// Short dashes in the background colour, breaking up strokes
#[derive(Debug, Clone, Copy)]
pub struct Noise {
    pub color: Color,
    pub number: usize,
    pub level: u32,
}

impl Default for Noise {
    fn default() -> Self {
        Self {
            color: WHEEZY_BACKGROUND,
            number: NOISE_COUNT,
            level: NOISE_LEVEL,
        }
    }
}

impl Drawing for Noise {
    fn name(&self) -> &'static str {
        "noise"
    }

    fn draw(&self, mut canvas: Canvas, _text: &str, rng: &mut dyn RandomSource) -> Result<Canvas> {
        paint_noise(&mut canvas, self.color, rng, self.number, self.level)?;
        Ok(canvas)
    }
}

/// One 3x3 smoothing pass
#[derive(Debug, Clone, Copy, Default)]
pub struct Smooth;

impl Drawing for Smooth {
    fn name(&self) -> &'static str {
        "smooth"
    }

    fn draw(&self, canvas: Canvas, _text: &str, _rng: &mut dyn RandomSource) -> Result<Canvas> {
        Ok(smooth(&canvas))
    }
}

/// Generator running a fixed list of drawings
pub struct WheezyCaptcha {
    width: u32,
    height: u32,
    drawings: Vec<Box<dyn Drawing>>,
}

impl WheezyCaptcha {
    /// Stock pipeline over the configured fonts
    pub fn new(config: &CaptchaConfig) -> Result<Self> {
        config.validate()?;
        let fonts = FontSet::load(&config.fonts, &config.font_sizes)?;
        Self::with_fonts(config.width, config.height, fonts)
    }

    /// Stock pipeline over an already-resolved font set
    pub fn with_fonts(width: u32, height: u32, fonts: FontSet) -> Result<Self> {
        let drawings: Vec<Box<dyn Drawing>> = vec![
            Box::new(Background::default()),
            Box::new(Text::new(fonts, WHEEZY_INK, Text::default_drawings())),
            Box::new(Curve::default()),
            Box::new(Noise::default()),
            Box::new(Smooth),
        ];
        Self::from_drawings(width, height, drawings)
    }

    /// Any pipeline of drawings
    pub fn from_drawings(width: u32, height: u32, drawings: Vec<Box<dyn Drawing>>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CaptchaError::ConfigError(format!(
                "image size must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            drawings,
        })
    }

    /// Stage names in run order
    pub fn stages(&self) -> Vec<&'static str> {
        self.drawings.iter().map(|d| d.name()).collect()
    }
}

impl Backend for WheezyCaptcha {
    fn name(&self) -> &'static str {
        "wheezy"
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn render(&self, text: &str, rng: &mut dyn RandomSource) -> Result<Canvas> {
        if text.is_empty() {
            return Err(CaptchaError::EmptyText);
        }

        let mut canvas: Canvas =
            ImageBuffer::from_pixel(self.width, self.height, Color::white().to_rgb());
        for drawing in &self.drawings {
            log::trace!("wheezy stage {}", drawing.name());
            canvas = drawing.draw(canvas, text, rng)?;
        }
        Ok(canvas)
    }
}

impl std::fmt::Debug for WheezyCaptcha {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WheezyCaptcha")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stages", &self.stages())
            .finish()
    }
}
