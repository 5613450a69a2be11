//! Distorted-text CAPTCHA images
//!
//! Give it a string, get back an image where every character was drawn in
//! a random face, rotated, warped and overlapped with its neighbours, then
//! crossed out with noise and softened.
//!
//! ```no_run
//! use captcha::{Captcha, CaptchaConfig, Strategy};
//!
//! let captcha = Captcha::new(&CaptchaConfig::default(), Strategy::Image)?;
//! let png = captcha.generate("K7XQ", "png")?;
//! std::fs::write("captcha.png", png.into_inner())?;
//! # Ok::<(), captcha::error::CaptchaError>(())
//! ```
//!
//! Two backends sit behind the same [`Captcha`] front:
//!
//! - [`ImageCaptcha`] - Random colours, each glyph cropped, rotated and
//!   quad-warped, random kerning, an arc and dots on top
//! - `WheezyCaptcha` - A declarative list of drawing stages over fixed
//!   colours (feature `wheezy`, on by default)
//!
//! Randomness is injectable: every `*_with` method takes a
//! [`RandomSource`], so a seeded [`RngSource`] reproduces an image byte for
//! byte.

use std::io::Cursor;

pub mod config;
pub mod image_captcha;
#[cfg(feature = "wheezy")]
pub mod wheezy;

pub use captcha_core::{
    error, Backend, Canvas, CaptchaParams, Color, Drawing, GlyphDrawing, GlyphFace, RandomSource,
    RngSource,
};
pub use captcha_export as export;
pub use captcha_fontdb::Font;
pub use captcha_render as render;
pub use captcha_render::FontSet;

pub use config::{CaptchaConfig, Strategy};
pub use image_captcha::ImageCaptcha;
#[cfg(feature = "wheezy")]
pub use wheezy::WheezyCaptcha;

use captcha_core::error::{CaptchaError, Result};

/// A CAPTCHA generator with its backend chosen up front
///
/// Fonts are loaded once here and shared read-only by every call, so one
/// instance can serve many threads.
pub struct Captcha {
    backend: Box<dyn Backend>,
}

impl Captcha {
    /// Build the backend named by `strategy`
    ///
    /// Fails with [`CaptchaError::ConfigError`] when the configuration is
    /// unusable or the backend was not compiled in, and with a font error
    /// when the fonts cannot be loaded.
    pub fn new(config: &CaptchaConfig, strategy: Strategy) -> Result<Self> {
        let backend: Box<dyn Backend> = match strategy {
            Strategy::Image => Box::new(ImageCaptcha::new(config)?),
            #[cfg(feature = "wheezy")]
            Strategy::Wheezy => Box::new(WheezyCaptcha::new(config)?),
            #[cfg(not(feature = "wheezy"))]
            Strategy::Wheezy => {
                return Err(CaptchaError::ConfigError(
                    "the wheezy backend was not compiled in (enable the `wheezy` feature)".into(),
                ))
            },
        };
        log::info!(
            "{} backend ready at {}x{}",
            backend.name(),
            config.width,
            config.height
        );
        Ok(Self { backend })
    }

    /// Wrap a backend built elsewhere
    pub fn from_backend(backend: impl Backend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Output (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.backend.dimensions()
    }

    /// Render `text` and encode it as `format` (`"png"`, `"jpeg"`, ...)
    ///
    /// The cursor is positioned at the start of the encoded bytes.
    pub fn generate(&self, text: &str, format: &str) -> Result<Cursor<Vec<u8>>> {
        self.generate_with(text, format, &mut RngSource::thread())
    }

    /// [`generate`](Self::generate) with a caller-supplied random source
    pub fn generate_with(
        &self,
        text: &str,
        format: &str,
        rng: &mut dyn RandomSource,
    ) -> Result<Cursor<Vec<u8>>> {
        let exporter = captcha_export::exporter_for(format)?;
        let canvas = self.generate_image_with(text, rng)?;
        let bytes = exporter.export(&canvas)?;
        log::debug!(
            "encoded {}x{} {} ({} bytes)",
            canvas.width(),
            canvas.height(),
            exporter.name(),
            bytes.len()
        );
        Ok(Cursor::new(bytes))
    }

    /// Render `text` without encoding it
    pub fn generate_image(&self, text: &str) -> Result<Canvas> {
        self.generate_image_with(text, &mut RngSource::thread())
    }

    /// [`generate_image`](Self::generate_image) with a caller-supplied random source
    pub fn generate_image_with(&self, text: &str, rng: &mut dyn RandomSource) -> Result<Canvas> {
        if text.is_empty() {
            return Err(CaptchaError::EmptyText);
        }
        self.backend.render(text, rng)
    }
}

impl std::fmt::Debug for Captcha {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Captcha")
            .field("backend", &self.backend.name())
            .field("dimensions", &self.backend.dimensions())
            .finish()
    }
}

/// Common imports for typical usage
pub mod prelude {
    pub use crate::{Captcha, CaptchaConfig, ImageCaptcha, Strategy};
    pub use captcha_core::{
        error::{CaptchaError, Result},
        Backend, Canvas, Color, RandomSource, RngSource,
    };
}
