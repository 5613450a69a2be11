//! The contracts that bind every backend together
//!
//! - [`GlyphFace`] - A font at one pixel size that can measure and rasterize characters
//! - [`Backend`] - Turns text into a finished canvas
//! - [`Drawing`] - One canvas-level stage of a declarative backend
//! - [`GlyphDrawing`] - One per-character stage inside a text drawing
//! - [`Exporter`] - Encodes a finished canvas into an image file format

use crate::{error::Result, random::RandomSource, Canvas, GlyphRaster};

/// A font resolved at a fixed pixel size
///
/// Faces are shared read-only between generation calls, so implementations
/// must not need interior mutation to answer.
///
/// ```ignore
/// struct BlockFace;
///
/// impl GlyphFace for BlockFace {
///     fn name(&self) -> &str { "block" }
///     fn pixel_size(&self) -> f32 { 20.0 }
///     fn measure(&self, _ch: char) -> Result<(u32, u32)> { Ok((12, 20)) }
///     fn rasterize(&self, _ch: char, w: u32, h: u32, _x: f32, _y: f32) -> Result<Vec<u8>> {
///         Ok(vec![255; (w * h) as usize])
///     }
/// }
/// ```
pub trait GlyphFace: Send + Sync {
    /// Used for logging
    fn name(&self) -> &str;

    /// Pixel size this face renders at
    fn pixel_size(&self) -> f32;

    /// Width and height of the character's line box, both at least 1
    ///
    /// Fails with [`RenderError::GlyphNotFound`](crate::error::RenderError::GlyphNotFound)
    /// when the face cannot draw `ch`.
    fn measure(&self, ch: char) -> Result<(u32, u32)>;

    /// Coverage mask of `ch`, `width * height` bytes in row-major order
    ///
    /// `(x, y)` is the top-left corner of the character's line box inside
    /// the mask.
    fn rasterize(&self, ch: char, width: u32, height: u32, x: f32, y: f32) -> Result<Vec<u8>>;
}

/// Something that can turn text into a CAPTCHA canvas
///
/// Callers depend on this contract only; how the canvas is assembled is
/// the backend's business.
pub trait Backend: Send + Sync {
    /// Identify yourself in logs and CLI output
    fn name(&self) -> &'static str;

    /// Output dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32);

    /// Render `text`, which is never empty
    fn render(&self, text: &str, rng: &mut dyn RandomSource) -> Result<Canvas>;
}

/// A canvas-level stage of a declarative pipeline
pub trait Drawing: Send + Sync {
    fn name(&self) -> &'static str;

    /// Take the canvas, draw on it, pass it forward
    fn draw(&self, canvas: Canvas, text: &str, rng: &mut dyn RandomSource) -> Result<Canvas>;
}

/// A per-character stage applied to each glyph before placement
pub trait GlyphDrawing: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, glyph: GlyphRaster, rng: &mut dyn RandomSource) -> GlyphRaster;
}

/// Turns a finished canvas into file bytes
pub trait Exporter: Send + Sync {
    /// Who are you?
    fn name(&self) -> &'static str;

    /// Encode the canvas
    fn export(&self, canvas: &Canvas) -> Result<Vec<u8>>;

    /// File extension without the dot
    fn extension(&self) -> &'static str;

    fn mime_type(&self) -> &'static str;
}
