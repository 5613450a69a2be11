//! Captcha Render: the pixel-pushing half of the pipeline
//!
//! Each module owns one stage:
//!
//! - [`glyph`] - Draw one character with a random margin
//! - [`distort`] - Crop, rotate and quad-warp a glyph
//! - [`compose`] - Lay glyphs out with random kerning and blend them through a hard mask
//! - [`noise`] - Arcs, dots, bezier curves and dashes
//! - [`filter`] - The closing smoothing pass
//!
//! [`OutlineFace`] is the font-backed [`GlyphFace`](captcha_core::GlyphFace)
//! and [`FontSet`] the fixed collection a generator picks faces from.

pub mod compose;
pub mod distort;
pub mod filter;
pub mod font_set;
pub mod glyph;
pub mod noise;
pub mod outline;

pub use compose::{blank_canvas, collect_glyphs, compose, paste_with_mask, MASK_CURVE};
pub use distort::distort;
pub use filter::smooth;
pub use font_set::FontSet;
pub use glyph::render_glyph;
pub use noise::{paint_bezier_curve, paint_curve, paint_dots, paint_noise};
pub use outline::OutlineFace;
