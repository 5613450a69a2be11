//! Outline faces: skrifa outlines rasterized by tiny-skia
//!
//! This is the production [`GlyphFace`]. Outlines come out of skrifa in
//! font space (y up), go through a kurbo path so we can measure their ink
//! box, and land in a tiny-skia pixmap whose alpha channel becomes the
//! coverage mask.

use std::sync::Arc;

use kurbo::{BezPath, PathEl, Shape};
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::DrawSettings;
use skrifa::MetadataProvider;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

use captcha_core::error::{RenderError, Result};
use captcha_core::GlyphFace;
use captcha_fontdb::Font;

/// A loaded font pinned to one pixel size
pub struct OutlineFace {
    font: Arc<Font>,
    size: f32,
    ascent: f32,
    descent: f32,
}

impl OutlineFace {
    /// Resolve `font` at `size` pixels
    pub fn new(font: Arc<Font>, size: f32) -> Result<Self> {
        if !(size.is_finite() && size > 0.0) {
            return Err(RenderError::InvalidDimensions {
                width: 0,
                height: size.max(0.0) as u32,
            }
            .into());
        }

        let font_ref = skrifa::FontRef::from_index(font.data(), font.face_index())
            .map_err(|_| RenderError::InvalidFont)?;
        let metrics = font_ref.metrics(Size::new(size), LocationRef::default());

        Ok(Self {
            font,
            size,
            ascent: metrics.ascent,
            descent: metrics.descent,
        })
    }

    /// Trace `ch` into a pixel-space path (y up) and report its advance
    fn outline(&self, ch: char) -> Result<(BezPath, f32)> {
        let font_ref = skrifa::FontRef::from_index(self.font.data(), self.font.face_index())
            .map_err(|_| RenderError::InvalidFont)?;

        let glyph_id = font_ref
            .charmap()
            .map(ch)
            .ok_or(RenderError::GlyphNotFound(ch))?;

        let size = Size::new(self.size);
        let advance = font_ref
            .glyph_metrics(size, LocationRef::default())
            .advance_width(glyph_id)
            .unwrap_or(0.0);

        let mut path = BezPath::new();
        // Empty glyphs (space) have no outline entry at all
        if let Some(glyph) = font_ref.outline_glyphs().get(glyph_id) {
            let mut pen = PathPen { path: &mut path };
            glyph
                .draw(DrawSettings::unhinted(size, LocationRef::default()), &mut pen)
                .map_err(|_| RenderError::OutlineExtractionFailed)?;
        }

        Ok((path, advance))
    }
}

impl GlyphFace for OutlineFace {
    fn name(&self) -> &str {
        self.font.name()
    }

    fn pixel_size(&self) -> f32 {
        self.size
    }

    fn measure(&self, ch: char) -> Result<(u32, u32)> {
        let (path, advance) = self.outline(ch)?;

        let mut right = advance;
        if path.elements().len() > 1 {
            let bbox = path.bounding_box();
            if bbox.x1.is_finite() {
                right = right.max(bbox.x1 as f32);
            }
        }

        let width = (right.ceil() as u32).max(1);
        let height = ((self.ascent - self.descent).ceil() as u32).max(1);
        Ok((width, height))
    }

    fn rasterize(&self, ch: char, width: u32, height: u32, x: f32, y: f32) -> Result<Vec<u8>> {
        let (path, _) = self.outline(ch)?;

        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::PixmapCreationFailed)?;

        // No ink (space and friends): an empty mask of the requested size
        let Some(skia_path) = to_skia_path(&path) else {
            return Ok(vec![0; (width * height) as usize]);
        };

        let paint = Paint {
            anti_alias: true,
            ..Default::default()
        };

        // Flip y (fonts are y-up) and put the baseline `ascent` below the line box top
        let transform = Transform::from_row(1.0, 0.0, 0.0, -1.0, x, y + self.ascent);
        pixmap.fill_path(&skia_path, &paint, FillRule::Winding, transform, None);

        Ok(pixmap.data().chunks_exact(4).map(|px| px[3]).collect())
    }
}

/// Convert a kurbo path into tiny-skia's format
///
/// `None` when the path has no drawable segments.
pub(crate) fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for element in path.elements() {
        match *element {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(ctrl, end) => {
                builder.quad_to(ctrl.x as f32, ctrl.y as f32, end.x as f32, end.y as f32)
            },
            PathEl::CurveTo(c1, c2, end) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                end.x as f32,
                end.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

/// Bridge between skrifa's outline commands and kurbo's path format
struct PathPen<'a> {
    path: &'a mut BezPath,
}

impl skrifa::outline::OutlinePen for PathPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to((x as f64, y as f64));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to((x as f64, y as f64));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.path
            .quad_to((cx0 as f64, cy0 as f64), (x as f64, y as f64));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.path.curve_to(
            (cx0 as f64, cy0 as f64),
            (cx1 as f64, cy1 as f64),
            (x as f64, y as f64),
        );
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use captcha_core::CaptchaError;

    fn system_font() -> Option<Arc<Font>> {
        captcha_fontdb::system_default_fonts()
            .ok()?
            .into_iter()
            .next()
            .map(Arc::new)
    }

    #[test]
    fn rejects_non_positive_sizes() {
        let Some(font) = system_font() else { return };
        assert!(OutlineFace::new(font.clone(), 0.0).is_err());
        assert!(OutlineFace::new(font, f32::NAN).is_err());
    }

    #[test]
    fn measures_and_draws_latin_capitals() {
        let Some(font) = system_font() else { return };
        if !font.has_glyph('A') {
            return;
        }
        let face = OutlineFace::new(font, 42.0).unwrap();

        let (w, h) = face.measure('A').unwrap();
        assert!(w > 10 && h > 30, "unexpected box {}x{}", w, h);

        let mask = face.rasterize('A', w, h, 0.0, 0.0).unwrap();
        assert_eq!(mask.len(), (w * h) as usize);
        assert!(mask.iter().any(|&c| c > 0), "'A' should leave ink");
    }

    #[test]
    fn space_measures_but_leaves_no_ink() {
        let Some(font) = system_font() else { return };
        if !font.has_glyph(' ') {
            return;
        }
        let face = OutlineFace::new(font, 50.0).unwrap();
        let (w, h) = face.measure(' ').unwrap();
        assert!(w >= 1 && h >= 1);
        let mask = face.rasterize(' ', w, h, 0.0, 0.0).unwrap();
        assert!(mask.iter().all(|&c| c == 0));
    }

    #[test]
    fn unmapped_characters_fail_loudly() {
        let Some(font) = system_font() else { return };
        // Private-use code point: no general-purpose font maps it
        let ch = '\u{10FFFD}';
        if font.has_glyph(ch) {
            return;
        }
        let face = OutlineFace::new(font, 42.0).unwrap();
        assert!(matches!(
            face.measure(ch),
            Err(CaptchaError::Render(RenderError::GlyphNotFound(c))) if c == ch
        ));
    }
}
