//! The resolved set of faces a generator draws from

use std::path::Path;
use std::sync::Arc;

use captcha_core::error::{CaptchaError, Result};
use captcha_core::{GlyphFace, RandomSource};
use captcha_fontdb::Font;

use crate::outline::OutlineFace;

/// Every configured font at every configured size
///
/// Built once per generator and never mutated afterwards, so it can be
/// shared freely between concurrent generation calls.
#[derive(Clone)]
pub struct FontSet {
    faces: Vec<Arc<dyn GlyphFace>>,
}

impl FontSet {
    /// Wrap already-resolved faces
    pub fn new(faces: Vec<Arc<dyn GlyphFace>>) -> Result<Self> {
        if faces.is_empty() {
            return Err(CaptchaError::ConfigError(
                "font set needs at least one face".into(),
            ));
        }
        Ok(Self { faces })
    }

    /// Cross product of `fonts` × `sizes`, fonts in the outer loop
    pub fn from_fonts(fonts: &[Arc<Font>], sizes: &[f32]) -> Result<Self> {
        let mut faces: Vec<Arc<dyn GlyphFace>> = Vec::with_capacity(fonts.len() * sizes.len());
        for font in fonts {
            for &size in sizes {
                faces.push(Arc::new(OutlineFace::new(font.clone(), size)?));
            }
        }
        log::info!(
            "Resolved {} faces from {} fonts x {} sizes",
            faces.len(),
            fonts.len(),
            sizes.len()
        );
        Self::new(faces)
    }

    /// Load font files from disk, or the system defaults when `paths` is empty
    pub fn load<P: AsRef<Path>>(paths: &[P], sizes: &[f32]) -> Result<Self> {
        let fonts: Vec<Arc<Font>> = if paths.is_empty() {
            captcha_fontdb::system_default_fonts()?
                .into_iter()
                .map(Arc::new)
                .collect()
        } else {
            paths
                .iter()
                .map(|path| Font::from_file(path).map(Arc::new))
                .collect::<Result<_>>()?
        };
        Self::from_fonts(&fonts, sizes)
    }

    /// Pick one face uniformly at random
    pub fn choose(&self, rng: &mut dyn RandomSource) -> &Arc<dyn GlyphFace> {
        &self.faces[rng.index(self.faces.len())]
    }

    pub fn faces(&self) -> &[Arc<dyn GlyphFace>] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.faces
                    .iter()
                    .map(|face| format!("{}@{}px", face.name(), face.pixel_size())),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use captcha_core::RngSource;

    struct SizedStub(f32);

    impl GlyphFace for SizedStub {
        fn name(&self) -> &str {
            "stub"
        }
        fn pixel_size(&self) -> f32 {
            self.0
        }
        fn measure(&self, _ch: char) -> Result<(u32, u32)> {
            Ok((1, 1))
        }
        fn rasterize(&self, _ch: char, w: u32, h: u32, _x: f32, _y: f32) -> Result<Vec<u8>> {
            Ok(vec![0; (w * h) as usize])
        }
    }

    #[test]
    fn empty_sets_are_configuration_errors() {
        assert!(matches!(
            FontSet::new(Vec::new()),
            Err(CaptchaError::ConfigError(_))
        ));
    }

    #[test]
    fn choose_reaches_every_face() {
        let set = FontSet::new(
            [42.0, 50.0, 56.0]
                .into_iter()
                .map(|s| Arc::new(SizedStub(s)) as Arc<dyn GlyphFace>)
                .collect(),
        )
        .unwrap();

        let mut rng = RngSource::seeded(5);
        let mut seen = [false; 3];
        for _ in 0..300 {
            let size = set.choose(&mut rng).pixel_size();
            let slot = [42.0, 50.0, 56.0].iter().position(|&s| s == size).unwrap();
            seen[slot] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn missing_font_files_fail_construction() {
        let result = FontSet::load(&["/no/such/font.ttf"], &[42.0]);
        assert!(matches!(result, Err(CaptchaError::FontLoad(_))));
    }

    #[test]
    fn cross_product_of_system_fonts_and_sizes() {
        let Ok(fonts) = captcha_fontdb::system_default_fonts() else {
            return;
        };
        let fonts: Vec<Arc<Font>> = fonts.into_iter().map(Arc::new).collect();
        let set = FontSet::from_fonts(&fonts, &[42.0, 50.0, 56.0]).unwrap();
        assert_eq!(set.len(), fonts.len() * 3);
        assert_eq!(set.faces()[1].pixel_size(), 50.0);
    }
}
