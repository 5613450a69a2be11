//! Where fonts come from: loading and default discovery
//!
//! A CAPTCHA generator resolves its fonts once, at construction. This crate
//! turns font files (or raw bytes) into validated [`Font`]s, and finds a
//! sensible default set on the host through `fontdb` when the caller does not
//! name any files.
//!
//! Fonts store their raw data and parse it on demand, so TTC collections
//! work by face index and nothing is leaked to get `'static` references.

use std::fs;
use std::path::Path;

use fontdb::{Database, Family, Query, Style};
use read_fonts::{FontRef as ReadFontRef, TableProvider};

use captcha_core::error::{FontLoadError, Result};

/// Families tried, in order, when no font files are configured
const DEFAULT_FAMILIES: [Family<'static>; 4] = [
    Family::Name("Droid Sans Mono"),
    Family::Name("DejaVu Sans Mono"),
    Family::Monospace,
    Family::SansSerif,
];

/// A font brought into memory and validated
pub struct Font {
    data: Vec<u8>,
    face_index: u32,
    units_per_em: u16,
    name: String,
}

impl Font {
    /// Opens a font file from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_index(path, 0)
    }

    /// Opens a specific face from a font file (for TTC collections)
    pub fn from_file_index(path: impl AsRef<Path>, face_index: u32) -> Result<Self> {
        let path = path.as_ref();
        let data =
            fs::read(path).map_err(|_| FontLoadError::FileNotFound(path.display().to_string()))?;

        let mut font = Self::from_data_index(data, face_index)?;
        if let Some(stem) = path.file_stem() {
            font.name = stem.to_string_lossy().into_owned();
        }
        Ok(font)
    }

    /// Turns raw font bytes into a font
    pub fn from_data(data: Vec<u8>) -> Result<Self> {
        Self::from_data_index(data, 0)
    }

    /// Turns raw font bytes into a specific face
    pub fn from_data_index(data: Vec<u8>, face_index: u32) -> Result<Self> {
        let font_ref =
            ReadFontRef::from_index(&data, face_index).map_err(|_| FontLoadError::InvalidData)?;

        // A font without a character map cannot draw CAPTCHA text
        if font_ref.cmap().is_err() {
            return Err(FontLoadError::InvalidData.into());
        }

        let units_per_em = font_ref
            .head()
            .map(|head| head.units_per_em())
            .unwrap_or(1000);

        Ok(Font {
            data,
            face_index,
            units_per_em,
            name: format!("font#{}", face_index),
        })
    }

    /// Give the font a human-readable name for logs
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Raw font bytes as they live in the file
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Face index for TTC collections (0 for single fonts)
    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the character map has an entry for `ch`
    pub fn has_glyph(&self, ch: char) -> bool {
        ReadFontRef::from_index(&self.data, self.face_index)
            .ok()
            .and_then(|font| font.cmap().ok()?.map_codepoint(ch))
            .is_some()
    }
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("name", &self.name)
            .field("face_index", &self.face_index)
            .field("units_per_em", &self.units_per_em)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Find the default font set on this machine
///
/// Each family in the preference list contributes at most one face;
/// duplicates are dropped. When none of the generic families resolve (common
/// on minimal containers whose fontconfig aliases point nowhere), the first
/// upright face on the system is used. No font ships with the crate, so a
/// host without any fails with [`FontLoadError::NoSystemFonts`].
pub fn system_default_fonts() -> Result<Vec<Font>> {
    let mut db = Database::new();
    db.load_system_fonts();
    log::debug!("fontdb: {} system faces", db.len());

    let mut ids = Vec::new();
    for family in DEFAULT_FAMILIES {
        let families = [family];
        let query = Query {
            families: &families,
            ..Query::default()
        };
        if let Some(id) = db.query(&query) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    if ids.is_empty() {
        ids.extend(
            db.faces()
                .find(|face| face.style == Style::Normal)
                .map(|face| face.id),
        );
    }

    let mut fonts = Vec::new();
    for id in ids {
        let family = db
            .face(id)
            .and_then(|face| face.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| "system".to_string());

        let loaded = db.with_face_data(id, |data, index| Font::from_data_index(data.to_vec(), index));
        match loaded {
            Some(Ok(font)) => {
                log::info!("Using system font {}", family);
                fonts.push(font.with_name(family));
            },
            Some(Err(e)) => log::debug!("fontdb: skipping {}: {}", family, e),
            None => log::debug!("fontdb: no data for {}", family),
        }
    }

    if fonts.is_empty() {
        return Err(FontLoadError::NoSystemFonts.into());
    }
    Ok(fonts)
}
