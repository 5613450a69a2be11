//! Captcha Export: from canvas to file bytes
//!
//! Formats are named the way file extensions are (`png`, `jpg`, `bmp`,
//! ...). Anything the `image` crate was built to write is accepted; PNG
//! goes through [`PngExporter`] with fixed settings.

use std::io::Cursor;

use image::ImageFormat;

use captcha_core::error::{CaptchaError, ExportError, Result};
use captcha_core::{Canvas, Exporter};

pub mod png;

pub use png::PngExporter;

/// Names tried by [`supported_formats`]
const KNOWN_EXTENSIONS: &[&str] = &[
    "png", "jpeg", "jpg", "bmp", "gif", "tiff", "tif", "pnm", "ppm", "webp", "ico", "tga", "qoi",
];

/// Resolve a format name (`"png"`, `".JPG"`, ...) to a writable format
pub fn resolve_format(name: &str) -> Result<ImageFormat> {
    let ext = name.trim().trim_start_matches('.').to_ascii_lowercase();
    let format = ImageFormat::from_extension(&ext)
        .ok_or_else(|| ExportError::FormatNotSupported(name.to_string()))?;

    if !format.writing_enabled() {
        return Err(CaptchaError::FeatureNotCompiled(format!("{} encoder", ext)));
    }
    Ok(format)
}

/// Every format name [`resolve_format`] accepts in this build
pub fn supported_formats() -> Vec<&'static str> {
    KNOWN_EXTENSIONS
        .iter()
        .copied()
        .filter(|ext| resolve_format(ext).is_ok())
        .collect()
}

/// Encoder for any writable format through `image`'s own dispatch
#[derive(Debug, Clone, Copy)]
pub struct ImageExporter {
    format: ImageFormat,
}

impl ImageExporter {
    pub fn new(format: ImageFormat) -> Self {
        Self { format }
    }
}

impl Exporter for ImageExporter {
    fn name(&self) -> &'static str {
        self.extension()
    }

    fn export(&self, canvas: &Canvas) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        canvas
            .write_to(&mut Cursor::new(&mut bytes), self.format)
            .map_err(|e| {
                ExportError::EncodingFailed(format!("{:?} encoding failed: {}", self.format, e))
            })?;
        Ok(bytes)
    }

    fn extension(&self) -> &'static str {
        match self.format {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Pnm => "pnm",
            ImageFormat::Tiff => "tiff",
            other => other.extensions_str().first().copied().unwrap_or("bin"),
        }
    }

    fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Pick the exporter for a format name
pub fn exporter_for(name: &str) -> Result<Box<dyn Exporter>> {
    let format = resolve_format(name)?;
    let exporter: Box<dyn Exporter> = match format {
        ImageFormat::Png => Box::new(PngExporter::new()),
        other => Box::new(ImageExporter::new(other)),
    };
    log::debug!("format {:?} -> {} exporter", name, exporter.name());
    Ok(exporter)
}

/// Encode `canvas` in the named format
pub fn encode(canvas: &Canvas, format: &str) -> Result<Vec<u8>> {
    exporter_for(format)?.export(canvas)
}

/// Decode image bytes (any readable format) back into an RGB canvas
pub fn decode(bytes: &[u8]) -> Result<Canvas> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| ExportError::DecodingFailed(e.to_string()))?;
    Ok(image.to_rgb8())
}
