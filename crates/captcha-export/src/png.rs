//! PNG export
//!
//! PNG gets its own exporter so the compression settings are pinned instead
//! of following whatever `image` defaults to.

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};

use captcha_core::error::{ExportError, Result};
use captcha_core::{Canvas, Exporter};

/// Encode an RGB canvas as an 8-bit PNG
pub fn encode_png(canvas: &Canvas) -> Result<Vec<u8>> {
    let mut png_data = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut png_data, CompressionType::Default, FilterType::Sub);

    encoder
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| ExportError::EncodingFailed(format!("PNG encoding failed: {}", e)))?;

    Ok(png_data)
}

/// PNG exporter
///
/// ```
/// use captcha_core::Exporter;
/// use captcha_export::PngExporter;
///
/// assert_eq!(PngExporter::new().mime_type(), "image/png");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct PngExporter;

impl PngExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for PngExporter {
    fn name(&self) -> &'static str {
        "png"
    }

    fn export(&self, canvas: &Canvas) -> Result<Vec<u8>> {
        encode_png(canvas)
    }

    fn extension(&self) -> &'static str {
        "png"
    }

    fn mime_type(&self) -> &'static str {
        "image/png"
    }
}
