//! Error types for the CAPTCHA pipeline

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CaptchaError>;

/// Main error type for the CAPTCHA pipeline
#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("Feature not compiled: {0}")]
    FeatureNotCompiled(String),

    #[error("Font loading failed: {0}")]
    FontLoad(#[from] FontLoadError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CAPTCHA text must contain at least one character")]
    EmptyText,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Font loading errors
#[derive(Debug, Error)]
pub enum FontLoadError {
    #[error("Font file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid font data")]
    InvalidData,

    #[error("No usable system font found")]
    NoSystemFonts,
}

/// Rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// The chosen face has no glyph for this character
    #[error("No glyph for {0:?} in the selected font")]
    GlyphNotFound(char),

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid font")]
    InvalidFont,

    #[error("Outline extraction failed")]
    OutlineExtractionFailed,

    #[error("Pixmap creation failed")]
    PixmapCreationFailed,
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Format not supported: {0}")]
    FormatNotSupported(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Decoding failed: {0}")]
    DecodingFailed(String),
}
