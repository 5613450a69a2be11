//! Construction-time settings

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use captcha_core::error::{CaptchaError, Result};

/// Default output size of the image backend
pub const DEFAULT_WIDTH: u32 = 160;
pub const DEFAULT_HEIGHT: u32 = 60;
/// Default pixel sizes of the image backend
pub const DEFAULT_FONT_SIZES: [f32; 3] = [42.0, 50.0, 56.0];

/// Default output size and pixel sizes of the wheezy backend
pub const WHEEZY_WIDTH: u32 = 200;
pub const WHEEZY_HEIGHT: u32 = 75;
pub const WHEEZY_FONT_SIZES: [f32; 3] = [65.0, 70.0, 75.0];

/// How a generator is built
///
/// Missing fields take their defaults when deserialising, so `{}` is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptchaConfig {
    pub width: u32,
    pub height: u32,
    /// Font files to draw with
    ///
    /// Empty means the host's default faces, discovered through fontdb
    /// (Droid Sans Mono, DejaVu Sans Mono, then any monospace or sans-serif
    /// face). Nothing is bundled, so on a host without fonts construction
    /// fails with `FontLoadError::NoSystemFonts`; name font files here to
    /// get the same output everywhere.
    pub fonts: Vec<PathBuf>,
    /// Every font is loaded at every one of these pixel sizes
    pub font_sizes: Vec<f32>,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fonts: Vec::new(),
            font_sizes: DEFAULT_FONT_SIZES.to_vec(),
        }
    }
}

impl CaptchaConfig {
    /// Preset matching the wheezy backend's own defaults
    pub fn wheezy() -> Self {
        Self {
            width: WHEEZY_WIDTH,
            height: WHEEZY_HEIGHT,
            fonts: Vec::new(),
            font_sizes: WHEEZY_FONT_SIZES.to_vec(),
        }
    }

    /// Preset for `strategy`
    pub fn for_strategy(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Image => Self::default(),
            Strategy::Wheezy => Self::wheezy(),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_fonts(mut self, fonts: Vec<PathBuf>) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_font_sizes(mut self, sizes: Vec<f32>) -> Self {
        self.font_sizes = sizes;
        self
    }

    /// Reject sizes that cannot produce an image
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptchaError::ConfigError(format!(
                "image size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.font_sizes.is_empty() {
            return Err(CaptchaError::ConfigError(
                "at least one font size is required".into(),
            ));
        }
        if let Some(bad) = self
            .font_sizes
            .iter()
            .find(|s| !(s.is_finite() && **s > 0.0))
        {
            return Err(CaptchaError::ConfigError(format!(
                "font sizes must be positive, got {}",
                bad
            )));
        }
        Ok(())
    }
}

/// Which backend renders the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Explicit pipeline: random colours, per-glyph distortion, arc and dots
    #[default]
    Image,
    /// Declarative pipeline of drawing stages
    Wheezy,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Image, Strategy::Wheezy];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Image => "image",
            Strategy::Wheezy => "wheezy",
        }
    }

    /// Whether this build can construct the backend
    pub fn is_available(self) -> bool {
        match self {
            Strategy::Image => true,
            Strategy::Wheezy => cfg!(feature = "wheezy"),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = CaptchaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(Strategy::Image),
            "wheezy" => Ok(Strategy::Wheezy),
            other => Err(CaptchaError::ConfigError(format!(
                "unknown backend '{}', expected 'image' or 'wheezy'",
                other
            ))),
        }
    }
}
