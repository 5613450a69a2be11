//! Command-line arguments, defined with clap's derive API

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use captcha::{CaptchaConfig, Strategy};

/// Generate distorted-text CAPTCHA images
#[derive(Parser, Debug)]
#[command(name = "captcha")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Display the available backends and output formats
    #[command(alias = "i")]
    Info(InfoArgs),

    /// Render one CAPTCHA image
    #[command(alias = "g")]
    Generate(GenerateArgs),

    /// Render many CAPTCHAs from a JSONL job file
    Batch(BatchArgs),
}

/// Arguments for the info command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// List rendering backends
    #[arg(long)]
    pub backends: bool,

    /// List output formats
    #[arg(long)]
    pub formats: bool,
}

/// Rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BackendArg {
    /// Per-glyph distortion with random colours, arc and dots
    #[default]
    Image,
    /// Declarative drawing pipeline with fixed colours
    Wheezy,
}

impl From<BackendArg> for Strategy {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Image => Strategy::Image,
            BackendArg::Wheezy => Strategy::Wheezy,
        }
    }
}

/// Options shared by every command that builds a generator
#[derive(Args, Debug, Clone)]
pub struct GeneratorArgs {
    /// Rendering backend
    #[arg(short = 'b', long = "backend", value_enum, default_value_t = BackendArg::Image)]
    pub backend: BackendArg,

    /// Image width in pixels (backend default if omitted)
    #[arg(short = 'W', long = "width")]
    pub width: Option<u32>,

    /// Image height in pixels (backend default if omitted)
    #[arg(short = 'H', long = "height")]
    pub height: Option<u32>,

    /// Font file; repeat for several (system fonts if omitted)
    #[arg(short = 'f', long = "font", action = ArgAction::Append)]
    pub fonts: Vec<PathBuf>,

    /// Font pixel size; repeat for several (backend default if omitted)
    #[arg(short = 's', long = "size", action = ArgAction::Append)]
    pub sizes: Vec<f32>,
}

impl GeneratorArgs {
    pub fn strategy(&self) -> Strategy {
        self.backend.into()
    }

    /// Backend preset with the flags layered on top
    pub fn config(&self) -> CaptchaConfig {
        let mut config = CaptchaConfig::for_strategy(self.strategy());
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if !self.fonts.is_empty() {
            config.fonts = self.fonts.clone();
        }
        if !self.sizes.is_empty() {
            config.font_sizes = self.sizes.clone();
        }
        config
    }
}

/// Arguments for the generate command
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Text to draw
    pub text: String,

    #[command(flatten)]
    pub generator: GeneratorArgs,

    /// Output file path (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format: png, jpeg, bmp, gif, tiff, pnm (from the output extension if omitted)
    #[arg(short = 'O', long = "format")]
    pub format: Option<String>,

    /// Seed for a reproducible image
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Silent mode
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

/// Arguments for the batch command
#[derive(Parser, Debug)]
pub struct BatchArgs {
    /// Input JSONL file, one job per line (stdin if omitted)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'o', long = "output", default_value = ".")]
    pub output: PathBuf,

    /// File name pattern for jobs without an output, {} is the job number
    #[arg(short = 'p', long = "pattern", default_value = "captcha_{}")]
    pub pattern: String,

    #[command(flatten)]
    pub generator: GeneratorArgs,

    /// Silent mode
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Report every job
    #[arg(long = "verbose")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_the_backend_preset() {
        let cli = Cli::parse_from([
            "captcha", "generate", "AB12", "-b", "wheezy", "-W", "300", "-s", "40", "-s", "44",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let config = args.generator.config();
        assert_eq!(args.generator.strategy(), Strategy::Wheezy);
        assert_eq!((config.width, config.height), (300, 75));
        assert_eq!(config.font_sizes, vec![40.0, 44.0]);
    }

    #[test]
    fn image_backend_is_the_default() {
        let cli = Cli::parse_from(["captcha", "g", "XY"]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.generator.config(), CaptchaConfig::default());
        assert!(args.output.is_none());
    }
}
