//! One module per subcommand

pub mod batch;
pub mod generate;
pub mod info;

use std::path::Path;

/// Explicit format, else the output's extension, else PNG
pub fn pick_format(explicit: Option<&str>, output: Option<&Path>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| {
            output
                .and_then(|p| p.extension())
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
        })
        .unwrap_or_else(|| "png".to_string())
}
