//! Generate command: one image to a file or stdout

use std::fs;
use std::io::{self, Write};

use captcha::error::Result;
use captcha::{Captcha, RngSource};

use super::pick_format;
use crate::cli::GenerateArgs;

pub fn run(args: &GenerateArgs) -> Result<()> {
    let captcha = Captcha::new(&args.generator.config(), args.generator.strategy())?;
    let format = pick_format(args.format.as_deref(), args.output.as_deref());

    let encoded = match args.seed {
        Some(seed) => captcha.generate_with(&args.text, &format, &mut RngSource::seeded(seed))?,
        None => captcha.generate(&args.text, &format)?,
    };
    let bytes = encoded.into_inner();

    match &args.output {
        Some(path) => {
            fs::write(path, &bytes)?;
            if !args.quiet {
                let (width, height) = captcha.dimensions();
                eprintln!(
                    "Wrote {} ({}x{} {}, {} bytes, {} backend)",
                    path.display(),
                    width,
                    height,
                    format,
                    bytes.len(),
                    captcha.backend_name()
                );
            }
        },
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        },
    }
    Ok(())
}
