//! Info command: what this build can do

use captcha::error::Result;
use captcha::{CaptchaConfig, Strategy};

use crate::cli::InfoArgs;

pub fn run(args: &InfoArgs) -> Result<()> {
    let show_all = !args.backends && !args.formats;

    println!("captcha v{}", env!("CARGO_PKG_VERSION"));
    println!();

    if show_all || args.backends {
        print_backends();
        if show_all {
            println!();
        }
    }

    if show_all || args.formats {
        print_formats();
    }

    Ok(())
}

fn print_backends() {
    println!("Backends:");
    for strategy in Strategy::ALL {
        let config = CaptchaConfig::for_strategy(strategy);
        let sizes: Vec<String> = config.font_sizes.iter().map(|s| s.to_string()).collect();
        println!(
            "  {:<8} - {}x{}, font sizes {}{}",
            strategy.name(),
            config.width,
            config.height,
            sizes.join("/"),
            if strategy.is_available() {
                ""
            } else {
                " (not compiled in)"
            }
        );
    }
}

fn print_formats() {
    println!("Output formats:");
    for format in captcha::export::supported_formats() {
        println!("  {}", format);
    }
}
