//! `captcha` - generate distorted-text CAPTCHA images from the command line

mod cli;
mod commands;

use clap::Parser;

use captcha::error::Result;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Info(args) => commands::info::run(&args),
        Commands::Generate(args) => commands::generate::run(&args),
        Commands::Batch(args) => commands::batch::run(&args),
    }
}
