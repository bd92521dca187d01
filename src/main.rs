//! Twine CLI entry point
//!
//! Parses the command line, runs the selected command and prints failures
//! with context and suggestions.

use anyhow::Result;
use clap::Parser;
use twine_cli::cli;
use twine_cli::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
