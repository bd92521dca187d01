//! Reverse lookup: which templates reference a target?
//!
//! Targets may be absolute paths, paths relative to the current directory,
//! `@namespace/…` specifiers, shorthand or root-relative paths. Relative
//! paths that exist on disk are made absolute first, so
//! `twine refs components/icon.twig` works from the project root.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

use crate::utils::platform::{absolutize, normalize_path_for_storage};

use super::common::{CommandContext, display_path, print_none, run_blocking};

/// Show the templates that directly reference a target.
#[derive(Args)]
pub struct RefsCommand {
    /// Target templates
    #[arg(required = true)]
    targets: Vec<String>,
}

impl RefsCommand {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Fails only when the session cannot be created.
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let session = context.session().await?;
        let cwd = std::env::current_dir()?;
        let targets: Vec<String> = self
            .targets
            .iter()
            .map(|target| {
                let path = Path::new(target);
                if !path.is_absolute() && cwd.join(path).is_file() {
                    normalize_path_for_storage(absolutize(&cwd, path))
                } else {
                    target.clone()
                }
            })
            .collect();

        let referrers = run_blocking(move || Ok(session.referrers_of(&targets))).await?;

        println!("{}", "Referenced by:".bold());
        if referrers.is_empty() {
            print_none();
        }
        for file in &referrers {
            println!("  {}", display_path(context.base_dir(), file).cyan());
        }

        Ok(())
    }
}
