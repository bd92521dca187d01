//! Resolve a single template specifier.
//!
//! Prints the canonical key and the file it was read from:
//!
//! ```text
//! $ twine -n widgets=components resolve widgets:button
//! @widgets/button/button.twig  components/button/button.twig
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{CommandContext, display_path, run_blocking};

/// Resolve a template specifier to its canonical key.
#[derive(Args)]
pub struct ResolveCommand {
    /// Plain path, `@namespace/path`, `namespace:component` or absolute path
    specifier: String,

    /// Also print the template source
    #[arg(long)]
    content: bool,
}

impl ResolveCommand {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Fails with a not-found error listing roots, namespaces and similar
    /// keys when no strategy resolves the specifier.
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let mut session = context.session().await?;
        let specifier = self.specifier;

        let (session, template) = run_blocking(move || {
            let template = session.resolve(&specifier)?;
            Ok((session, template))
        })
        .await?;

        let location = template
            .source_path()
            .map(|path| display_path(session.table().base_dir(), path))
            .unwrap_or_else(|| "(in memory)".to_string());
        println!("{}  {}", template.key.as_str().green().bold(), location.dimmed());

        if self.content {
            println!();
            print!("{}", template.content);
            if !template.content.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}
