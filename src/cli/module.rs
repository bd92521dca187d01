//! Print the JavaScript module the bundler hook generates for an import id.

use anyhow::{Result, bail};
use clap::Args;

use super::common::{CommandContext, run_blocking};

/// Print the generated module for a template import.
#[derive(Args)]
pub struct ModuleCommand {
    /// Import id, optionally with a query string (`card.twig?inline`)
    id: String,
}

impl ModuleCommand {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Fails when the id does not match the include pattern or does not
    /// resolve.
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let mut session = context.session().await?;
        let id = self.id.clone();

        let source = run_blocking(move || Ok(session.load(&id)?)).await?;
        let Some(source) = source else {
            bail!(
                "'{}' does not match the include pattern '{}'",
                self.id,
                context.config.include
            );
        };

        print!("{source}");
        Ok(())
    }
}
