//! List the template cache.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use super::common::{CommandContext, display_path};

/// List every template key in the cache.
#[derive(Args)]
pub struct ListCommand {
    /// Only list keys of this namespace
    namespace: Option<String>,

    /// Show the file each key was read from
    #[arg(short, long)]
    long: bool,
}

impl ListCommand {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Fails when the requested namespace is not registered.
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let session = context.session().await?;

        if let Some(namespace) = &self.namespace
            && !session.table().has_namespace(namespace)
        {
            bail!("Namespace '{namespace}' is not registered");
        }

        let records: Vec<_> = session
            .cache()
            .records()
            .into_iter()
            .filter(|record| {
                self.namespace.as_deref().is_none_or(|ns| record.key.namespace() == Some(ns))
            })
            .collect();

        for record in &records {
            if self.long {
                let location = record
                    .source_path
                    .as_deref()
                    .map(|path| display_path(context.base_dir(), path))
                    .unwrap_or_default();
                println!("{}  {}", record.key.as_str().green(), location.dimmed());
            } else {
                println!("{}", record.key);
            }
        }

        println!("{}", format!("{} template(s)", records.len()).dimmed());
        Ok(())
    }
}
