//! Forward dependency walk from one or more templates.
//!
//! Lists the sidecar scripts a template pulls in through its references. With
//! `--tree` the reference graph is printed too, one tree per start specifier:
//!
//! ```text
//! @widgets/card/card.twig
//! ├── @widgets/icon/icon.twig
//! └── layout.twig
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{CommandContext, display_path, print_none, run_blocking};

/// Show the sidecar scripts reachable from templates.
#[derive(Args)]
pub struct DepsCommand {
    /// Start specifiers
    #[arg(required = true)]
    specifiers: Vec<String>,

    /// Print the reference tree of every start specifier
    #[arg(long)]
    tree: bool,
}

impl DepsCommand {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Fails only when the session cannot be created; unresolved references
    /// are reported, not fatal.
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let mut session = context.session().await?;
        let specifiers = self.specifiers.clone();

        let walk = run_blocking(move || Ok(session.walk(&specifiers))).await?;

        if self.tree {
            for specifier in &self.specifiers {
                println!("{}", walk.graph.to_tree_string(specifier));
            }
            if let Some(cycle) = walk.graph.find_cycle() {
                println!("{} {}", "Reference cycle:".yellow(), cycle.join(" → "));
            }
            println!();
        }

        println!("{}", "Component scripts:".bold());
        if walk.scripts.is_empty() {
            print_none();
        }
        for script in &walk.scripts {
            println!("  {}", display_path(context.base_dir(), script));
        }

        if !walk.unresolved.is_empty() {
            println!();
            println!("{}", "Unresolved references:".yellow().bold());
            for specifier in &walk.unresolved {
                println!("  {}", specifier.yellow());
            }
        }

        Ok(())
    }
}
