//! Render a template through the component loader.
//!
//! Every cached template, plus its plain-relative alias, is handed to a
//! [`ComponentLoader`], so includes across namespaces work exactly as they do
//! in the generated modules, and namespaced templates receive the `_sdc`
//! metadata object.

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use crate::templating::{ComponentLoader, TemplateLoader};

use super::common::{CommandContext, run_blocking};

/// Render a template through the component loader.
#[derive(Args)]
pub struct RenderCommand {
    /// Template specifier or loader name
    name: String,

    /// Render context as a JSON object
    #[arg(long, default_value = "{}")]
    context: String,
}

impl RenderCommand {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Fails on invalid context JSON, an unknown template or a render error.
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let render_context: serde_json::Value =
            serde_json::from_str(&self.context).context("--context is not valid JSON")?;

        let mut session = context.session().await?;
        let template_extension = context.config.template_extension.clone();
        let name = self.name;

        let output = run_blocking(move || {
            // Known specifiers render under their canonical key; anything else
            // goes to the loader untouched.
            let loader_name = match session.resolve(&name) {
                Ok(template) => template.key.as_str().to_string(),
                Err(err) => {
                    debug!("{err}");
                    name
                }
            };

            let templates = session.cache().template_map(session.table());
            let loader = ComponentLoader::from_templates(templates, &template_extension);
            let handle = loader.load(&loader_name, None)?;
            Ok(handle.render(&render_context)?)
        })
        .await?;

        print!("{output}");
        Ok(())
    }
}
