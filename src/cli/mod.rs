//! Command-line interface for Twine.
//!
//! The `twine` binary exposes every resolution operation for inspection, so a
//! namespace setup can be checked without running a bundler:
//!
//! - `resolve` - resolve one specifier to its canonical key
//! - `deps` - forward walk: sidecar scripts (and optionally the reference tree)
//! - `refs` - reverse index: templates that reference a target
//! - `list` - keys in the template cache
//! - `module` - the JavaScript module generated for a template import
//! - `render` - render a template through the component loader
//!
//! # Configuration
//!
//! Every command builds its configuration the same way: an explicit
//! `--config` file, else the nearest `twine.toml` found from `--base-dir` (or
//! the current directory) upwards, else an empty configuration rooted at
//! `--base-dir`. `--namespace ID=DIR` flags are appended to whatever was
//! loaded, in command-line order. They go before the subcommand, because the
//! order of a namespace's directories decides which file wins.
//!
//! ```bash
//! twine --namespace widgets=components resolve widgets:button
//! twine deps @widgets/card/card.twig --tree
//! twine --verbose refs components/icon/icon.twig
//! ```

pub mod common;
pub mod deps;
pub mod list;
pub mod module;
pub mod refs;
pub mod render;
pub mod resolve;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub use common::CommandContext;

/// Settings derived from the global flags, separate from the parsed [`Cli`]
/// so tests can build them directly.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Default log filter; `None` disables logging unless `RUST_LOG` is set
    pub log_level: Option<String>,
    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
    /// Project root override
    pub base_dir: Option<PathBuf>,
    /// Raw `ID=DIR` namespace flags, in command-line order
    pub namespaces: Vec<String>,
}

impl CliConfig {
    /// Create a new CLI configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the global tracing subscriber.
    ///
    /// `RUST_LOG` wins over the level chosen by `--verbose`/`--quiet`. Log
    /// lines go to stderr so command output on stdout stays clean. Calling
    /// this twice is harmless.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if let Some(level) = &self.log_level {
            EnvFilter::new(format!("twine_cli={level}"))
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Namespace-aware Twig template resolution and dependency tracking.
#[derive(Parser)]
#[command(
    name = "twine",
    about = "Twine - resolve Twig templates across namespaces and track their dependencies",
    version,
    author,
    long_about = "Twine resolves Twig template specifiers (plain paths, @namespace/paths, \
                  namespace:component shorthand and absolute paths) against configured \
                  template roots, and answers the forward and reverse dependency questions \
                  a bundler needs for hot module replacement."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable all logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a twine.toml (default: nearest one from the base directory up)
    #[arg(short, long, global = true, env = "TWINE_CONFIG")]
    config: Option<PathBuf>,

    /// Project root that relative directories resolve against
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// Register a namespace directory, e.g. `--namespace widgets=components`
    #[arg(short = 'n', long = "namespace", value_name = "ID=DIR")]
    namespaces: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a template specifier to its canonical key
    Resolve(resolve::ResolveCommand),

    /// Show the sidecar scripts (and reference tree) reachable from templates
    Deps(deps::DepsCommand),

    /// Show the templates that directly reference a target
    Refs(refs::RefsCommand),

    /// List every template key in the cache
    List(list::ListCommand),

    /// Print the JavaScript module generated for a template import
    Module(module::ModuleCommand),

    /// Render a template through the component loader
    Render(render::RenderCommand),
}

impl Cli {
    /// Execute the CLI with a configuration built from the parsed flags.
    ///
    /// # Errors
    ///
    /// Returns any configuration, resolution or rendering failure.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translates the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
            base_dir: self.base_dir.clone(),
            namespaces: self.namespaces.clone(),
        }
    }

    /// Execute the CLI with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns any configuration, resolution or rendering failure.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let context = CommandContext::from_cli_config(&config)?;

        match self.command {
            Commands::Resolve(cmd) => cmd.execute(context).await,
            Commands::Deps(cmd) => cmd.execute(context).await,
            Commands::Refs(cmd) => cmd.execute(context).await,
            Commands::List(cmd) => cmd.execute(context).await,
            Commands::Module(cmd) => cmd.execute(context).await,
            Commands::Render(cmd) => cmd.execute(context).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_levels() {
        let cli = Cli::parse_from(["twine", "--verbose", "list"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("debug"));

        let cli = Cli::parse_from(["twine", "--quiet", "list"]);
        assert_eq!(cli.build_config().log_level, None);

        let cli = Cli::parse_from(["twine", "list"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_namespace_flags_keep_order() {
        let cli = Cli::parse_from([
            "twine",
            "-n",
            "widgets=a",
            "--namespace",
            "widgets=b",
            "-n",
            "layout=c",
            "list",
        ]);
        let config = cli.build_config();
        assert_eq!(
            config.namespaces,
            vec!["widgets=a".to_string(), "widgets=b".to_string(), "layout=c".to_string()]
        );
    }

    #[test]
    fn test_namespace_flag_rejected_after_subcommand() {
        assert!(Cli::try_parse_from(["twine", "list", "--namespace", "widgets=b"]).is_err());
        assert!(Cli::try_parse_from(["twine", "-n", "widgets=a", "list", "-n", "widgets=b"]).is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["twine", "-v", "-q", "list"]).is_err());
    }
}
