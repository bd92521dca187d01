//! Common utilities for CLI commands

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::TwineConfig;
use crate::plugin::TwigPlugin;
use crate::utils::platform::absolutize;

use super::CliConfig;

/// Configuration shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Effective configuration, namespace flags included
    pub config: TwineConfig,
    /// The `twine.toml` the configuration came from, if any
    pub config_path: Option<PathBuf>,
}

impl CommandContext {
    /// Builds the effective configuration from the global flags.
    ///
    /// # Errors
    ///
    /// Fails if an explicit `--config` file is missing or invalid, a
    /// discovered `twine.toml` is invalid, or a `--namespace` flag is
    /// malformed.
    pub fn from_cli_config(cli: &CliConfig) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        let base_dir = cli.base_dir.as_deref().map(|dir| absolutize(&cwd, dir));

        let config_path = match &cli.config_path {
            Some(path) => Some(absolutize(&cwd, path)),
            None => TwineConfig::discover(base_dir.as_deref().unwrap_or(&cwd)),
        };

        let mut config = match &config_path {
            Some(path) => TwineConfig::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => {
                debug!("No twine.toml found, using command-line configuration only");
                TwineConfig::new(base_dir.clone().unwrap_or_else(|| cwd.clone()))
            }
        };

        if let Some(dir) = base_dir {
            config.base_dir = dir;
        }
        config.base_dir = absolutize(&cwd, &config.base_dir);

        for flag in &cli.namespaces {
            config.add_namespace_flag(flag)?;
        }

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Project root all relative directories resolve against.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.config.base_dir
    }

    /// Starts a plugin session (scans every root) on the blocking pool.
    ///
    /// # Errors
    ///
    /// Fails if the include pattern is invalid.
    pub async fn session(&self) -> Result<TwigPlugin> {
        let config = self.config.clone();
        run_blocking(move || Ok(TwigPlugin::new(&config)?)).await
    }
}

/// Runs blocking resolver work off the async runtime.
///
/// # Errors
///
/// Returns the closure's error, or a join error if the task panicked.
pub async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.context("Blocking task failed")?
}

/// Path relative to `base` for display, or the path itself when outside.
#[must_use]
pub fn display_path(base: &Path, path: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).display().to_string()
}

/// Prints a dimmed `(none)` marker for empty result lists.
pub fn print_none() {
    println!("{}", "(none)".dimmed());
}
