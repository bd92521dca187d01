//! Generic configuration parsing utilities.
//!
//! Reads a TOML file and deserializes it into any `DeserializeOwned` type,
//! attaching the file path to both read and parse failures:
//!
//! ```text
//! Failed to parse config file: /path/to/twine.toml
//! Caused by:
//!     invalid type: integer `3`, expected a directory or a list of directories
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML configuration file into the specified type.
///
/// # Examples
///
/// ```rust,no_run
/// use twine_cli::config::parse_config;
/// use twine_cli::config::TwineConfig;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let config: TwineConfig = parse_config(Path::new("twine.toml"))?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not match `T`.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
