//! Twine - namespace-aware Twig template resolution for bundler pipelines
//!
//! Twine sits between a JavaScript bundler and a tree of Twig templates. It
//! turns template specifiers into canonical template keys, keeps an in-memory
//! cache of template sources, and answers the two dependency questions a
//! bundler needs for hot module replacement:
//!
//! - **Forward**: which component scripts does a template pull in through its
//!   `extends`/`include`/`embed`/`import`/`from` references?
//! - **Reverse**: which templates reference a given template, so their modules
//!   must be invalidated when it changes?
//!
//! # Specifiers
//!
//! | Form | Example | Meaning |
//! |------|---------|---------|
//! | plain path | `layout.twig` | relative to the plain roots (then every namespace root) |
//! | namespaced | `@widgets/card/card.twig` | relative to the roots of namespace `widgets` |
//! | shorthand | `widgets:card` | `@widgets/card/card.twig`, else any `card.twig` under the namespace |
//! | absolute | `/project/components/card/card.twig` | read directly |
//!
//! Missing extensions are probed as `name`, `name.twig`, `name.html.twig`.
//!
//! # Modules
//!
//! - [`config`] - `twine.toml` and command-line configuration
//! - [`namespace`] - the namespace table and canonical keys
//! - [`cache`] - the template source cache
//! - [`resolver`] - specifier resolution, forward walk and reverse index
//! - [`templating`] - reference extraction and the loader contract
//! - [`plugin`] - the bundler hooks (`resolve_id`, `load`, `handle_change`)
//! - [`cli`] - the `twine` command-line interface
//! - [`core`] - errors and shared template types
//! - [`utils`] - filesystem and path helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use twine_cli::config::TwineConfig;
//! use twine_cli::plugin::{ModuleEntry, TwigPlugin};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut config = TwineConfig::new("/project");
//! config.add_namespace_flag("widgets=components")?;
//!
//! let mut plugin = TwigPlugin::new(&config)?;
//! let module = plugin.load("@widgets/card/card.twig")?;
//!
//! let affected = plugin.handle_change(
//!     Path::new("/project/components/icon/icon.twig"),
//!     &[ModuleEntry::new("@widgets/card/card.twig", "/project/components/card/card.twig")],
//! );
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod namespace;
pub mod plugin;
pub mod resolver;
pub mod templating;
pub mod utils;

// test_utils is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
