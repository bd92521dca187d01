//! Template-side collaborators: reference extraction and loaders.
//!
//! Twine never interprets template semantics itself. It needs two narrow
//! views of a template:
//!
//! - **Structural references** ([`references`]): which other templates a body
//!   names in `extends`, `include`, `embed`, `import` and `from` directives.
//!   This drives the forward walk and the reverse index.
//! - **A loader contract** ([`loader`]): lookups, freshness and a renderable
//!   handle. [`ArrayLoader`] is the default in-memory implementation and
//!   renders with Tera; [`ComponentLoader`] wraps any loader with namespace
//!   resolution and per-render component metadata.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use twine_cli::templating::{ComponentLoader, TemplateLoader};
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut templates = BTreeMap::new();
//! templates.insert("@widgets/button/button.twig".to_string(), "<button>{{ label }}</button>".to_string());
//!
//! let loader = ComponentLoader::from_templates(templates, "twig");
//! let handle = loader.load("widgets:button", None)?;
//! let html = handle.render(&serde_json::json!({ "label": "Save" }))?;
//! # Ok(())
//! # }
//! ```

pub mod component_loader;
pub mod loader;
pub mod references;

pub use component_loader::ComponentLoader;
pub use loader::{ArrayLoader, TemplateHandle, TemplateLoader, TemplateSource};
pub use references::{ReferenceKind, extract_kind, extract_references};
