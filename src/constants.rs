//! Global constants used throughout the Twine codebase.
//!
//! File extensions, naming conventions and defaults that several modules
//! need to agree on. Defining them centrally keeps the resolver, the
//! extractor and the plugin consistent with each other.

/// Default template file extension (without the leading dot).
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "twig";

/// Default sidecar script extension (without the leading dot).
///
/// A component `<dir>/<name>.twig` may ship a script at `<dir>/<name>.js`.
pub const DEFAULT_SCRIPT_EXTENSION: &str = "js";

/// Kind prefix used for the compound extension probe (`name.html.twig`).
pub const COMPOUND_KIND: &str = "html";

/// Default include pattern for the bundler hooks: bare and query imports.
pub const DEFAULT_INCLUDE_PATTERN: &str = r"\.twig(\?.*)?$";

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "twine.toml";

/// Context key under which component metadata is injected at render time.
pub const COMPONENT_META_KEY: &str = "_sdc";

/// Maximum number of "did you mean" suggestions shown for a missing template.
pub const MAX_KEY_SUGGESTIONS: usize = 3;

/// Maximum allowed edit distance, as a percentage of the specifier length,
/// for a known key to be offered as a suggestion.
pub const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Module the generated template modules import the template engine from.
pub const ENGINE_MODULE: &str = "twing";

/// Default module generated template modules import the runtime loader from.
///
/// Nothing in this crate provides it: the host project maps this name to its
/// own loader factory (for example with a bundler alias), or sets
/// `runtime_loader` in `twine.toml` to a path of its choosing.
pub const RUNTIME_LOADER_MODULE: &str = "twine/runtime/component-loader";
