//! Error handling for Twine
//!
//! This module provides the crate-wide error type and user-friendly error
//! reporting for the `twine` CLI. The error system follows two principles:
//! 1. **Strongly-typed errors** for precise handling in library code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`TwineError`] - Enumerated error types for every hard failure in Twine
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//!
//! Soft failures (a strategy that misses, an unreadable file during a scan, an
//! unresolved include during a forward walk) are *not* errors: they are logged
//! and skipped. Only the boundaries that must fail loudly construct a
//! [`TwineError`]: the module-load hook, the component loader and
//! configuration loading.
//!
//! # Examples
//!
//! ```rust,no_run
//! use twine_cli::core::{TwineError, user_friendly_error};
//!
//! let error = TwineError::TemplateNotFound {
//!     specifier: "@widgets/buton.twig".to_string(),
//!     roots: vec!["/project/components".to_string()],
//!     namespaces: vec![("widgets".to_string(), vec!["/project/components".to_string()])],
//!     known_keys: vec!["@widgets/button.twig".to_string()],
//! };
//!
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display(); // Suggests "@widgets/button.twig"
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::constants::{MAX_KEY_SUGGESTIONS, SIMILARITY_THRESHOLD_PERCENT};

/// The main error type for Twine operations.
///
/// # Error Categories
///
/// ## Template lookup
/// - [`TemplateNotFound`] - every resolution strategy missed at the load boundary
/// - [`TemplateMissing`] - the loader has no template under that name
/// - [`ComponentNotFound`] - a `namespace:component` reference matched nothing
///
/// ## Loading and rendering
/// - [`TemplateLoadFailed`] - the engine rejected the template set
/// - [`RenderFailed`] - the engine failed while rendering
/// - [`InvalidContext`] - render context is not a JSON object
///
/// ## Configuration
/// - [`ConfigNotFound`], [`ConfigError`], [`InvalidIncludePattern`],
///   [`InvalidNamespaceFlag`]
///
/// [`TemplateNotFound`]: TwineError::TemplateNotFound
/// [`TemplateMissing`]: TwineError::TemplateMissing
/// [`ComponentNotFound`]: TwineError::ComponentNotFound
/// [`TemplateLoadFailed`]: TwineError::TemplateLoadFailed
/// [`RenderFailed`]: TwineError::RenderFailed
/// [`InvalidContext`]: TwineError::InvalidContext
/// [`ConfigNotFound`]: TwineError::ConfigNotFound
/// [`ConfigError`]: TwineError::ConfigError
/// [`InvalidIncludePattern`]: TwineError::InvalidIncludePattern
/// [`InvalidNamespaceFlag`]: TwineError::InvalidNamespaceFlag
#[derive(Error, Debug)]
pub enum TwineError {
    /// No resolution strategy produced a template for the specifier.
    ///
    /// Raised at the module-load boundary. Carries the full search state
    /// because silent misses are the most common failure users run into.
    #[error("Cannot find template: {specifier}")]
    TemplateNotFound {
        /// The specifier as requested
        specifier: String,
        /// All plain template roots, in registration order
        roots: Vec<String>,
        /// The namespace table: id and its roots, in registration order
        namespaces: Vec<(String, Vec<String>)>,
        /// Every key currently in the source cache
        known_keys: Vec<String>,
    },

    /// Loader lookup for a plain name failed
    #[error("Template \"{name}\" does not exist.")]
    TemplateMissing {
        /// The name passed to the loader
        name: String,
    },

    /// A `namespace:component` reference matched no known template
    #[error("Template \"{component}\" in namespace \"{namespace}\" does not exist.")]
    ComponentNotFound {
        /// Namespace part of the reference
        namespace: String,
        /// Component part of the reference
        component: String,
    },

    /// The template engine could not compile the loader's template set
    #[error("Failed to load template '{name}': {reason}")]
    TemplateLoadFailed {
        /// Template that was being loaded
        name: String,
        /// Engine error message, including its cause chain
        reason: String,
    },

    /// Rendering failed inside the template engine
    #[error("Failed to render template '{name}': {reason}")]
    RenderFailed {
        /// Template that was being rendered
        name: String,
        /// Engine error message, including its cause chain
        reason: String,
    },

    /// Render context was not a JSON object
    #[error("Invalid render context: {reason}")]
    InvalidContext {
        /// Why the context was rejected
        reason: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What went wrong, including the file path and cause chain
        message: String,
    },

    /// The include pattern is not a valid regular expression
    #[error("Invalid include pattern '{pattern}': {reason}")]
    InvalidIncludePattern {
        /// The pattern as configured
        pattern: String,
        /// Regex compiler message
        reason: String,
    },

    /// A `--namespace` flag was not of the form `id=dir`
    #[error("Invalid namespace flag '{value}': expected ID=DIR")]
    InvalidNamespaceFlag {
        /// The flag value as given
        value: String,
    },

    /// Generic error for cases not covered by specific variants
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Error context wrapper that provides user-friendly error information.
///
/// # Display Format
///
/// - **Error**: red and bold
/// - **Details**: yellow
/// - **Suggestion**: green
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying Twine error
    pub error: TwineError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: TwineError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// Recognizes [`TwineError`] variants (with tailored suggestions),
/// [`std::io::Error`] and [`toml::de::Error`]; anything else is wrapped in
/// [`TwineError::Other`] with its cause chain appended.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<ErrorContext>() {
        Ok(context) => return context,
        Err(error) => error,
    };

    let error = match error.downcast::<TwineError>() {
        Ok(twine_error) => return create_error_context(twine_error),
        Err(error) => error,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        let suggestion = match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                "Check file ownership and permissions of the template directories"
            }
            std::io::ErrorKind::NotFound => {
                "Check that the file or directory exists and the path is correct"
            }
            _ => "Check the file system state and try again",
        };
        return ErrorContext::new(TwineError::Other {
            message: format_with_chain(&error),
        })
        .with_suggestion(suggestion);
    }

    if error.downcast_ref::<toml::de::Error>().is_some() {
        return ErrorContext::new(TwineError::Other {
            message: format_with_chain(&error),
        })
        .with_suggestion(
            "Check the TOML syntax in twine.toml. Namespaces map an id to a directory or a list of directories",
        );
    }

    ErrorContext::new(TwineError::Other {
        message: format_with_chain(&error),
    })
}

/// Renders an error with its cause chain appended.
fn format_with_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();

    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

/// Map each [`TwineError`] variant to an [`ErrorContext`] with suggestions.
fn create_error_context(error: TwineError) -> ErrorContext {
    match &error {
        TwineError::TemplateNotFound {
            specifier,
            roots,
            namespaces,
            known_keys,
        } => {
            let details = format_search_state(roots, namespaces, known_keys);
            let similar = similar_keys(specifier, known_keys);
            let suggestion = if similar.is_empty() {
                "Check the specifier spelling and that its directory is registered as a root or namespace in twine.toml"
                    .to_string()
            } else {
                format!("Did you mean: {}?", similar.join(", "))
            };
            ErrorContext::new(error).with_details(details).with_suggestion(suggestion)
        }

        TwineError::ComponentNotFound {
            namespace,
            component,
        } => {
            let suggestion = format!(
                "Create '{component}/{component}.twig' under a root of namespace '{namespace}', or reference it as '@{namespace}/<path>'"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        TwineError::TemplateLoadFailed {
            ..
        }
        | TwineError::RenderFailed {
            ..
        } => ErrorContext::new(error)
            .with_suggestion(
                "Check template syntax: variables use {{ var }}, control flow uses {% %}, and every included template must exist",
            )
            .with_details(
                "Templates are compiled together, so a syntax error in one template fails the whole set",
            ),

        TwineError::ConfigError {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Check the TOML syntax in twine.toml. Namespaces map an id to a directory or a list of directories",
        ),

        TwineError::ConfigNotFound {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Create a twine.toml with a [namespaces] table, or pass --namespace ID=DIR",
        ),

        TwineError::InvalidIncludePattern {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("The include pattern is a regular expression, e.g. '\\.twig(\\?.*)?$'"),

        TwineError::InvalidNamespaceFlag {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use --namespace widgets=components/widgets"),

        _ => ErrorContext::new(error),
    }
}

/// Formats roots, namespaces and known keys for a not-found report.
fn format_search_state(
    roots: &[String],
    namespaces: &[(String, Vec<String>)],
    known_keys: &[String],
) -> String {
    let mut msg = String::new();

    msg.push_str(&format!("Template directories: {}\n", roots.join(", ")));

    let namespace_list = namespaces
        .iter()
        .map(|(id, dirs)| format!("{id} => [{}]", dirs.join(", ")))
        .collect::<Vec<_>>()
        .join("; ");
    msg.push_str(&format!("Namespaces: {namespace_list}\n"));

    msg.push_str(&format!("Available templates: {}", known_keys.join(", ")));
    msg
}

/// Finds known keys close to `target` by Levenshtein distance.
///
/// Returns at most [`MAX_KEY_SUGGESTIONS`] keys, closest first.
#[must_use]
pub fn similar_keys(target: &str, known: &[String]) -> Vec<String> {
    let mut scored: Vec<_> =
        known.iter().map(|key| (key.clone(), strsim::levenshtein(target, key))).collect();

    scored.sort_by(|(a_key, a_dist), (b_key, b_dist)| a_dist.cmp(b_dist).then(a_key.cmp(b_key)));

    scored
        .into_iter()
        .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(MAX_KEY_SUGGESTIONS)
        .map(|(key, _)| key)
        .collect()
}
