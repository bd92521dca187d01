//! Core types and error handling for Twine.
//!
//! - [`error`] - [`TwineError`], [`ErrorContext`] and CLI error presentation
//! - [`template`] - shared template identity types ([`TemplateKey`],
//!   [`TemplateRecord`], [`ResolvedTemplate`])

pub mod error;
pub mod template;

pub use error::{ErrorContext, TwineError, similar_keys, user_friendly_error};
pub use template::{ResolvedTemplate, TemplateKey, TemplateRecord};
