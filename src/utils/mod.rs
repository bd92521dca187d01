//! Cross-platform utilities shared across Twine.
//!
//! - [`platform`] - lexical path normalization and key-form conversion
//! - [`fs`] - template directory walking and tolerant file reads

pub mod fs;
pub mod platform;

pub use fs::{collect_files_with_extension, read_template};
pub use platform::{absolutize, normalize_path, normalize_path_for_storage};
