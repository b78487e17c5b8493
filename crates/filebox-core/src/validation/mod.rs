//! Validation modules

pub mod filename;
pub mod options;

pub use filename::{kebab_case, normalize_filename};
pub use options::{validate_optimize_options, KNOWN_OPTION_KEYS, RESERVED_OPTION_KEYS};
