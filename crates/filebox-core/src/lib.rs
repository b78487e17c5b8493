//! Filebox Core Library
//!
//! This crate provides the domain models, error types, configuration, and request
//! validation shared by every Filebox component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{
    AliasConfig, CacheBackend, Config, OptimizerConfig, RecordBackend, ThumbnailConfig,
};
pub use error::{AppError, ErrorMetadata, FieldErrors, LogLevel};
