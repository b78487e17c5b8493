//! Filebox services
//!
//! Business logic on top of the record store, the TTL store, the image codec and
//! the optimization provider. [`FileService`] is the facade the HTTP layer talks to.

pub mod alias;
pub mod file_service;
pub mod optimizer;
pub mod orchestrator;
pub mod thumbnail;

pub use alias::AliasResolver;
pub use file_service::FileService;
pub use optimizer::{ImageOptimizer, OptimizationClient};
pub use orchestrator::OptimizationOrchestrator;
pub use thumbnail::ThumbnailCache;
