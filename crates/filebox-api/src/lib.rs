//! Filebox API Library
//!
//! HTTP handlers, error rendering, and application setup over
//! [`filebox_services::FileService`].

mod api_doc;
mod handlers;

pub mod error;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::ErrorResponse;
