//! Data models for the application
//!
//! Records as stored, the views returned to callers, thumbnail buckets, the
//! optimization provider wire types, and request DTOs.

mod file;
mod optimization;
mod requests;
mod thumbnail;

pub use file::*;
pub use optimization::*;
pub use requests::*;
pub use thumbnail::*;
