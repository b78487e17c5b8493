//! Filebox processing
//!
//! Content type detection, thumbnail rendering, and upload validation. Everything
//! here is synchronous and CPU-bound; async callers run it on a blocking thread.

pub mod codec;
pub mod detect;
pub mod validator;

pub use codec::{ImageCodec, ImageCrateCodec, ProcessingError};
pub use detect::{detect_type, DetectedType};
pub use validator::{UploadValidator, ValidationError};
