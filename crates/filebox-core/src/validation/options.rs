//! Provider option checks.
//!
//! Only keys with a known meaning are type-checked. Unknown keys pass through to the
//! provider unchecked; the multipart field names `type` and `file` are reserved.

use serde_json::Value;

use crate::models::OptimizeOptions;
use crate::{AppError, FieldErrors};

pub const KNOWN_OPTION_KEYS: &[&str] = &[
    "compression",
    "keep_exif",
    "max_width",
    "max_height",
    "cmyktorgb",
    "webp",
];

pub const RESERVED_OPTION_KEYS: &[&str] = &["type", "file"];

const COMPRESSION_LEVELS: &[&str] = &["ultra", "intelligent", "lossless"];

pub fn validate_optimize_options(options: &OptimizeOptions) -> Result<(), AppError> {
    let mut report = FieldErrors::new();

    for (key, value) in &options.0 {
        if RESERVED_OPTION_KEYS.contains(&key.as_str()) {
            report.add(format!("options.{}", key), format!("'{}' is reserved", key));
            continue;
        }
        if !KNOWN_OPTION_KEYS.contains(&key.as_str()) {
            continue;
        }

        match key.as_str() {
            "compression" => {
                let ok = value
                    .as_str()
                    .is_some_and(|v| COMPRESSION_LEVELS.contains(&v));
                if !ok {
                    report.add(
                        "options.compression",
                        "compression must be one of ultra, intelligent, lossless",
                    );
                }
            }
            "keep_exif" | "cmyktorgb" | "webp" => {
                if !is_flag(value) {
                    report.add(
                        format!("options.{}", key),
                        format!("{} must be a boolean or 0/1", key),
                    );
                }
            }
            "max_width" | "max_height" => {
                if !value.as_u64().is_some_and(|v| v > 0) {
                    report.add(
                        format!("options.{}", key),
                        format!("{} must be a positive integer", key),
                    );
                }
            }
            _ => {}
        }
    }

    report.into_result()
}

fn is_flag(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Number(n) => matches!(n.as_u64(), Some(0) | Some(1)),
        Value::String(s) => matches!(s.as_str(), "0" | "1"),
        _ => false,
    }
}
