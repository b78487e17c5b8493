use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use filebox_core::{AppError, FieldErrors};

/// Upload validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("binData is not valid base64: {0}")]
    InvalidEncoding(String),

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ValidationError::InvalidEncoding(_) | ValidationError::EmptyFile => {
                let mut report = FieldErrors::new();
                report.add("binData", err.to_string());
                AppError::Validation(report)
            }
        }
    }
}

/// Decodes and size-checks uploaded payloads.
pub struct UploadValidator {
    max_file_size: usize,
}

impl UploadValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Decode a standard base64 payload (whitespace ignored) and check its size.
    pub fn decode_payload(&self, encoded: &str) -> Result<Vec<u8>, ValidationError> {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();

        // Reject obviously oversized payloads before allocating the decoded buffer.
        let estimated = compact.len() / 4 * 3;
        if estimated > self.max_file_size + 2 {
            return Err(ValidationError::FileTooLarge {
                size: estimated,
                max: self.max_file_size,
            });
        }

        let decoded = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| ValidationError::InvalidEncoding(e.to_string()))?;

        self.validate_file_size(decoded.len())?;
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_payload() {
        let validator = UploadValidator::new(1024);
        let decoded = validator.decode_payload("aGVsbG8=").unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn test_whitespace_ignored() {
        let validator = UploadValidator::new(1024);
        let decoded = validator.decode_payload("aGVs\nbG8=\n").unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn test_invalid_base64_is_field_error() {
        let validator = UploadValidator::new(1024);
        let err: AppError = validator.decode_payload("***").unwrap_err().into();
        assert!(err.field_errors().unwrap().get("binData").is_some());
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let validator = UploadValidator::new(4);
        let err = validator.decode_payload("aGVsbG8gd29ybGQ=").unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { .. }));
        assert!(matches!(AppError::from(err), AppError::PayloadTooLarge(_)));
    }

    #[test]
    fn test_exact_limit_accepted() {
        let validator = UploadValidator::new(5);
        assert!(validator.decode_payload("aGVsbG8=").is_ok());
    }

    #[test]
    fn test_empty_payload_rejected() {
        let validator = UploadValidator::new(1024);
        assert!(matches!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
    }
}
