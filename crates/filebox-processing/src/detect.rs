//! Content sniffing from magic bytes.

use image::ImageFormat;

/// Type information derived from file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedType {
    pub mime_type: String,
    pub extension: String,
}

impl DetectedType {
    fn new(mime_type: &str, extension: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            extension: extension.to_string(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Signatures for common non-image payloads: (offset, magic, mime, extension).
const SIGNATURES: &[(usize, &[u8], &str, &str)] = &[
    (0, b"%PDF-", "application/pdf", "pdf"),
    (0, b"PK\x03\x04", "application/zip", "zip"),
    (0, b"\x1f\x8b", "application/gzip", "gz"),
    (0, b"7z\xbc\xaf\x27\x1c", "application/x-7z-compressed", "7z"),
    (0, b"ID3", "audio/mpeg", "mp3"),
    (0, b"OggS", "audio/ogg", "ogg"),
    (0, b"fLaC", "audio/x-flac", "flac"),
    (4, b"ftypqt", "video/quicktime", "mov"),
    (4, b"ftyp", "video/mp4", "mp4"),
    (0, b"\x1a\x45\xdf\xa3", "video/webm", "webm"),
];

/// Detect the content type of `data`, or `None` when it matches no known signature.
pub fn detect_type(data: &[u8]) -> Option<DetectedType> {
    if let Ok(format) = image::guess_format(data) {
        return Some(from_image_format(format));
    }

    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WAVE" {
        return Some(DetectedType::new("audio/wav", "wav"));
    }

    SIGNATURES
        .iter()
        .find(|(offset, magic, _, _)| {
            data.len() >= offset + magic.len() && &data[*offset..offset + magic.len()] == *magic
        })
        .map(|(_, _, mime, ext)| DetectedType::new(mime, ext))
}

fn from_image_format(format: ImageFormat) -> DetectedType {
    let extension = format
        .extensions_str()
        .first()
        .copied()
        .unwrap_or("img");
    DetectedType::new(format.to_mime_type(), extension)
}
