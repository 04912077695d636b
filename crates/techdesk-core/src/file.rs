//! Uploaded manual files.

use serde::{Deserialize, Serialize};

/// MIME types accepted as manuals.
pub const SUPPORTED_MIME_TYPES: [&str; 4] =
    ["application/pdf", "image/png", "image/jpeg", "image/webp"];

/// A manual selected by the user, encoded for transmission.
///
/// `data` holds standard base64 of the raw bytes without any
/// `data:<mime>;base64,` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Original filename
    pub name: String,
    /// Declared MIME type of the file
    pub mime_type: String,
    /// Base64-encoded file content
    pub data: String,
}

impl UploadedFile {
    /// Builds a file; a `data:<mime>;base64,` header on `data` is dropped.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        let mut data = data.into();
        let header_len = data.len() - strip_transport_prefix(&data).len();
        data.replace_range(..header_len, "");
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// Removes a leading `data:<mime>;base64,` header, if present.
pub fn strip_transport_prefix(encoded: &str) -> &str {
    if encoded.starts_with("data:") {
        if let Some((_, payload)) = encoded.split_once(',') {
            return payload;
        }
    }
    encoded
}

/// Returns true if the MIME type can be uploaded as a manual.
pub fn is_supported_mime_type(mime_type: &str) -> bool {
    SUPPORTED_MIME_TYPES
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(mime_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_transport_prefix() {
        assert_eq!(
            strip_transport_prefix("data:application/pdf;base64,JVBERi0="),
            "JVBERi0="
        );
        assert_eq!(strip_transport_prefix("JVBERi0="), "JVBERi0=");
        assert_eq!(strip_transport_prefix(""), "");
    }

    #[test]
    fn test_new_drops_data_url_header() {
        let file = UploadedFile::new("wiring.png", "image/png", "data:image/png;base64,iVBORw0=");
        assert_eq!(file.data, "iVBORw0=");
    }

    #[test]
    fn test_supported_mime_types() {
        assert!(is_supported_mime_type("application/pdf"));
        assert!(is_supported_mime_type("IMAGE/PNG"));
        assert!(is_supported_mime_type("image/webp"));
        assert!(!is_supported_mime_type("image/gif"));
        assert!(!is_supported_mime_type("text/plain"));
    }
}
