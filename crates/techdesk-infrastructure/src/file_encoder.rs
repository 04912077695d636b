//! Turns manuals on disk into transport-safe payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use std::path::Path;
use tokio::fs;

use techdesk_core::error::{Result, TechdeskError};
use techdesk_core::file::{UploadedFile, is_supported_mime_type};

/// Infers the MIME type from a filename extension using the `mime_guess` library.
fn infer_mime_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string()
}

/// Reads a manual from disk and encodes it.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read and `UnsupportedFileType` for
/// anything other than PDF, PNG, JPEG, or WEBP.
pub async fn encode_file(path: &Path) -> Result<UploadedFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| TechdeskError::io(format!("Invalid file path: {}", path.display())))?;
    let mime_type = infer_mime_type(&name);
    if !is_supported_mime_type(&mime_type) {
        return Err(TechdeskError::UnsupportedFileType { name, mime_type });
    }

    let bytes = fs::read(path).await.map_err(|e| {
        TechdeskError::io(format!("Failed to read {}: {}", path.display(), e))
    })?;
    tracing::info!(file = %name, mime = %mime_type, size = bytes.len(), "Encoded manual");

    Ok(encode_bytes(name, mime_type, &bytes))
}

/// Encodes raw bytes as standard base64 without any `data:` header.
pub fn encode_bytes(
    name: impl Into<String>,
    mime_type: impl Into<String>,
    bytes: &[u8],
) -> UploadedFile {
    UploadedFile::new(name, mime_type, BASE64_STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_encode_file_round_trips_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pump-manual.pdf");
        let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        std::fs::write(&path, &bytes).unwrap();

        let file = encode_file(&path).await.expect("Should encode manual");

        assert_eq!(file.name, "pump-manual.pdf");
        assert_eq!(file.mime_type, "application/pdf");
        assert!(!file.data.contains("data:"));
        assert!(!file.data.contains(";base64,"));
        assert_eq!(BASE64_STANDARD.decode(&file.data).unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_encode_file_detects_image_types() {
        let temp_dir = TempDir::new().unwrap();
        for (name, mime) in [
            ("panel.png", "image/png"),
            ("label.jpg", "image/jpeg"),
            ("wiring.webp", "image/webp"),
        ] {
            let path = temp_dir.path().join(name);
            std::fs::write(&path, b"img").unwrap();
            let file = encode_file(&path).await.unwrap();
            assert_eq!(file.mime_type, mime);
        }
    }

    #[tokio::test]
    async fn test_encode_file_rejects_unsupported_type() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = encode_file(&path).await.unwrap_err();
        assert!(matches!(err, TechdeskError::UnsupportedFileType { .. }));
    }

    #[tokio::test]
    async fn test_encode_file_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = encode_file(&temp_dir.path().join("missing.pdf"))
            .await
            .unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_encode_empty_bytes() {
        let file = encode_bytes("empty.png", "image/png", &[]);
        assert!(file.data.is_empty());
    }
}
