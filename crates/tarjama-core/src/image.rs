//! Image intake and encoding.
//!
//! Uploaded screenshots are validated once on intake and then treated as
//! immutable. Provider requests always embed them as an `image/jpeg` data
//! URI, whatever the real subtype is; both providers accept PNG bytes under
//! that label.

use crate::config::LimitsConfig;
use crate::error::ImageError;
use base64::Engine;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// MIME type used in every provider request.
pub const REQUEST_MEDIA_TYPE: &str = "image/jpeg";

/// Encode bytes as standard padded base64.
pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Build the data URI sent to providers.
pub fn data_uri(bytes: &[u8]) -> String {
    format!("data:{REQUEST_MEDIA_TYPE};base64,{}", encode_base64(bytes))
}

/// One uploaded screenshot.
///
/// Cloning is cheap: the payload is shared.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedImage {
    /// Original file name
    pub name: String,
    /// Content type as detected from the payload ("image/jpeg" or "image/png")
    pub content_type: String,
    #[serde(skip)]
    bytes: Arc<[u8]>,
}

impl UploadedImage {
    /// Accept an uploaded payload after validating it against `limits`.
    ///
    /// The declared content type from the browser is not trusted; the type is
    /// taken from the payload's magic bytes.
    pub fn from_upload(
        name: impl Into<String>,
        bytes: Vec<u8>,
        limits: &LimitsConfig,
    ) -> Result<Self, ImageError> {
        let name = name.into();
        if bytes.is_empty() {
            return Err(ImageError::Empty { name });
        }

        let max_bytes = limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if bytes.len() as u64 > max_bytes {
            return Err(ImageError::TooLarge {
                name,
                size_mb: bytes.len() as u64 / (1024 * 1024),
                max_mb: limits.max_file_size_mb,
            });
        }

        let content_type = match sniff_content_type(&bytes) {
            Some(ct) => ct.to_string(),
            None => return Err(ImageError::UnsupportedFormat { name }),
        };

        Ok(Self {
            name,
            content_type,
            bytes: Arc::from(bytes),
        })
    }

    /// Read and validate an image from disk.
    pub fn from_path(path: &Path, limits: &LimitsConfig) -> Result<Self, ImageError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let bytes = std::fs::read(path).map_err(|source| ImageError::Read {
            name: name.clone(),
            source,
        })?;
        Self::from_upload(name, bytes, limits)
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the payload in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Data URI for provider requests (always `image/jpeg`).
    pub fn data_uri(&self) -> String {
        data_uri(&self.bytes)
    }

    /// Data URI with the real content type, for displaying the image.
    pub fn display_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            encode_base64(&self.bytes)
        )
    }
}

/// Detect JPEG or PNG from the leading bytes.
pub fn sniff_content_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() >= 3 && bytes[..3] == [0xFF, 0xD8, 0xFF] {
        Some("image/jpeg")
    } else if bytes.len() >= 8 && bytes[..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A] {
        Some("image/png")
    } else {
        None
    }
}

/// Find supported images at a path.
///
/// A file is returned if its extension is supported. A directory is walked
/// recursively and the result is sorted by path, so batch order is stable.
pub fn discover(path: &Path, supported_formats: &[String]) -> Vec<PathBuf> {
    if path.is_file() {
        if is_supported(path, supported_formats) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && is_supported(e.path(), supported_formats))
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    files
}

fn is_supported(path: &Path, supported_formats: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            supported_formats
                .iter()
                .any(|fmt| fmt.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_data_uri_prefix_is_always_jpeg() {
        let png = UploadedImage::from_upload("a.png", png_bytes(), &LimitsConfig::default())
            .unwrap();
        assert_eq!(png.content_type, "image/png");
        assert!(png.data_uri().starts_with("data:image/jpeg;base64,"));
        assert!(png.display_uri().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let bytes = jpeg_bytes(7);
        assert_eq!(encode_base64(&bytes), encode_base64(&bytes));
        assert_eq!(data_uri(&bytes), data_uri(&bytes));
    }

    #[test]
    fn test_encode_known_value() {
        assert_eq!(encode_base64(b"chat"), "Y2hhdA==");
        assert_eq!(data_uri(b"chat"), "data:image/jpeg;base64,Y2hhdA==");
    }

    #[test]
    fn test_rejects_empty_upload() {
        let err = UploadedImage::from_upload("e.jpg", vec![], &LimitsConfig::default())
            .unwrap_err();
        assert!(matches!(err, ImageError::Empty { .. }));
    }

    #[test]
    fn test_rejects_oversized_upload() {
        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        };
        let mut bytes = jpeg_bytes(0);
        bytes.resize(2 * 1024 * 1024, 0);
        let err = UploadedImage::from_upload("big.jpg", bytes, &limits).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_huge_size_limit_does_not_overflow() {
        let limits = LimitsConfig {
            max_file_size_mb: u64::MAX,
            ..LimitsConfig::default()
        };
        let image = UploadedImage::from_upload("a.jpg", jpeg_bytes(1), &limits).unwrap();
        assert_eq!(image.content_type, "image/jpeg");
    }

    #[test]
    fn test_rejects_non_image_payload() {
        let err = UploadedImage::from_upload("notes.jpg", b"hello".to_vec(), &LimitsConfig::default())
            .unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.jpg");
        std::fs::write(&path, jpeg_bytes(3)).unwrap();

        let image = UploadedImage::from_path(&path, &LimitsConfig::default()).unwrap();
        assert_eq!(image.name, "shot.jpg");
        assert_eq!(image.bytes(), jpeg_bytes(3).as_slice());
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = UploadedImage::from_path(Path::new("/nonexistent/x.jpg"), &LimitsConfig::default())
            .unwrap_err();
        assert!(matches!(err, ImageError::Read { .. }));
    }

    #[test]
    fn test_discover_sorts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.PNG"), png_bytes()).unwrap();
        std::fs::write(dir.path().join("a.jpg"), jpeg_bytes(1)).unwrap();
        std::fs::write(dir.path().join("nested/c.jpeg"), jpeg_bytes(2)).unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"x").unwrap();

        let formats = LimitsConfig::default().supported_formats;
        let found = discover(dir.path(), &formats);
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.jpg"),
                PathBuf::from("b.PNG"),
                PathBuf::from("nested/c.jpeg"),
            ]
        );
    }

    #[test]
    fn test_discover_single_unsupported_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        assert!(discover(&path, &LimitsConfig::default().supported_formats).is_empty());
    }
}
