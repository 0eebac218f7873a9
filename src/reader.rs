//! Reads a local image file into a transport-ready encoded form.

use std::path::{Path, PathBuf};

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::EditError;

/// An image held in memory, base64-encoded for embedding in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    /// Standard base64 of the file bytes.
    pub payload: String,
    /// MIME type of the image (e.g., `"image/png"`).
    pub mime_type: String,
    /// Local path used for display only; never sent over the network.
    #[serde(skip)]
    pub preview: PathBuf,
}

impl EncodedImage {
    /// Encode raw bytes with the given MIME type.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>, preview: PathBuf) -> Self {
        Self {
            payload: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: mime_type.into(),
            preview,
        }
    }

    /// Decode the payload back into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.payload)
    }
}

/// Extensions we recognize without looking at the file contents.
const EXTENSION_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("avif", "image/avif"),
    ("ico", "image/x-icon"),
    ("svg", "image/svg+xml"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
];

/// MIME type declared by the file extension, if the extension is known.
#[must_use]
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSION_TYPES.iter().find(|&&(e, _)| e == ext).map(|&(_, mime)| mime)
}

/// Preferred file extension for an image MIME type, if it is one we know.
#[must_use]
pub fn extension_from_mime(mime: &str) -> Option<&'static str> {
    EXTENSION_TYPES
        .iter()
        .find(|&&(_, m)| m.starts_with("image/") && m.eq_ignore_ascii_case(mime))
        .map(|&(ext, _)| ext)
}

/// Read an image file and encode it for transport.
///
/// The declared type comes from the extension; files with no known
/// extension are identified by their signature.
///
/// # Errors
///
/// Returns `InvalidInputKind` if the file is not an image and
/// `ReadFailure` if it cannot be read or is empty.
pub fn read_image(path: &Path) -> Result<EncodedImage, EditError> {
    let declared = mime_from_extension(path);
    if let Some(mime) = declared {
        ensure_image(mime, path)?;
    }

    let bytes = std::fs::read(path)
        .map_err(|source| EditError::ReadFailure { path: path.to_path_buf(), source })?;
    if bytes.is_empty() {
        return Err(EditError::ReadFailure {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "file is empty"),
        });
    }

    let mime_type = match declared {
        Some(mime) => mime.to_string(),
        None => {
            let sniffed = infer::get(&bytes).map_or("application/octet-stream", |k| k.mime_type());
            ensure_image(sniffed, path)?;
            sniffed.to_string()
        }
    };

    tracing::debug!(path = %path.display(), %mime_type, bytes = bytes.len(), "read source image");
    Ok(EncodedImage::from_bytes(&bytes, mime_type, path.to_path_buf()))
}

fn ensure_image(mime: &str, path: &Path) -> Result<(), EditError> {
    if mime.starts_with("image/") {
        Ok(())
    } else {
        Err(EditError::InvalidInputKind(format!(
            "{} is {mime}, not an image. Please use a valid image file (PNG, JPEG, etc.).",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(mime_from_extension(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(mime_from_extension(Path::new("a.Jpeg")), Some("image/jpeg"));
        assert_eq!(mime_from_extension(Path::new("notes.txt")), Some("text/plain"));
        assert_eq!(mime_from_extension(Path::new("noext")), None);
    }

    #[test]
    fn extension_for_image_types() {
        assert_eq!(extension_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(extension_from_mime("image/tiff"), Some("tif"));
        assert_eq!(extension_from_mime("image/HEIC"), Some("heic"));
        assert_eq!(extension_from_mime("text/plain"), None);
        assert_eq!(extension_from_mime("image/x-unknown"), None);
    }

    #[test]
    fn payload_decodes_to_original_bytes() {
        let dir = scratch_dir("photostudio_reader_roundtrip");
        let path = dir.join("photo.png");
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend((0u8..=255).cycle().take(1000));
        std::fs::write(&path, &bytes).unwrap();

        let encoded = read_image(&path).unwrap();
        assert_eq!(encoded.mime_type, "image/png");
        assert_eq!(encoded.preview, path);
        assert_eq!(encoded.decode().unwrap(), bytes);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn non_image_extension_is_rejected() {
        let dir = scratch_dir("photostudio_reader_text");
        let path = dir.join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let err = read_image(&path).unwrap_err();
        assert!(matches!(err, EditError::InvalidInputKind(_)), "got {err:?}");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn non_image_extension_rejected_before_reading() {
        let err = read_image(Path::new("/nonexistent/report.pdf")).unwrap_err();
        assert!(matches!(err, EditError::InvalidInputKind(_)), "got {err:?}");
    }

    #[test]
    fn unknown_extension_is_sniffed() {
        let dir = scratch_dir("photostudio_reader_sniff");
        let path = dir.join("upload.bin");
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend([0, 0, 0, 13]);
        std::fs::write(&path, &bytes).unwrap();

        let encoded = read_image(&path).unwrap();
        assert_eq!(encoded.mime_type, "image/png");

        let other = dir.join("blob");
        std::fs::write(&other, b"just some text").unwrap();
        assert!(matches!(read_image(&other), Err(EditError::InvalidInputKind(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_read_failure() {
        let err = read_image(Path::new("/nonexistent/photo.jpg")).unwrap_err();
        assert!(matches!(err, EditError::ReadFailure { .. }), "got {err:?}");
    }

    #[test]
    fn empty_file_is_read_failure() {
        let dir = scratch_dir("photostudio_reader_empty");
        let path = dir.join("empty.jpg");
        std::fs::write(&path, b"").unwrap();

        assert!(matches!(read_image(&path), Err(EditError::ReadFailure { .. })));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
