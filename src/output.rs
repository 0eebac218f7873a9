//! File naming, edited-image saving, and format conversion.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::EditError;
use crate::reader::extension_from_mime;

/// Output formats the edited image can be converted to.
pub const FORMATS: &[&str] = &["jpeg", "png", "webp"];

/// Validate the output format parameter.
///
/// # Errors
///
/// Returns an error if the format is not recognized.
pub fn validate_format(format: &str) -> Result<(), String> {
    if FORMATS.contains(&format) {
        Ok(())
    } else {
        Err(format!("Unsupported format '{format}'. Valid: jpeg, png, webp"))
    }
}

/// File extension for the saved image: the requested format if any,
/// otherwise the one matching the returned MIME type. Unknown types get
/// `bin` rather than a misleading image extension.
#[must_use]
pub fn output_extension(mime: &str, format: Option<&str>) -> &'static str {
    match format {
        Some("jpeg") => "jpg",
        Some("png") => "png",
        Some("webp") => "webp",
        _ => extension_from_mime(mime).unwrap_or("bin"),
    }
}

/// Generate an output filename from the source image path.
///
/// Sanitizes the source stem to kebab-case, appends `-edited-` and a unix
/// timestamp, and adds the extension.
#[must_use]
pub fn auto_filename(source: &Path, extension: &str) -> String {
    let stem = source.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let sanitized = sanitize_for_filename(&stem, 50);
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    format!("{sanitized}-edited-{timestamp}.{extension}")
}

/// Sanitize a string for use in a filename.
///
/// Converts to lowercase, replaces non-alphanumeric chars with hyphens,
/// collapses consecutive hyphens, and trims to max length.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut last_was_hyphen = true; // Prevents leading hyphen

    for ch in input.chars().take(max_len * 2) {
        if result.len() >= max_len {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            result.push('-');
            last_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        "image".to_string()
    } else {
        result
    }
}

/// Resolve the output path: use explicit path or auto-generate.
#[must_use]
pub fn resolve_output_path(explicit: Option<&str>, source: &Path, extension: &str) -> PathBuf {
    match explicit {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(auto_filename(source, extension)),
    }
}

/// Save edited image bytes, converting when a different format is requested.
///
/// # Errors
///
/// Returns an error if the file cannot be written or format conversion fails.
pub fn save_image(
    data: &[u8],
    source_mime: &str,
    target_format: Option<&str>,
    output_path: &Path,
) -> Result<(), EditError> {
    match target_format {
        Some(format) if !mime_matches_format(source_mime, format) => {
            convert_and_save(data, format, output_path)
        }
        _ => std::fs::write(output_path, data).map_err(EditError::Io),
    }
}

/// Check if a MIME type matches the requested output format.
fn mime_matches_format(mime: &str, format: &str) -> bool {
    matches!(
        (mime, format),
        ("image/jpeg" | "image/jpg", "jpeg") | ("image/png", "png") | ("image/webp", "webp")
    )
}

/// Convert image bytes to the target format and save.
fn convert_and_save(data: &[u8], target_format: &str, output_path: &Path) -> Result<(), EditError> {
    let img = image::load_from_memory(data)
        .map_err(|e| EditError::ImageConversion(format!("Failed to decode image: {e}")))?;

    let image_format = match target_format {
        "jpeg" => image::ImageFormat::Jpeg,
        "png" => image::ImageFormat::Png,
        "webp" => image::ImageFormat::WebP,
        other => {
            return Err(EditError::ImageConversion(format!("Unsupported format: {other}")));
        }
    };

    // JPEG has no alpha channel.
    let img = if image_format == image::ImageFormat::Jpeg {
        image::DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };

    img.save_with_format(output_path, image_format)
        .map_err(|e| EditError::ImageConversion(format!("Failed to save as {target_format}: {e}")))
}
