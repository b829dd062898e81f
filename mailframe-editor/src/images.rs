//! Image loading for the webview.
//!
//! The webview cannot read the workspace directly, so it asks the host
//! for images by path and gets them back as data URLs.

use std::fs;
use std::path::{Path, PathBuf};

use mailframe_mjml::to_data_url;

use crate::error::{EditorError, EditorResult};

/// Resolves an image reference from the markup. Absolute paths pass
/// through, relative ones resolve against the document's directory.
pub fn resolve_image_path(document_dir: &Path, raw: &str) -> PathBuf {
    let candidate = Path::new(raw);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        document_dir.join(candidate)
    }
}

/// Reads an image file and encodes it as a base64 data URL.
pub fn read_image_as_data_url(path: &Path) -> EditorResult<String> {
    let bytes = fs::read(path).map_err(|source| EditorError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(EditorError::EmptyImage {
            path: path.to_path_buf(),
        });
    }
    Ok(to_data_url(&bytes, mime_for_path(path))?)
}

/// MIME type from the file extension. Unknown extensions fall back to
/// PNG, which browsers sniff past anyway.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        "tif" | "tiff" => "image/tiff",
        _ => "image/png",
    }
}
