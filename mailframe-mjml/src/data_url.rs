//! Data-URL encoding for inlining assets into the webview.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{MjmlError, MjmlResult};

/// Encodes raw bytes as a `data:{mime};base64,...` URL.
///
/// Zero-length input is rejected.
pub fn to_data_url(bytes: &[u8], mime: &str) -> MjmlResult<String> {
    if bytes.is_empty() {
        return Err(MjmlError::EmptyInput);
    }
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}
