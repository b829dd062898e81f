//! Seams to the embedding editor.
//!
//! The session and lifecycle logic never talk to a concrete editor
//! API. They see documents as plain data and reach the outside world
//! through [`EditorHost`] and [`WebviewPanel`], so the whole crate
//! runs unchanged under the test fakes.

use std::path::{Path, PathBuf};

use mailframe_mjml::FormatOptions;

use crate::protocol::Message;

/// Where a document's bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentScheme {
    /// Backed by a file on disk.
    File,
    /// Open buffer that was never saved.
    Untitled,
    /// Anything else (remote, virtual, diff views).
    Other,
}

/// Snapshot of an open text document.
#[derive(Debug, Clone)]
pub struct HostDocument {
    pub path: PathBuf,
    pub scheme: DocumentScheme,
    pub language_id: String,
    pub text: String,
}

impl HostDocument {
    /// Whether the visual editor should handle this document.
    pub fn is_mjml(&self) -> bool {
        self.language_id == "mjml"
            && matches!(self.scheme, DocumentScheme::File | DocumentScheme::Untitled)
    }

    /// Directory that relative image references resolve against.
    pub fn parent_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// File name for panel titles.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// One webview surface. Dropping the handle destroys the surface.
pub trait WebviewPanel {
    /// Replaces the panel's document with the given HTML.
    fn set_html(&mut self, html: &str);

    /// Sends a message to the script running in the panel.
    fn post_message(&mut self, message: &Message);

    /// Origin the panel serves local resources from, for CSP directives.
    fn csp_source(&self) -> String;

    /// Resolves a bundled asset to a URI loadable inside the panel.
    fn asset_uri(&self, asset: &str) -> String;
}

/// Everything the lifecycle needs from the surrounding editor.
pub trait EditorHost {
    /// Opens a new webview panel beside the active editor.
    fn create_panel(&mut self, title: &str) -> Box<dyn WebviewPanel>;

    /// Shows a user-facing error notification.
    fn show_error(&mut self, message: &str);

    /// Formatting settings for save and beautify.
    fn format_options(&self) -> FormatOptions;

    /// Publishes whether a visual editor is currently open, for menu
    /// and keybinding contexts.
    fn set_editor_visible(&mut self, visible: bool);

    /// Replaces the full text of an open document buffer.
    fn replace_document_text(&mut self, document: &HostDocument, text: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str, scheme: DocumentScheme, language_id: &str) -> HostDocument {
        HostDocument {
            path: PathBuf::from(path),
            scheme,
            language_id: language_id.to_string(),
            text: String::new(),
        }
    }

    #[test]
    fn mjml_detection_needs_language_and_scheme() {
        assert!(doc("/a/mail.mjml", DocumentScheme::File, "mjml").is_mjml());
        assert!(doc("untitled-1", DocumentScheme::Untitled, "mjml").is_mjml());
        assert!(!doc("/a/mail.mjml", DocumentScheme::File, "html").is_mjml());
        assert!(!doc("/a/mail.mjml", DocumentScheme::Other, "mjml").is_mjml());
    }

    #[test]
    fn parent_dir_of_bare_name_is_empty() {
        let d = doc("untitled-1", DocumentScheme::Untitled, "mjml");
        assert_eq!(d.parent_dir(), Path::new(""));
        let d = doc("/inbox/mail.mjml", DocumentScheme::File, "mjml");
        assert_eq!(d.parent_dir(), Path::new("/inbox"));
    }

    #[test]
    fn file_name_drops_the_directory() {
        let d = doc("/inbox/mail.mjml", DocumentScheme::File, "mjml");
        assert_eq!(d.file_name(), "mail.mjml");
    }
}
