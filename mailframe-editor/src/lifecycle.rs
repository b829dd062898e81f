//! Command handling and session lifecycle.
//!
//! [`VisualEditor`] owns at most one [`EditorSession`] and decides
//! when it opens and when it is released. Four triggers release it:
//! the bound document is saved externally, the bound document's tab is
//! closed, the panel itself is closed, or a save round trip completes.
//! All four funnel into one idempotent [`VisualEditor::dispose`].

use std::path::Path;

use mailframe_mjml::beautify;

use crate::error::{EditorError, EditorResult};
use crate::host::{EditorHost, HostDocument};
use crate::protocol::Message;
use crate::session::{EditorSession, SessionOutcome};

// Command ids

pub const CMD_OPEN: &str = "mailframe.openFile";
pub const CMD_SAVE: &str = "mailframe.saveFile";
pub const CMD_BEAUTIFY: &str = "mailframe.beautify";

/// The visual-editor feature: at most one session at a time.
#[derive(Default)]
pub struct VisualEditor {
    session: Option<EditorSession>,
    /// Set when the user asked to open the editor. Document events
    /// only release the session while this is set, so unrelated saves
    /// before an open never tear anything down.
    open_requested: bool,
}

impl VisualEditor {
    pub fn new() -> VisualEditor {
        VisualEditor::default()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&EditorSession> {
        self.session.as_ref()
    }

    /// Opens the visual editor for the active document.
    ///
    /// Non-MJML documents and a second open while a session is live
    /// are quietly skipped. No active document is an error.
    pub fn open_file(
        &mut self,
        active: Option<&HostDocument>,
        host: &mut dyn EditorHost,
    ) -> EditorResult<()> {
        let document = active.ok_or(EditorError::NoActiveDocument)?;
        self.open_requested = true;

        if !document.is_mjml() {
            log::debug!("'{}' is not an MJML document", document.path.display());
            return Ok(());
        }
        if self.session.is_some() {
            log::debug!("Visual editor already open");
            return Ok(());
        }

        self.session = Some(EditorSession::open(document, host));
        host.set_editor_visible(true);
        Ok(())
    }

    /// Starts the save round trip by asking the webview for its
    /// current content.
    pub fn save_file(&mut self) -> EditorResult<()> {
        match self.session.as_mut() {
            Some(session) => {
                session.request_editor_content();
                Ok(())
            }
            None => Err(EditorError::EditorNotOpen),
        }
    }

    /// Routes a message from the webview to the session.
    pub fn handle_webview_message(&mut self, message: &Message, host: &mut dyn EditorHost) {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => {
                log::debug!("Webview message arrived with no session open");
                return;
            }
        };
        if session.handle_message(message, host) == SessionOutcome::Dispose {
            self.dispose(host);
        }
    }

    /// The document was saved outside the visual editor.
    pub fn handle_document_saved(&mut self, path: &Path, host: &mut dyn EditorHost) {
        if self.should_release(path) {
            log::info!("'{}' saved externally, closing editor", path.display());
            self.dispose(host);
        }
    }

    /// The document's tab was closed.
    pub fn handle_document_closed(&mut self, path: &Path, host: &mut dyn EditorHost) {
        if self.should_release(path) {
            log::info!("'{}' closed, closing editor", path.display());
            self.dispose(host);
        }
    }

    /// The user closed the panel itself.
    pub fn handle_panel_closed(&mut self, host: &mut dyn EditorHost) {
        if self.session.is_some() {
            self.dispose(host);
        }
    }

    /// Whether an event about this path concerns the bound document.
    fn should_release(&self, path: &Path) -> bool {
        self.open_requested
            && self
                .session
                .as_ref()
                .map(|s| s.document().path.as_path() == path)
                .unwrap_or(false)
    }

    /// Releases the session and its panel. Safe to call repeatedly.
    pub fn dispose(&mut self, host: &mut dyn EditorHost) {
        if self.session.take().is_some() {
            host.set_editor_visible(false);
            log::info!("Visual editor closed");
        }
        self.open_requested = false;
    }
}

/// In-place formatter for the active document buffer.
#[derive(Default)]
pub struct BeautifyDocument;

impl BeautifyDocument {
    /// Beautifies the active document and replaces its buffer text.
    /// The buffer is not written to disk.
    pub fn run(
        &self,
        active: Option<&HostDocument>,
        host: &mut dyn EditorHost,
    ) -> EditorResult<()> {
        let document = active.ok_or(EditorError::NoActiveDocument)?;
        if !document.is_mjml() {
            return Err(EditorError::NotMjml {
                path: document.path.clone(),
            });
        }

        let formatted = beautify(&document.text, &host.format_options())?;
        host.replace_document_text(document, &formatted);
        Ok(())
    }
}

/// Top-level wiring: command dispatch plus event forwarding.
#[derive(Default)]
pub struct Extension {
    editor: VisualEditor,
    beautifier: BeautifyDocument,
}

impl Extension {
    pub fn activate() -> Extension {
        log::info!("mailframe activated");
        Extension::default()
    }

    /// Command ids this extension contributes.
    pub fn commands() -> [&'static str; 3] {
        [CMD_OPEN, CMD_SAVE, CMD_BEAUTIFY]
    }

    /// Runs a contributed command. Failures are logged and surfaced to
    /// the user; unknown ids are ignored.
    pub fn execute(
        &mut self,
        command: &str,
        active: Option<&HostDocument>,
        host: &mut dyn EditorHost,
    ) {
        let result = match command {
            CMD_OPEN => self.editor.open_file(active, host),
            CMD_SAVE => self.editor.save_file(),
            CMD_BEAUTIFY => self.beautifier.run(active, host),
            other => {
                log::debug!("Unknown command '{}'", other);
                return;
            }
        };
        if let Err(e) = result {
            log::warn!("{} failed: {}", command, e);
            host.show_error(&e.to_string());
        }
    }

    pub fn handle_webview_message(&mut self, message: &Message, host: &mut dyn EditorHost) {
        self.editor.handle_webview_message(message, host);
    }

    pub fn handle_document_saved(&mut self, path: &Path, host: &mut dyn EditorHost) {
        self.editor.handle_document_saved(path, host);
    }

    pub fn handle_document_closed(&mut self, path: &Path, host: &mut dyn EditorHost) {
        self.editor.handle_document_closed(path, host);
    }

    pub fn handle_panel_closed(&mut self, host: &mut dyn EditorHost) {
        self.editor.handle_panel_closed(host);
    }

    pub fn editor(&self) -> &VisualEditor {
        &self.editor
    }

    pub fn deactivate(&mut self, host: &mut dyn EditorHost) {
        self.editor.dispose(host);
        log::info!("mailframe deactivated");
    }
}
