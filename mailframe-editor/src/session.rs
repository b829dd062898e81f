//! One open visual-editor instance.
//!
//! A session owns the webview panel it drew, the document it was
//! opened for and the content snapshot taken at open time. Dropping
//! the session drops the panel, so a live panel and a live session are
//! the same thing.

use std::fs;

use serde_json::Value;
use uuid::Uuid;

use crate::error::{EditorError, EditorResult};
use crate::host::{DocumentScheme, EditorHost, HostDocument, WebviewPanel};
use crate::images::{read_image_as_data_url, resolve_image_path};
use crate::protocol::{Command, LogRecord, Message};

use mailframe_mjml::{beautify, wrap_as_document};

/// Script bundle the panel loads to boot the editor UI.
const UI_BUNDLE: &str = "editor-ui.js";

/// What the caller must do with the session after a message.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    KeepOpen,
    /// The save round trip finished; drop the session.
    Dispose,
}

pub struct EditorSession {
    document: HostDocument,
    /// Wrapped snapshot served to the webview. Taken once at open;
    /// later edits to the text buffer are not reflected.
    content: String,
    panel: Box<dyn WebviewPanel>,
    nonce: String,
    /// Correlation id of the outstanding content request, if any.
    pending_request: Option<String>,
}

impl EditorSession {
    /// Opens a panel for the document and boots the editor UI in it.
    pub fn open(document: &HostDocument, host: &mut dyn EditorHost) -> EditorSession {
        let content = wrap_as_document(&document.text);
        let label = format!("MJML Editor - {}", document.file_name());
        let mut panel = host.create_panel(&label);
        let nonce = Uuid::new_v4().simple().to_string();
        let html = bootstrap_html(panel.as_ref(), &nonce);
        panel.set_html(&html);
        log::info!("Opened visual editor for '{}'", document.path.display());

        EditorSession {
            document: document.clone(),
            content,
            panel,
            nonce,
            pending_request: None,
        }
    }

    /// Routes one message from the webview.
    pub fn handle_message(
        &mut self,
        message: &Message,
        host: &mut dyn EditorHost,
    ) -> SessionOutcome {
        match message.command {
            Command::FetchFileContent => {
                let reply = Message::reply_to(message, Value::String(self.content.clone()));
                self.panel.post_message(&reply);
                SessionOutcome::KeepOpen
            }
            Command::GetEditorContent => self.complete_save(message, host),
            Command::FetchImage => {
                self.fetch_image(message);
                SessionOutcome::KeepOpen
            }
            Command::Log => {
                self.mirror_log(message);
                SessionOutcome::KeepOpen
            }
            Command::Unknown => {
                log::debug!("Ignoring unrecognized webview message");
                SessionOutcome::KeepOpen
            }
        }
    }

    /// Asks the webview to serialize its current state. The answer
    /// arrives later as a `get-editor-content` message.
    pub fn request_editor_content(&mut self) {
        let request_id = Uuid::new_v4().to_string();
        let request = Message::request(Command::GetEditorContent, request_id.clone());
        self.pending_request = Some(request_id);
        self.panel.post_message(&request);
    }

    pub fn document(&self) -> &HostDocument {
        &self.document
    }

    /// The wrapped snapshot captured at open time.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Handles the webview's answer to [`request_editor_content`].
    ///
    /// Replies may echo the request id or omit it. An id that belongs
    /// to an older request is stale and dropped without touching the
    /// file.
    ///
    /// [`request_editor_content`]: EditorSession::request_editor_content
    fn complete_save(&mut self, message: &Message, host: &mut dyn EditorHost) -> SessionOutcome {
        if let (Some(pending), Some(echoed)) = (&self.pending_request, &message.request_id) {
            if pending != echoed {
                log::warn!("Ignoring stale editor content response '{}'", echoed);
                return SessionOutcome::KeepOpen;
            }
        }
        if self.pending_request.take().is_none() {
            log::debug!("Editor content arrived without an outstanding request");
        }

        match self.write_back(message, host) {
            Ok(()) => {
                log::info!("Saved '{}'", self.document.path.display());
                SessionOutcome::Dispose
            }
            Err(e) => {
                log::warn!("Save failed: {}", e);
                host.show_error(&e.to_string());
                SessionOutcome::KeepOpen
            }
        }
    }

    /// Formats the serialized markup and writes it to the document's
    /// file. On any error the file is left untouched.
    fn write_back(&self, message: &Message, host: &mut dyn EditorHost) -> EditorResult<()> {
        let raw = match message.payload.as_ref() {
            Some(Value::String(raw)) => raw,
            other => {
                return Err(EditorError::MalformedPayload {
                    command: "get-editor-content".to_string(),
                    reason: match other {
                        Some(_) => "expected a string".to_string(),
                        None => "missing".to_string(),
                    },
                })
            }
        };
        if self.document.scheme == DocumentScheme::Untitled {
            return Err(EditorError::NoBackingFile {
                path: self.document.path.clone(),
            });
        }

        let formatted = beautify(raw, &host.format_options())?;
        fs::write(&self.document.path, formatted).map_err(|source| EditorError::Write {
            path: self.document.path.clone(),
            source,
        })
    }

    /// Answers a `fetch-image` request. Every request gets exactly one
    /// response, a data URL on success or an error string.
    fn fetch_image(&mut self, message: &Message) {
        let raw = match message.payload.as_ref().and_then(Value::as_str) {
            Some(raw) => raw,
            None => {
                log::warn!("Malformed fetch-image payload");
                let reply =
                    Message::fail_to(message, Value::String("image path must be a string".into()));
                self.panel.post_message(&reply);
                return;
            }
        };

        let path = resolve_image_path(self.document.parent_dir(), raw);
        match read_image_as_data_url(&path) {
            Ok(data_url) => {
                let reply = Message::reply_to(message, Value::String(data_url));
                self.panel.post_message(&reply);
            }
            Err(e) => {
                log::warn!("{}", e);
                let reply = Message::fail_to(message, Value::String(e.to_string()));
                self.panel.post_message(&reply);
            }
        }
    }

    /// Forwards a webview console record to the host log.
    fn mirror_log(&self, message: &Message) {
        let payload = match message.payload.clone() {
            Some(payload) => payload,
            None => return,
        };
        match serde_json::from_value::<LogRecord>(payload) {
            Ok(record) => log::log!(record.level.to_level(), "webview: {}", record.render()),
            Err(e) => log::debug!("Unreadable log payload: {}", e),
        }
    }
}

/// Page the panel boots with. Remote loads are pinned to the panel's
/// own resource origin plus the font hosts; only the bundled script
/// carrying the session nonce may execute.
fn bootstrap_html(panel: &dyn WebviewPanel, nonce: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta http-equiv="Content-Security-Policy"
        content="default-src 'none'; img-src {0} https: data: blob: file: cid:; script-src 'nonce-{1}' {0}; style-src 'self' 'unsafe-inline' {0} https://fonts.googleapis.com https://stijndv.com; font-src * 'unsafe-inline' data:;">
    <link rel="preconnect" href="https://fonts.googleapis.com">
    <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
    <link href="https://fonts.googleapis.com/css2?family=Inter&display=swap" rel="stylesheet">
    <link rel="preconnect" href="https://stijndv.com">
    <link rel="stylesheet" href="https://stijndv.com/fonts/Eudoxus-Sans.css">
    <title>MJML Editor</title>
</head>
<body>
    <div id="app"></div>
</body>
<script nonce="{1}" src="{2}"></script>
</html>"#,
        panel.csp_source(),
        nonce,
        panel.asset_uri(UI_BUNDLE),
    )
}
