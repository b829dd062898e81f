//! # Mailframe editor core
//!
//! Host-side logic for the Mailframe visual MJML editor: it opens a
//! webview panel for the active MJML document, serves the document and
//! its images to the UI over a small JSON protocol, and writes the
//! edited markup back to disk formatted.
//!
//! The embedding editor is abstracted behind [`EditorHost`] and
//! [`WebviewPanel`], so the crate itself stays free of any editor API.
//!
//! ## Features
//!
//! - Single-instance webview session with a CSP-locked bootstrap page
//! - Request/response message protocol with correlation ids
//! - Save round trip that formats with [`mailframe_mjml`] before writing
//! - In-place beautify command for the active document
//!
//! ## Example
//!
//! ```ignore
//! use mailframe_editor::{Extension, CMD_OPEN};
//!
//! let mut extension = Extension::activate();
//! extension.execute(CMD_OPEN, active_document.as_ref(), &mut host);
//! ```

pub mod error;
pub mod host;
pub mod images;
pub mod lifecycle;
pub mod protocol;
pub mod session;

pub use error::{EditorError, EditorResult};
pub use host::{DocumentScheme, EditorHost, HostDocument, WebviewPanel};
pub use lifecycle::{BeautifyDocument, Extension, VisualEditor, CMD_BEAUTIFY, CMD_OPEN, CMD_SAVE};
pub use protocol::{Command, LogLevel, LogRecord, Message};
pub use session::{EditorSession, SessionOutcome};
