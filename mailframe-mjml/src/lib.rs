//! # Mailframe MJML toolkit
//!
//! Text-level MJML helpers for the Mailframe visual editor: document
//! wrapping, a lenient markup beautifier, and data-URL encoding.
//!
//! ## Features
//! - Idempotent wrapping of fragments into full `<mjml>` documents
//! - A forgiving formatter that survives editor-state markup
//! - `mj-style` aware beautification (raw CSS blocks keep their content)
//! - Data-URL encoding for image delivery
//!
//! ## Example
//! ```ignore
//! use mailframe_mjml::{beautify, wrap_as_document, FormatOptions};
//!
//! let doc = wrap_as_document("<mj-text>Hello</mj-text>");
//! let pretty = beautify(&doc, &FormatOptions::default()).expect("well-formed markup");
//! ```

pub mod data_url;
pub mod document;
pub mod error;
pub mod format;

pub use data_url::to_data_url;
pub use document::{is_document, wrap_as_document};
pub use error::{MjmlError, MjmlResult};
pub use format::{beautify, format_html, FormatOptions, MAX_NESTING_DEPTH};
