use std::path::PathBuf;

use mailframe_mjml::MjmlError;
use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("No active document to open")]
    NoActiveDocument,

    #[error("No MJML editor is open")]
    EditorNotOpen,

    #[error("'{}' is not an MJML document", .path.display())]
    NotMjml { path: PathBuf },

    #[error("Cannot format document: {0}")]
    Format(#[from] MjmlError),

    #[error("Failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("'{}' has no backing file to save to", .path.display())]
    NoBackingFile { path: PathBuf },

    #[error("Failed to read image '{}': {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Image '{}' is empty", .path.display())]
    EmptyImage { path: PathBuf },

    #[error("Malformed '{command}' payload: {reason}")]
    MalformedPayload { command: String, reason: String },
}
