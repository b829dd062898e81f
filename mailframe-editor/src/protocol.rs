//! Wire protocol between the editor host and the webview UI.
//!
//! Every message is a JSON object `{ command, requestId?, payload?, error? }`.
//! A message carries a payload or an error, never both. Responses echo
//! the request's `requestId` verbatim; a request gets exactly one
//! response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Commands understood on either side of the webview bridge.
///
/// Anything else deserializes to [`Command::Unknown`] so foreign
/// messages can be ignored instead of failing the decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    /// Webview asks for the document content captured at open time.
    FetchFileContent,
    /// Host asks the webview to serialize its state; the webview sends
    /// the markup back under the same command tag.
    GetEditorContent,
    /// Webview asks for an image, referenced relative to the document.
    FetchImage,
    /// Webview forwards a console record to the host log.
    Log,
    #[serde(other)]
    Unknown,
}

/// Envelope for all bridge traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub command: Command,
    /// Correlates a response with its request.
    #[serde(
        rename = "requestId",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<Value>,
}

impl Message {
    /// Host-initiated request carrying a fresh correlation id.
    pub fn request(command: Command, request_id: impl Into<String>) -> Self {
        Message {
            command,
            request_id: Some(request_id.into()),
            payload: None,
            error: None,
        }
    }

    /// One-way notification without a correlation id.
    pub fn notification(command: Command, payload: Value) -> Self {
        Message {
            command,
            request_id: None,
            payload: Some(payload),
            error: None,
        }
    }

    /// Successful response: echoes the request's command and id.
    pub fn reply_to(request: &Message, payload: Value) -> Self {
        Message {
            command: request.command,
            request_id: request.request_id.clone(),
            payload: Some(payload),
            error: None,
        }
    }

    /// Error response: echoes the request's command and id, carries no
    /// payload.
    pub fn fail_to(request: &Message, error: Value) -> Self {
        Message {
            command: request.command,
            request_id: request.request_id.clone(),
            payload: None,
            error: Some(error),
        }
    }
}

/// Severity of a webview `log` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Verbose,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Maps to the `log` facade. Verbose lands on debug.
    pub fn to_level(self) -> log::Level {
        match self {
            LogLevel::Verbose => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// Typed payload of a `log` notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    /// Extra context attached by the webview console.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<Value>,
}

impl LogRecord {
    /// Renders message and data on one line: string data verbatim,
    /// structured data as pretty JSON.
    pub fn render(&self) -> String {
        match &self.data {
            None => self.message.clone(),
            Some(Value::String(s)) => format!("{} {}", self.message, s),
            Some(other) => format!(
                "{} {}",
                self.message,
                serde_json::to_string_pretty(other).unwrap_or_default()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn commands_use_kebab_case_tags() {
        let raw = serde_json::to_string(&Command::FetchFileContent).unwrap();
        assert_eq!(raw, "\"fetch-file-content\"");
        let raw = serde_json::to_string(&Command::GetEditorContent).unwrap();
        assert_eq!(raw, "\"get-editor-content\"");
        let raw = serde_json::to_string(&Command::FetchImage).unwrap();
        assert_eq!(raw, "\"fetch-image\"");
    }

    #[test]
    fn unknown_commands_still_deserialize() {
        let msg: Message =
            serde_json::from_value(json!({ "command": "make-coffee", "requestId": "7" })).unwrap();
        assert_eq!(msg.command, Command::Unknown);
        assert_eq!(msg.request_id.as_deref(), Some("7"));
    }

    #[test]
    fn absent_fields_are_omitted_on_the_wire() {
        let msg = Message::request(Command::GetEditorContent, "abc");
        let raw = serde_json::to_string(&msg).unwrap();
        assert_eq!(raw, "{\"command\":\"get-editor-content\",\"requestId\":\"abc\"}");
    }

    #[test]
    fn notifications_carry_a_payload_and_no_id() {
        let record = LogRecord {
            level: LogLevel::Info,
            message: "editor ready".into(),
            data: None,
        };
        let note = Message::notification(Command::Log, serde_json::to_value(&record).unwrap());
        assert!(note.request_id.is_none());
        assert!(note.error.is_none());

        let raw = serde_json::to_string(&note).unwrap();
        assert_eq!(
            raw,
            "{\"command\":\"log\",\"payload\":{\"level\":\"info\",\"message\":\"editor ready\"}}"
        );
    }

    #[test]
    fn replies_echo_command_and_id() {
        let request: Message = serde_json::from_value(json!({
            "command": "fetch-image",
            "requestId": "42",
            "payload": "logo.png"
        }))
        .unwrap();

        let reply = Message::reply_to(&request, json!("data:image/png;base64,"));
        assert_eq!(reply.command, Command::FetchImage);
        assert_eq!(reply.request_id.as_deref(), Some("42"));
        assert!(reply.payload.is_some());
        assert!(reply.error.is_none());

        let failure = Message::fail_to(&request, json!("not found"));
        assert!(failure.payload.is_none());
        assert!(failure.error.is_some());
    }

    #[test]
    fn log_record_renders_data_variants() {
        let plain = LogRecord {
            level: LogLevel::Info,
            message: "saved".into(),
            data: None,
        };
        assert_eq!(plain.render(), "saved");

        let with_string = LogRecord {
            level: LogLevel::Warn,
            message: "slow".into(),
            data: Some(json!("2s")),
        };
        assert_eq!(with_string.render(), "slow 2s");

        let with_object = LogRecord {
            level: LogLevel::Error,
            message: "boom".into(),
            data: Some(json!({ "code": 1 })),
        };
        assert!(with_object.render().starts_with("boom {"));
    }

    #[test]
    fn log_levels_map_to_the_facade() {
        assert_eq!(LogLevel::Verbose.to_level(), log::Level::Debug);
        assert_eq!(LogLevel::Error.to_level(), log::Level::Error);
    }
}
