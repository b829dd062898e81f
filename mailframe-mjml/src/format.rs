//! Lenient markup beautifier for MJML documents.
//!
//! The formatter tolerates the half-finished markup a live editor
//! produces: unmatched close tags, stray `<` characters and missing
//! raw-text terminators all pass through instead of failing. Output is
//! a fixed point: formatting already-formatted markup returns it
//! unchanged.

use serde::Deserialize;

use crate::error::{MjmlError, MjmlResult};

/// Maximum element nesting depth the printer accepts.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Elements whose content is never tokenized.
const RAW_TEXT_TAGS: &[&str] = &["style", "script", "pre", "textarea"];

/// Raw-text elements whose content is re-indented line by line.
/// `pre` and `textarea` are whitespace-significant and pass through
/// byte-exact instead.
const REINDENT_RAW_TAGS: &[&str] = &["style", "script"];

/// Void HTML elements: no closing tag, no depth change.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const MJ_STYLE_OPEN: &str = "<mj-style";
const MJ_STYLE_CLOSE: &str = "</mj-style";
const STYLE_OPEN: &str = "<style";
const STYLE_CLOSE: &str = "</style";

/// Formatting options, typically read from editor settings or a YAML
/// config file. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Spaces per indentation level.
    pub indent_size: usize,
    /// Break attribute lists when a rendered line would exceed this
    /// width. Zero disables wrapping.
    pub wrap_line_length: usize,
    /// Keep blank lines between elements.
    pub preserve_newlines: bool,
    /// Most consecutive blank lines to keep.
    pub max_preserve_newlines: usize,
    /// End the output with a trailing newline.
    pub end_with_newline: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            indent_size: 2,
            wrap_line_length: 0,
            preserve_newlines: true,
            max_preserve_newlines: 2,
            end_with_newline: true,
        }
    }
}

/// Beautifies MJML source.
///
/// `mj-style` carries raw CSS, so it is renamed to `style` for the
/// formatting pass (the formatter keeps `style` content as a raw block)
/// and renamed back afterwards. Sources that already contain a plain
/// `style` tag skip the rename: the reverse mapping could not tell the
/// two apart afterwards.
pub fn beautify(source: &str, options: &FormatOptions) -> MjmlResult<String> {
    if source.contains(STYLE_OPEN) || source.contains(STYLE_CLOSE) {
        return format_html(source, options);
    }
    let renamed = source
        .replace(MJ_STYLE_OPEN, STYLE_OPEN)
        .replace(MJ_STYLE_CLOSE, STYLE_CLOSE);
    let formatted = format_html(&renamed, options)?;
    Ok(formatted
        .replace(STYLE_OPEN, MJ_STYLE_OPEN)
        .replace(STYLE_CLOSE, MJ_STYLE_CLOSE))
}

/// Formats markup: one element per indented line, short text-only
/// elements collapsed inline, attribute lists broken when they exceed
/// `wrap_line_length`.
pub fn format_html(source: &str, options: &FormatOptions) -> MjmlResult<String> {
    let tokens = tokenize(source)?;
    let mut printer = Printer {
        lines: Vec::new(),
        pending_blanks: 0,
        options,
    };
    let mut depth = 0usize;
    let mut i = 0usize;
    while i < tokens.len() {
        match &tokens[i] {
            Token::Text(text) => {
                printer.emit_text(text, depth);
                i += 1;
            }
            Token::Comment(raw) | Token::Doctype(raw) => {
                printer.push_line(depth, raw);
                i += 1;
            }
            Token::SelfClose(tag) => {
                printer.emit_tag(tag, true, depth);
                i += 1;
            }
            Token::RawElement {
                tag,
                content,
                closed,
            } => {
                printer.emit_raw_element(tag, content, *closed, depth);
                i += 1;
            }
            Token::Close { name } => {
                depth = depth.saturating_sub(1);
                printer.push_line(depth, &format!("</{}>", name));
                i += 1;
            }
            Token::Open(tag) => {
                if let Some(consumed) = try_collapse(&tokens, i, depth, &mut printer) {
                    i += consumed;
                    continue;
                }
                printer.emit_tag(tag, false, depth);
                if !VOID_TAGS.contains(&tag.name.as_str()) {
                    depth += 1;
                    if depth > MAX_NESTING_DEPTH {
                        return Err(MjmlError::MaxNestingDepthExceeded {
                            max_depth: MAX_NESTING_DEPTH,
                        });
                    }
                }
                i += 1;
            }
        }
    }
    let mut out = printer.lines.join("\n");
    if options.end_with_newline && !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

#[derive(Debug)]
enum Token<'a> {
    /// Text run between tags.
    Text(&'a str),
    /// Full `<!-- ... -->` slice.
    Comment(&'a str),
    /// Full `<! ... >` slice.
    Doctype(&'a str),
    Open(Tag<'a>),
    Close {
        name: String,
    },
    SelfClose(Tag<'a>),
    /// A raw-text element with its verbatim content. `closed` is false
    /// when the close tag was missing and the content runs to the end.
    RawElement {
        tag: Tag<'a>,
        content: &'a str,
        closed: bool,
    },
}

#[derive(Debug)]
struct Tag<'a> {
    /// Lowercased element name.
    name: String,
    attrs: Vec<Attr<'a>>,
}

#[derive(Debug)]
struct Attr<'a> {
    name: &'a str,
    /// Raw value slice, including quotes when the source had them.
    value: Option<&'a str>,
}

fn tokenize(src: &str) -> MjmlResult<Vec<Token<'_>>> {
    let bytes = src.as_bytes();
    let mut tokens: Vec<Token<'_>> = Vec::new();
    let mut i = 0;
    let mut text_start = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let rest = &bytes[i..];
        if rest.starts_with(b"<!--") {
            push_text(src, text_start, i, &mut tokens);
            let end = match find_from(bytes, i + 4, b"-->") {
                Some(p) => p + 3,
                None => return Err(MjmlError::UnterminatedComment { offset: i }),
            };
            tokens.push(Token::Comment(&src[i..end]));
            i = end;
            text_start = i;
            continue;
        }
        if rest.starts_with(b"<!") {
            push_text(src, text_start, i, &mut tokens);
            let end = match find_byte_from(bytes, i + 2, b'>') {
                Some(p) => p + 1,
                None => return Err(MjmlError::UnterminatedTag { offset: i }),
            };
            tokens.push(Token::Doctype(&src[i..end]));
            i = end;
            text_start = i;
            continue;
        }
        if rest.starts_with(b"</") {
            let name_end = scan_name(bytes, i + 2);
            if name_end == i + 2 {
                // "</" followed by junk stays literal text
                i += 1;
                continue;
            }
            let bracket = match find_byte_from(bytes, name_end, b'>') {
                Some(p) => p,
                None => return Err(MjmlError::UnterminatedTag { offset: i }),
            };
            push_text(src, text_start, i, &mut tokens);
            tokens.push(Token::Close {
                name: src[i + 2..name_end].to_ascii_lowercase(),
            });
            i = bracket + 1;
            text_start = i;
            continue;
        }
        let name_end = scan_name(bytes, i + 1);
        if name_end == i + 1 {
            // '<' not opening a tag stays literal text
            i += 1;
            continue;
        }
        push_text(src, text_start, i, &mut tokens);
        let (tag, self_closing, after) = parse_tag(src, i, name_end)?;
        if self_closing {
            tokens.push(Token::SelfClose(tag));
            i = after;
            text_start = i;
            continue;
        }
        if RAW_TEXT_TAGS.contains(&tag.name.as_str()) {
            match find_raw_close(bytes, after, &tag.name) {
                Some((content_end, next)) => {
                    tokens.push(Token::RawElement {
                        tag,
                        content: &src[after..content_end],
                        closed: true,
                    });
                    i = next;
                }
                None => {
                    tokens.push(Token::RawElement {
                        tag,
                        content: &src[after..],
                        closed: false,
                    });
                    i = bytes.len();
                }
            }
            text_start = i;
            continue;
        }
        tokens.push(Token::Open(tag));
        i = after;
        text_start = i;
    }
    push_text(src, text_start, bytes.len(), &mut tokens);
    Ok(tokens)
}

fn push_text<'a>(src: &'a str, start: usize, end: usize, tokens: &mut Vec<Token<'a>>) {
    if end > start {
        tokens.push(Token::Text(&src[start..end]));
    }
}

/// Scans a tag name at `start`. Returns `start` when no name is there.
fn scan_name(bytes: &[u8], start: usize) -> usize {
    if start >= bytes.len() || !bytes[start].is_ascii_alphabetic() {
        return start;
    }
    let mut i = start + 1;
    while i < bytes.len()
        && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'-' | b'_' | b':' | b'.'))
    {
        i += 1;
    }
    i
}

/// Parses a start tag from its name end to the closing `>`.
/// Returns the tag, whether it self-closes, and the index past `>`.
fn parse_tag(src: &str, tag_start: usize, name_end: usize) -> MjmlResult<(Tag<'_>, bool, usize)> {
    let bytes = src.as_bytes();
    let name = src[tag_start + 1..name_end].to_ascii_lowercase();
    let mut attrs: Vec<Attr<'_>> = Vec::new();
    let mut i = name_end;
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            return Err(MjmlError::UnterminatedTag { offset: tag_start });
        }
        match bytes[i] {
            b'>' => return Ok((Tag { name, attrs }, false, i + 1)),
            b'/' => {
                if bytes.get(i + 1) == Some(&b'>') {
                    return Ok((Tag { name, attrs }, true, i + 2));
                }
                // stray slash
                i += 1;
            }
            _ => {
                let attr_start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'>' | b'=' | b'/')
                {
                    i += 1;
                }
                if i == attr_start {
                    i += 1;
                    continue;
                }
                let attr_name = &src[attr_start..i];
                let mut value: Option<&str> = None;
                let mut j = i;
                while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                if j < bytes.len() && bytes[j] == b'=' {
                    j += 1;
                    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                        j += 1;
                    }
                    if j >= bytes.len() {
                        return Err(MjmlError::UnterminatedTag { offset: tag_start });
                    }
                    match bytes[j] {
                        b'"' | b'\'' => {
                            let quote = bytes[j];
                            let close = match find_byte_from(bytes, j + 1, quote) {
                                Some(p) => p,
                                None => {
                                    return Err(MjmlError::UnterminatedAttribute {
                                        tag: name,
                                        offset: j,
                                    })
                                }
                            };
                            value = Some(&src[j..=close]);
                            i = close + 1;
                        }
                        _ => {
                            let value_start = j;
                            while j < bytes.len()
                                && !bytes[j].is_ascii_whitespace()
                                && bytes[j] != b'>'
                            {
                                j += 1;
                            }
                            value = Some(&src[value_start..j]);
                            i = j;
                        }
                    }
                }
                attrs.push(Attr {
                    name: attr_name,
                    value,
                });
            }
        }
    }
}

/// Finds the close tag of a raw-text element. Returns the content end
/// and the index past the close tag's `>`.
fn find_raw_close(bytes: &[u8], from: usize, name: &str) -> Option<(usize, usize)> {
    let name_bytes = name.as_bytes();
    let mut i = from;
    while i + 2 + name_bytes.len() <= bytes.len() {
        if bytes[i] == b'<'
            && bytes[i + 1] == b'/'
            && bytes[i + 2..i + 2 + name_bytes.len()].eq_ignore_ascii_case(name_bytes)
        {
            let after = i + 2 + name_bytes.len();
            let terminated = match bytes.get(after) {
                Some(&b'>') => true,
                Some(&b) => b.is_ascii_whitespace(),
                None => false,
            };
            if terminated {
                if let Some(bracket) = find_byte_from(bytes, after, b'>') {
                    return Some((i, bracket + 1));
                }
                return None;
            }
        }
        i += 1;
    }
    None
}

fn find_byte_from(bytes: &[u8], start: usize, needle: u8) -> Option<usize> {
    let tail = bytes.get(start..)?;
    tail.iter().position(|&b| b == needle).map(|p| start + p)
}

fn find_from(bytes: &[u8], start: usize, needle: &[u8]) -> Option<usize> {
    let tail = bytes.get(start..)?;
    if needle.is_empty() || needle.len() > tail.len() {
        return None;
    }
    tail.windows(needle.len())
        .position(|w| w == needle)
        .map(|p| start + p)
}

/// Renders a tag on a single line: name and attributes separated by
/// single spaces, attribute values kept verbatim.
fn render_tag(tag: &Tag<'_>, self_closing: bool) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(&tag.name);
    for attr in &tag.attrs {
        out.push(' ');
        out.push_str(attr.name);
        if let Some(value) = attr.value {
            out.push('=');
            out.push_str(value);
        }
    }
    out.push_str(if self_closing { " />" } else { ">" });
    out
}

struct Printer<'a> {
    lines: Vec<String>,
    pending_blanks: usize,
    options: &'a FormatOptions,
}

impl Printer<'_> {
    fn push_line(&mut self, depth: usize, content: &str) {
        for _ in 0..self.pending_blanks {
            self.lines.push(String::new());
        }
        self.pending_blanks = 0;
        let mut line = " ".repeat(self.options.indent_size * depth);
        line.push_str(content);
        self.lines.push(line);
    }

    /// Records a vertical gap of `newlines` line breaks from the source.
    /// Two or more breaks become preserved blank lines.
    fn note_gap(&mut self, newlines: usize) {
        if !self.options.preserve_newlines || self.lines.is_empty() || newlines < 2 {
            return;
        }
        let blanks = (newlines - 1).min(self.options.max_preserve_newlines);
        self.pending_blanks = self.pending_blanks.max(blanks);
    }

    fn emit_text(&mut self, text: &str, depth: usize) {
        let mut newlines = 0usize;
        for (idx, line) in text.split('\n').enumerate() {
            if idx > 0 {
                newlines += 1;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            self.note_gap(newlines);
            self.push_line(depth, trimmed);
            newlines = 0;
        }
        self.note_gap(newlines);
    }

    fn emit_tag(&mut self, tag: &Tag<'_>, self_closing: bool, depth: usize) {
        let single = render_tag(tag, self_closing);
        let wrap = self.options.wrap_line_length;
        if wrap == 0
            || tag.attrs.len() < 2
            || self.options.indent_size * depth + single.len() <= wrap
        {
            self.push_line(depth, &single);
            return;
        }
        // break: tag name alone, then one attribute per line
        self.push_line(depth, &format!("<{}", tag.name));
        let last = tag.attrs.len() - 1;
        for (idx, attr) in tag.attrs.iter().enumerate() {
            let mut line = String::new();
            line.push_str(attr.name);
            if let Some(value) = attr.value {
                line.push('=');
                line.push_str(value);
            }
            if idx == last {
                line.push_str(if self_closing { " />" } else { ">" });
            }
            self.push_line(depth + 1, &line);
        }
    }

    fn emit_raw_element(&mut self, tag: &Tag<'_>, content: &str, closed: bool, depth: usize) {
        if content.trim().is_empty() && closed {
            let mut line = render_tag(tag, false);
            line.push_str(&format!("</{}>", tag.name));
            self.push_line(depth, &line);
            return;
        }
        if !REINDENT_RAW_TAGS.contains(&tag.name.as_str()) {
            // whitespace-significant content, glued to its tags byte-exact
            let mut line = render_tag(tag, false);
            line.push_str(content);
            if closed {
                line.push_str(&format!("</{}>", tag.name));
            }
            self.push_line(depth, &line);
            return;
        }
        self.push_line(depth, &render_tag(tag, false));
        self.reindent_block(content, depth + 1);
        if closed {
            self.push_line(depth, &format!("</{}>", tag.name));
        }
    }

    /// Re-indents a raw block: strips the indentation the lines share,
    /// then indents every line to `depth`. Blank edges are dropped,
    /// interior blank lines stay.
    fn reindent_block(&mut self, content: &str, depth: usize) {
        let lines: Vec<&str> = content.split('\n').collect();
        let first = match lines.iter().position(|l| !l.trim().is_empty()) {
            Some(p) => p,
            None => return,
        };
        let last = match lines.iter().rposition(|l| !l.trim().is_empty()) {
            Some(p) => p,
            None => return,
        };
        let body = &lines[first..=last];
        let prefix = common_whitespace_prefix(body);
        for line in body {
            if line.trim().is_empty() {
                self.lines.push(String::new());
            } else {
                let stripped = line.strip_prefix(prefix).unwrap_or(line);
                self.push_line(depth, stripped.trim_end());
            }
        }
    }
}

/// Collapses `<tag>short text</tag>` and `<tag></tag>` onto one line.
/// Returns the number of tokens consumed, or None when not collapsible.
fn try_collapse(
    tokens: &[Token<'_>],
    i: usize,
    depth: usize,
    printer: &mut Printer<'_>,
) -> Option<usize> {
    let tag = match &tokens[i] {
        Token::Open(tag) => tag,
        _ => return None,
    };
    if VOID_TAGS.contains(&tag.name.as_str()) {
        return None;
    }
    let (text, close_at) = match tokens.get(i + 1) {
        Some(Token::Close { name }) if *name == tag.name => ("", i + 1),
        Some(Token::Text(text)) => match tokens.get(i + 2) {
            Some(Token::Close { name }) if *name == tag.name => (*text, i + 2),
            _ => return None,
        },
        _ => return None,
    };
    let trimmed = text.trim();
    if trimmed.contains('\n') {
        return None;
    }
    let mut line = render_tag(tag, false);
    line.push_str(trimmed);
    line.push_str(&format!("</{}>", tag.name));
    let wrap = printer.options.wrap_line_length;
    if wrap != 0 && printer.options.indent_size * depth + line.len() > wrap {
        return None;
    }
    printer.push_line(depth, &line);
    Some(close_at - i + 1)
}

/// Longest whitespace prefix shared by all non-blank lines.
fn common_whitespace_prefix<'a>(lines: &[&'a str]) -> &'a str {
    let mut prefix: Option<&'a str> = None;
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let ws_end = line.len() - line.trim_start().len();
        let ws = &line[..ws_end];
        prefix = Some(match prefix {
            None => ws,
            Some(current) => shared_prefix(current, ws),
        });
    }
    prefix.unwrap_or("")
}

fn shared_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let mut end = 0;
    for ((i, ca), cb) in a.char_indices().zip(b.chars()) {
        if ca != cb {
            break;
        }
        end = i + ca.len_utf8();
    }
    &a[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_name_stops_at_delimiters() {
        assert_eq!(scan_name(b"mj-text attr", 0), 7);
        assert_eq!(scan_name(b"br/>", 0), 2);
        assert_eq!(scan_name(b" x", 0), 0);
        assert_eq!(scan_name(b"3d", 0), 0);
    }

    #[test]
    fn common_prefix_of_mixed_indents() {
        assert_eq!(common_whitespace_prefix(&["    a", "      b"]), "    ");
        assert_eq!(common_whitespace_prefix(&["\t\ta", "\t b"]), "\t");
        assert_eq!(common_whitespace_prefix(&["a", "  b"]), "");
        assert_eq!(common_whitespace_prefix(&["   ", "  b"]), "  ");
    }

    #[test]
    fn tokenize_reports_unterminated_comment() {
        let err = tokenize("<mjml><!-- oops").unwrap_err();
        assert!(matches!(err, MjmlError::UnterminatedComment { offset: 6 }));
    }

    #[test]
    fn tokenize_reports_unterminated_tag() {
        let err = tokenize("<mj-text color=\"red\"").unwrap_err();
        assert!(matches!(err, MjmlError::UnterminatedTag { offset: 0 }));
    }

    #[test]
    fn tokenize_reports_unterminated_attribute() {
        let err = tokenize("<mj-text color=\"red>").unwrap_err();
        assert!(matches!(
            err,
            MjmlError::UnterminatedAttribute { ref tag, .. } if tag == "mj-text"
        ));
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        let tokens = tokenize("a < b").unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0], Token::Text("a < b")));
    }

    #[test]
    fn raw_element_without_close_runs_to_end() {
        let tokens = tokenize("<style>.a {}").unwrap();
        assert!(matches!(
            tokens[0],
            Token::RawElement { closed: false, content: ".a {}", .. }
        ));
    }
}
