//! Document-level wrapping of MJML fragments.

/// Root tag of a complete MJML document.
const ROOT_TAG: &str = "<mjml";

/// Returns true when `text`, ignoring leading whitespace, already starts
/// with the `<mjml` root tag.
pub fn is_document(text: &str) -> bool {
    text.trim_start().starts_with(ROOT_TAG)
}

/// Wraps an MJML fragment into a complete document.
///
/// Fragments are placed inside `<mjml><mj-body>...</mj-body></mjml>`.
/// Text that is already a full document is returned unchanged, so
/// wrapping twice gives the same result as wrapping once.
///
/// # Examples
///
/// - `wrap_as_document("<h1>Hi</h1>")` → `"<mjml><mj-body><h1>Hi</h1></mj-body></mjml>"`
/// - `wrap_as_document("  <mjml>...</mjml>")` → unchanged
pub fn wrap_as_document(text: &str) -> String {
    if is_document(text) {
        return text.to_string();
    }
    format!("<mjml><mj-body>{}</mj-body></mjml>", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_fragment() {
        assert_eq!(
            wrap_as_document("<h1>Hi</h1>"),
            "<mjml><mj-body><h1>Hi</h1></mj-body></mjml>"
        );
    }

    #[test]
    fn wraps_empty_text() {
        assert_eq!(wrap_as_document(""), "<mjml><mj-body></mj-body></mjml>");
    }

    #[test]
    fn full_document_unchanged() {
        let doc = "<mjml><mj-body/></mjml>";
        assert_eq!(wrap_as_document(doc), doc);
    }

    #[test]
    fn leading_whitespace_still_counts_as_document() {
        let doc = "\n  \t<mjml attr=\"x\"></mjml>";
        assert_eq!(wrap_as_document(doc), doc);
    }

    #[test]
    fn wrapping_is_idempotent() {
        let once = wrap_as_document("<mj-text>hello</mj-text>");
        assert_eq!(wrap_as_document(&once), once);
    }

    #[test]
    fn is_document_checks_root_tag() {
        assert!(is_document("<mjml>"));
        assert!(is_document("   <mjml owa=\"desktop\">"));
        assert!(!is_document("<mj-body>"));
        assert!(!is_document("plain text"));
    }
}
