use crate::document::Document;

/// Whole file as one document. Invalid UTF-8 is replaced, not rejected.
pub(super) fn load(name: &str, bytes: &[u8]) -> Vec<Document> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    vec![Document::new(text, name)]
}
