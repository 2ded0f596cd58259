//! Parsed documents and the metadata stamped onto them.

use std::collections::BTreeMap;

use serde::Deserialize;

/// One loader output unit, before splitting.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(text: impl Into<String>, source: &str) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), source.to_string());
        Self {
            text: text.into(),
            metadata,
        }
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }
}

/// Optional user-supplied fields attached to every chunk of an upload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct UploadMetadata {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

impl UploadMetadata {
    /// Non-empty fields in fixed order (`source`, `company`, `year`).
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("source", &self.source),
            ("company", &self.company),
            ("year", &self.year),
        ]
        .into_iter()
        .filter_map(|(k, v)| {
            v.as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (k, v))
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }
}

/// Merges `meta` into every document and prepends it as a `k: v k2: v2`
/// line so similarity search can match on it.
pub fn stamp_metadata(docs: &mut [Document], meta: &UploadMetadata) {
    let pairs = meta.pairs();
    if pairs.is_empty() {
        return;
    }
    let line = pairs
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(" ");
    for doc in docs.iter_mut() {
        for (k, v) in &pairs {
            doc.metadata.insert((*k).to_string(), (*v).to_string());
        }
        doc.text = format!("{line}\n{}", doc.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_first_line_and_metadata() {
        let mut docs = vec![Document::new("Revenue grew 12%", "report.txt")];
        let meta = UploadMetadata {
            source: None,
            company: Some("Acme".into()),
            year: Some("2023".into()),
        };
        stamp_metadata(&mut docs, &meta);
        assert_eq!(docs[0].text, "company: Acme year: 2023\nRevenue grew 12%");
        assert_eq!(docs[0].metadata["company"], "Acme");
        assert_eq!(docs[0].metadata["source"], "report.txt");
    }

    #[test]
    fn blank_fields_are_dropped() {
        let meta = UploadMetadata {
            source: Some("  ".into()),
            company: None,
            year: Some("2024".into()),
        };
        assert_eq!(meta.pairs(), vec![("year", "2024")]);

        let mut docs = vec![Document::new("x", "a.md")];
        stamp_metadata(&mut docs, &UploadMetadata::default());
        assert_eq!(docs[0].text, "x");
    }
}
