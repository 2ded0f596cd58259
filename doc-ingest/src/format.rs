//! File type detection by extension.

use std::path::Path;

use crate::errors::IngestError;

/// Formats with a dedicated loader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Pdf,
    Text,
    Spreadsheet,
    Json,
}

impl FileKind {
    /// Picks the loader from the (case-insensitive) extension of `name`.
    pub fn from_file_name(name: &str) -> Result<Self, IngestError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| IngestError::MissingExtension(name.to_string()))?;

        match ext.as_str() {
            "csv" => Ok(FileKind::Csv),
            "pdf" => Ok(FileKind::Pdf),
            "txt" | "md" => Ok(FileKind::Text),
            "xlsx" | "xls" => Ok(FileKind::Spreadsheet),
            "json" | "jsonl" => Ok(FileKind::Json),
            _ => Err(IngestError::UnsupportedFileType(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_by_extension() {
        assert_eq!(FileKind::from_file_name("a/B.CSV").unwrap(), FileKind::Csv);
        assert_eq!(FileKind::from_file_name("notes.md").unwrap(), FileKind::Text);
        assert_eq!(FileKind::from_file_name("q.xls").unwrap(), FileKind::Spreadsheet);
    }

    #[test]
    fn unsupported_names_the_extension() {
        let err = FileKind::from_file_name("deck.pptx").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file type: pptx");
        assert!(matches!(
            FileKind::from_file_name("README"),
            Err(IngestError::MissingExtension(_))
        ));
    }
}
