//! Format-specific loaders. Each turns raw bytes into [`Document`]s carrying
//! at least a `source` metadata entry.

mod csv;
mod json;
mod pdf;
mod sheet;
mod text;

use tracing::debug;

use crate::document::Document;
use crate::errors::IngestError;
use crate::format::FileKind;

/// Parses `bytes` according to the extension of `name`.
pub fn load(name: &str, bytes: &[u8]) -> Result<Vec<Document>, IngestError> {
    let kind = FileKind::from_file_name(name)?;
    let docs = match kind {
        FileKind::Csv => csv::load(name, bytes)?,
        FileKind::Pdf => pdf::load(name, bytes)?,
        FileKind::Text => text::load(name, bytes),
        FileKind::Spreadsheet => sheet::load(name, bytes)?,
        FileKind::Json => json::load(name, bytes)?,
    };
    let docs: Vec<Document> = docs
        .into_iter()
        .filter(|d| !d.text.trim().is_empty())
        .collect();
    if docs.is_empty() {
        return Err(IngestError::EmptyDocument(name.to_string()));
    }
    debug!(file = name, kind = ?kind, documents = docs.len(), "loaded");
    Ok(docs)
}
