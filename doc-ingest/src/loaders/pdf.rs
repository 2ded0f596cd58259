use crate::document::Document;
use crate::errors::IngestError;

/// Extracted text layer of the whole PDF as one document.
pub(super) fn load(name: &str, bytes: &[u8]) -> Result<Vec<Document>, IngestError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| IngestError::Pdf(format!("{name}: {e}")))?;
    Ok(vec![Document::new(text, name)])
}
