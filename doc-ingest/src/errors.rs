//! Ingestion errors. Each one is scoped to a single file.

use thiserror::Error;

use ai_llm_service::error_handler::AiLlmError;
use rag_store::RagError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("file '{0}' has no extension")]
    MissingExtension(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("pdf error: {0}")]
    Pdf(String),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("json error: {0}")]
    Json(String),

    #[error("'{0}' contains no text")]
    EmptyDocument(String),

    #[error("store error: {0}")]
    Store(#[from] RagError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Env(#[from] AiLlmError),
}
