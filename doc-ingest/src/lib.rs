//! Document ingestion for FinWise.
//!
//! `bytes + file name + optional metadata` become [`rag_store::DocumentChunk`]s:
//! the extension picks a loader, the metadata is stamped onto every document,
//! and a recursive character splitter cuts long documents into overlapping
//! chunks. [`ingest_files`]/[`ingest_paths`] push whole batches into a
//! [`rag_store::VectorStore`], recording per-file failures instead of stopping.

mod batch;
mod config;
mod document;
mod errors;
mod format;
mod loaders;
pub mod progress;
mod splitter;

pub use batch::{FileFailure, IngestReport, SourceFile, ingest_files, ingest_paths, prepare_file};
pub use config::IngestConfig;
pub use document::{Document, UploadMetadata, stamp_metadata};
pub use errors::IngestError;
pub use format::FileKind;
pub use loaders::load;
pub use splitter::RecursiveSplitter;
