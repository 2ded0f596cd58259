//! Batch ingestion: parse, stamp, split, store; one file at a time.
//!
//! A failing file is recorded and skipped. Parsing finishes before anything is
//! sent to the store, so a file that fails to parse leaves the store untouched.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument, warn};

use rag_store::{DocumentChunk, VectorStore};
use services::uuid::content_id;

use crate::config::IngestConfig;
use crate::document::{UploadMetadata, stamp_metadata};
use crate::errors::IngestError;
use crate::loaders;
use crate::progress::Progress;
use crate::splitter::RecursiveSplitter;

/// An uploaded file held in memory.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileFailure {
    pub file: String,
    pub error: String,
}

/// Outcome of a batch: stored chunk count plus one entry per failed file.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IngestReport {
    #[serde(rename = "chunks")]
    pub chunks_stored: u64,
    pub failures: Vec<FileFailure>,
}

/// Parses one file into chunks ready for the store.
///
/// Chunk ids are `<name>@<content id>#<document>#<chunk>`. Re-ingesting the
/// same bytes under the same name overwrites the earlier chunks; any other
/// file, including a different file with the same name, gets its own ids.
pub fn prepare_file(
    name: &str,
    bytes: &[u8],
    meta: &UploadMetadata,
    cfg: &IngestConfig,
) -> Result<Vec<DocumentChunk>, IngestError> {
    let mut docs = loaders::load(name, bytes)?;
    stamp_metadata(&mut docs, meta);

    let file_id = format!("{name}@{}", content_id(bytes));
    let splitter = RecursiveSplitter::new(cfg);
    let mut chunks = Vec::new();
    for (d, doc) in docs.iter().enumerate() {
        for (c, text) in splitter.split(&doc.text).into_iter().enumerate() {
            let mut metadata = doc.metadata.clone();
            metadata.insert("chunk_index".to_string(), c.to_string());
            chunks.push(DocumentChunk::new(format!("{file_id}#{d}#{c}"), text, metadata));
        }
    }
    Ok(chunks)
}

/// Ingests in-memory files. Never fails as a whole.
#[instrument(skip_all, fields(files = files.len()))]
pub async fn ingest_files(
    store: &dyn VectorStore,
    files: Vec<SourceFile>,
    meta: &UploadMetadata,
    cfg: &IngestConfig,
    progress: &dyn Progress,
) -> IngestReport {
    let mut report = IngestReport::default();
    for file in files {
        progress.start_file(&file.name);
        match ingest_one(store, &file.name, &file.bytes, meta, cfg).await {
            Ok(n) => {
                report.chunks_stored += n;
                progress.file_done(&file.name, Some(n));
            }
            Err(e) => {
                warn!(file = %file.name, error = %e, "file skipped");
                progress.file_done(&file.name, None);
                report.failures.push(FileFailure {
                    file: file.name,
                    error: e.to_string(),
                });
            }
        }
    }
    info!(
        chunks = report.chunks_stored,
        failed = report.failures.len(),
        "ingestion finished"
    );
    report
}

/// Reads each path from disk, then behaves like [`ingest_files`]. Unreadable
/// paths are reported as failures.
pub async fn ingest_paths(
    store: &dyn VectorStore,
    paths: &[PathBuf],
    meta: &UploadMetadata,
    cfg: &IngestConfig,
    progress: &dyn Progress,
) -> IngestReport {
    let mut files = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for path in paths {
        let name = display_name(path);
        match tokio::fs::read(path).await {
            Ok(bytes) => files.push(SourceFile { name, bytes }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read file");
                unreadable.push(FileFailure {
                    file: name,
                    error: IngestError::Io(e).to_string(),
                });
            }
        }
    }

    let mut report = ingest_files(store, files, meta, cfg, progress).await;
    report.failures.extend(unreadable);
    report
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

async fn ingest_one(
    store: &dyn VectorStore,
    name: &str,
    bytes: &[u8],
    meta: &UploadMetadata,
    cfg: &IngestConfig,
) -> Result<u64, IngestError> {
    let chunks = prepare_file(name, bytes, meta, cfg)?;
    Ok(store.add(chunks).await?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rag_store::SearchMode;
    use rag_store::embed::hashing::HashingEmbedder;
    use rag_store::memory::MemoryStore;

    use super::*;
    use crate::progress::NoopProgress;

    fn store() -> MemoryStore {
        MemoryStore::new(Arc::new(HashingEmbedder::new(256)))
    }

    #[test]
    fn chunks_carry_index_and_stamped_metadata() {
        let meta = UploadMetadata {
            company: Some("Acme".into()),
            ..Default::default()
        };
        let chunks = prepare_file(
            "e.csv",
            b"Category,Amount\nGroceries,500\nRent,1200\n",
            &meta,
            &IngestConfig::default(),
        )
        .unwrap();
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].id.starts_with("e.csv@"));
        assert!(chunks[0].id.ends_with("#0#0"));
        assert!(chunks[1].id.ends_with("#1#0"));
        assert_eq!(chunks[1].text, "company: Acme\nCategory: Rent\nAmount: 1200");
        assert_eq!(chunks[1].metadata["chunk_index"], "0");
        assert_eq!(chunks[1].metadata["row"], "1");
    }

    #[test]
    fn long_documents_are_split() {
        let text = "word ".repeat(600);
        let cfg = IngestConfig::default();
        let chunks = prepare_file("long.txt", text.as_bytes(), &UploadMetadata::default(), &cfg).unwrap();
        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= cfg.chunk_size));
        assert_eq!(chunks[2].metadata["chunk_index"], "2");
    }

    #[tokio::test]
    async fn unsupported_file_does_not_stop_the_batch() {
        let store = store();
        let files = vec![
            SourceFile {
                name: "expenses.csv".into(),
                bytes: b"Category,Amount\nGroceries,500\nRent,1200\nFun,150\n".to_vec(),
            },
            SourceFile {
                name: "slides.pptx".into(),
                bytes: b"PK\x03\x04".to_vec(),
            },
            SourceFile {
                name: "notes.md".into(),
                bytes: b"Emergency fund target: six months of expenses.".to_vec(),
            },
        ];
        let report = ingest_files(
            &store,
            files,
            &UploadMetadata::default(),
            &IngestConfig::default(),
            &NoopProgress,
        )
        .await;

        assert_eq!(report.chunks_stored, 4);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].file, "slides.pptx");
        assert!(report.failures[0].error.contains("pptx"));
        assert_eq!(store.len().await, 4);

        let hits = store
            .query("Emergency fund", 1, SearchMode::Similarity)
            .await
            .unwrap();
        assert_eq!(hits[0].metadata["source"], "notes.md");
    }

    #[tokio::test]
    async fn paths_are_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("budget.csv");
        std::fs::write(&csv, "Item,Cost\nRent,1200\n").unwrap();
        let missing = dir.path().join("gone.txt");

        let store = store();
        let report = ingest_paths(
            &store,
            &[csv, missing],
            &UploadMetadata::default(),
            &IngestConfig::default(),
            &NoopProgress,
        )
        .await;
        assert_eq!(report.chunks_stored, 1);
        assert_eq!(report.failures[0].file, "gone.txt");
    }

    #[tokio::test]
    async fn parse_failure_leaves_store_untouched() {
        let store = store();
        let report = ingest_files(
            &store,
            vec![SourceFile {
                name: "broken.json".into(),
                bytes: b"{not json".to_vec(),
            }],
            &UploadMetadata::default(),
            &IngestConfig::default(),
            &NoopProgress,
        )
        .await;
        assert_eq!(report.chunks_stored, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn same_name_different_content_keeps_both() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = (dir.path().join("a"), dir.path().join("b"));
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        std::fs::write(a.join("statement.csv"), "Category,Amount\nGroceries,500\n").unwrap();
        std::fs::write(b.join("statement.csv"), "Category,Amount\nRent,1200\n").unwrap();

        let store = store();
        let report = ingest_paths(
            &store,
            &[a.join("statement.csv"), b.join("statement.csv")],
            &UploadMetadata::default(),
            &IngestConfig::default(),
            &NoopProgress,
        )
        .await;
        assert_eq!(report.chunks_stored, 2);
        assert_eq!(store.len().await as u64, report.chunks_stored);
    }

    #[tokio::test]
    async fn reingesting_identical_file_overwrites() {
        let store = store();
        let file = || SourceFile {
            name: "budget.csv".into(),
            bytes: b"Item,Cost\nRent,1200\nFun,150\n".to_vec(),
        };
        for _ in 0..2 {
            ingest_files(
                &store,
                vec![file()],
                &UploadMetadata::default(),
                &IngestConfig::default(),
                &NoopProgress,
            )
            .await;
        }
        assert_eq!(store.len().await, 2);
    }
}
