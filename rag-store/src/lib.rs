//! Embedding/retrieval store for FinWise: chunk ingestion and similarity/MMR
//! retrieval over Qdrant.
//!
//! The [`VectorStore`] trait is the contract the rest of the workspace codes
//! against: `add(chunks)` and `query(text, k, mode)`. [`RagStore`] is the
//! Qdrant-backed implementation; [`memory::MemoryStore`] keeps everything in
//! process.

mod config;
pub mod embed;
mod embed_pool;
mod errors;
mod ingest;
pub mod memory;
pub mod mmr;
mod qdrant_facade;
mod record;
mod retrieve;

pub use config::{DistanceKind, RagConfig, VectorSpace};
pub use embed::EmbeddingsProvider;
pub use errors::RagError;
pub use record::{DocumentChunk, RetrievedChunk, SearchMode};

use std::{future::Future, pin::Pin, sync::Arc};

use tracing::{debug, instrument};

/// Boxed future returned by [`VectorStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RagError>> + Send + 'a>>;

/// Add/query contract of an embedding store.
pub trait VectorStore: Send + Sync {
    /// Embeds and stores chunks; returns how many were stored.
    fn add<'a>(&'a self, chunks: Vec<DocumentChunk>) -> StoreFuture<'a, u64>;

    /// Returns up to `k` chunks ranked for `text`.
    fn query<'a>(
        &'a self,
        text: &'a str,
        k: usize,
        mode: SearchMode,
    ) -> StoreFuture<'a, Vec<RetrievedChunk>>;
}

/// High-level facade that wires configuration, Qdrant client and embedder.
///
/// This is the single entry point recommended for application code.
pub struct RagStore {
    cfg: RagConfig,
    client: qdrant_facade::QdrantFacade,
    provider: Arc<dyn EmbeddingsProvider>,
}

impl RagStore {
    /// Constructs a new store from the given configuration.
    ///
    /// The Qdrant client connects lazily, so this succeeds even when the
    /// server is down; failures surface on the first call.
    ///
    /// # Errors
    /// Returns `RagError::Config`/`RagError::Qdrant` if the client cannot be built.
    pub fn new(cfg: RagConfig, provider: Arc<dyn EmbeddingsProvider>) -> Result<Self, RagError> {
        debug!(collection = %cfg.collection, url = %cfg.qdrant_url, "RagStore::new");
        let client = qdrant_facade::QdrantFacade::new(&cfg)?;
        Ok(Self {
            cfg,
            client,
            provider,
        })
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    #[instrument(skip_all, fields(chunks = chunks.len(), collection = %self.cfg.collection))]
    async fn add_inner(&self, chunks: Vec<DocumentChunk>) -> Result<u64, RagError> {
        ingest::add_chunks(&self.cfg, &self.client, self.provider.as_ref(), chunks).await
    }

    #[instrument(skip_all, fields(k = k, mode = ?mode))]
    async fn query_inner(
        &self,
        text: &str,
        k: usize,
        mode: SearchMode,
    ) -> Result<Vec<RetrievedChunk>, RagError> {
        retrieve::query(&self.cfg, &self.client, self.provider.as_ref(), text, k, mode).await
    }
}

impl VectorStore for RagStore {
    fn add<'a>(&'a self, chunks: Vec<DocumentChunk>) -> StoreFuture<'a, u64> {
        Box::pin(self.add_inner(chunks))
    }

    fn query<'a>(
        &'a self,
        text: &'a str,
        k: usize,
        mode: SearchMode,
    ) -> StoreFuture<'a, Vec<RetrievedChunk>> {
        Box::pin(self.query_inner(text, k, mode))
    }
}
