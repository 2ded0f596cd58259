//! Process-local vector store with brute-force cosine search.
//!
//! Used for offline runs (`VECTOR_BACKEND=memory`) and in tests; contents are
//! lost on exit.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::embed::EmbeddingsProvider;
use crate::embed_pool::embed_missing;
use crate::errors::RagError;
use crate::mmr::{cosine, mmr_select};
use crate::record::{DocumentChunk, RetrievedChunk, SearchMode};
use crate::{StoreFuture, VectorStore};

pub struct MemoryStore {
    provider: Arc<dyn EmbeddingsProvider>,
    rows: RwLock<Vec<(DocumentChunk, Vec<f32>)>>,
}

impl MemoryStore {
    pub fn new(provider: Arc<dyn EmbeddingsProvider>) -> Self {
        Self {
            provider,
            rows: RwLock::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    async fn add_inner(&self, mut chunks: Vec<DocumentChunk>) -> Result<u64, RagError> {
        embed_missing(&mut chunks, self.provider.as_ref(), None, 4).await?;
        let mut batch = Vec::with_capacity(chunks.len());
        for mut c in chunks {
            let v = c
                .embedding
                .take()
                .ok_or_else(|| RagError::MissingEmbedding(c.id.clone()))?;
            batch.push((c, v));
        }

        // The whole batch is checked before any row changes.
        let mut rows = self.rows.write().await;
        let want = rows
            .first()
            .or_else(|| batch.first())
            .map(|(_, v)| v.len());
        if let Some(want) = want {
            if let Some((_, v)) = batch.iter().find(|(_, v)| v.len() != want) {
                return Err(RagError::VectorSizeMismatch {
                    got: v.len(),
                    want,
                });
            }
        }

        let stored = batch.len() as u64;
        for (c, v) in batch {
            // Same id replaces the previous row, like a Qdrant upsert.
            match rows.iter_mut().find(|(r, _)| r.id == c.id) {
                Some(slot) => *slot = (c, v),
                None => rows.push((c, v)),
            }
        }
        debug!(stored, total = rows.len(), "memory store add");
        Ok(stored)
    }

    async fn query_inner(
        &self,
        text: &str,
        k: usize,
        mode: SearchMode,
    ) -> Result<Vec<RetrievedChunk>, RagError> {
        let q = self.provider.embed(text).await?;
        let rows = self.rows.read().await;

        let mut ranked: Vec<(usize, f32)> = rows
            .iter()
            .enumerate()
            .map(|(i, (_, v))| (i, cosine(&q, v)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let picked: Vec<(usize, f32)> = match mode {
            SearchMode::Similarity => ranked.into_iter().take(k).collect(),
            SearchMode::Mmr { fetch_k, lambda } => {
                ranked.truncate(fetch_k.max(k));
                let vecs: Vec<Vec<f32>> = ranked.iter().map(|(i, _)| rows[*i].1.clone()).collect();
                mmr_select(&q, &vecs, k, lambda)
                    .into_iter()
                    .map(|j| ranked[j])
                    .collect()
            }
        };

        Ok(picked
            .into_iter()
            .map(|(i, score)| RetrievedChunk {
                text: rows[i].0.text.clone(),
                metadata: rows[i].0.metadata.clone(),
                score,
            })
            .collect())
    }
}

impl VectorStore for MemoryStore {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::hashing::HashingEmbedder;
    use std::collections::BTreeMap;

    fn store() -> MemoryStore {
        MemoryStore::new(Arc::new(HashingEmbedder::new(128)))
    }

    fn chunk(id: &str, text: &str) -> DocumentChunk {
        DocumentChunk::new(id, text, BTreeMap::new())
    }

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let s = store();
        let out = s.query("anything", 5, SearchMode::default()).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn similarity_returns_best_match_first() {
        let s = store();
        s.add(vec![
            chunk("1", "rent paid in March"),
            chunk("2", "groceries expenses for March"),
            chunk("3", "salary credited"),
        ])
        .await
        .unwrap();
        let out = s.query("groceries expenses", 2, SearchMode::Similarity).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "groceries expenses for March");
    }

    #[tokio::test]
    async fn same_id_overwrites() {
        let s = store();
        s.add(vec![chunk("1", "old")]).await.unwrap();
        s.add(vec![chunk("1", "new")]).await.unwrap();
        assert_eq!(s.len().await, 1);
        let out = s.query("new", 1, SearchMode::Similarity).await.unwrap();
        assert_eq!(out[0].text, "new");
    }

    #[tokio::test]
    async fn mismatched_batch_stores_nothing() {
        let s = store();
        let mut good = chunk("1", "rent");
        good.embedding = Some(vec![0.5; 128]);
        let mut bad = chunk("2", "salary");
        bad.embedding = Some(vec![0.5; 3]);

        let err = s.add(vec![good, bad]).await.unwrap_err();
        assert!(matches!(err, RagError::VectorSizeMismatch { got: 3, want: 128 }));
        assert!(s.is_empty().await);
    }
}
