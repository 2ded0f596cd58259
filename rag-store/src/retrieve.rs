//! Read path: embed the query, search, optionally re-rank with MMR.

use std::collections::BTreeMap;

use crate::config::RagConfig;
use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::mmr::mmr_select;
use crate::qdrant_facade::{QdrantFacade, ScoredHit};
use crate::record::{RetrievedChunk, SearchMode};

use tracing::{debug, trace};

/// Returns up to `k` chunks for `text` according to `mode`.
///
/// # Errors
/// Returns embedding/provider errors or Qdrant failures.
pub async fn query(
    cfg: &RagConfig,
    client: &QdrantFacade,
    provider: &dyn EmbeddingsProvider,
    text: &str,
    k: usize,
    mode: SearchMode,
) -> Result<Vec<RetrievedChunk>, RagError> {
    if k == 0 {
        return Ok(Vec::new());
    }
    let qv = provider.embed(text).await?;

    match mode {
        SearchMode::Similarity => {
            let hits = client.search(qv, k as u64, false, cfg.exact_search).await?;
            Ok(hits.into_iter().map(hit_to_chunk).collect())
        }
        SearchMode::Mmr { fetch_k, lambda } => {
            let fetch_k = fetch_k.max(k);
            let hits = client
                .search(qv.clone(), fetch_k as u64, true, cfg.exact_search)
                .await?;
            trace!(candidates = hits.len(), fetch_k, "mmr candidates fetched");
            rerank_mmr(&qv, hits, k, lambda, provider).await
        }
    }
}

/// Applies MMR to search hits, re-embedding candidates whose vectors were
/// not returned by the store.
pub(crate) async fn rerank_mmr(
    query_vec: &[f32],
    hits: Vec<ScoredHit>,
    k: usize,
    lambda: f32,
    provider: &dyn EmbeddingsProvider,
) -> Result<Vec<RetrievedChunk>, RagError> {
    let mut vecs = Vec::with_capacity(hits.len());
    for h in &hits {
        match &h.vector {
            Some(v) => vecs.push(v.clone()),
            None => vecs.push(provider.embed(payload_text(&h.payload)).await?),
        }
    }

    let order = mmr_select(query_vec, &vecs, k, lambda);
    debug!(selected = order.len(), candidates = hits.len(), lambda, "mmr selection done");

    let mut slots: Vec<Option<ScoredHit>> = hits.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .map(hit_to_chunk)
        .collect())
}

fn payload_text(payload: &serde_json::Value) -> &str {
    payload.get("text").and_then(|v| v.as_str()).unwrap_or_default()
}

/// Maps a raw hit into the public chunk type. Non-string metadata values
/// are rendered as JSON text.
pub(crate) fn hit_to_chunk(h: ScoredHit) -> RetrievedChunk {
    let text = payload_text(&h.payload).to_string();
    let metadata: BTreeMap<String, String> = h
        .payload
        .get("metadata")
        .and_then(|m| m.as_object())
        .map(|m| {
            m.iter()
                .map(|(k, v)| {
                    let s = match v {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), s)
                })
                .collect()
        })
        .unwrap_or_default();
    RetrievedChunk {
        text,
        metadata,
        score: h.score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::hashing::HashingEmbedder;
    use serde_json::json;

    fn hit(text: &str, score: f32, vector: Option<Vec<f32>>) -> ScoredHit {
        ScoredHit {
            score,
            payload: json!({"text": text, "metadata": {"source": "a.pdf", "year": 2024}}),
            vector,
        }
    }

    #[test]
    fn hit_maps_text_and_metadata() {
        let c = hit_to_chunk(hit("hello", 0.9, None));
        assert_eq!(c.text, "hello");
        assert_eq!(c.metadata["source"], "a.pdf");
        assert_eq!(c.metadata["year"], "2024");
    }

    #[tokio::test]
    async fn mmr_reembeds_when_vectors_missing() {
        let emb = HashingEmbedder::new(256);
        let q = emb.embed_sync("groceries budget");
        let hits = vec![
            hit("groceries budget", 0.9, None),
            hit("groceries budget", 0.9, None),
            hit("rent payment", 0.2, None),
        ];
        let out = rerank_mmr(&q, hits, 2, 0.3, &emb).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "groceries budget");
        assert_eq!(out[1].text, "rent payment");
    }
}
