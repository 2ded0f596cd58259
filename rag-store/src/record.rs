//! Core data models used by the library.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unit of ingested text, immutable once stored.
///
/// `metadata` keys are free-form (`source`, `company`, `year`, `row`, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Stable id; the Qdrant point id is derived from it.
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Precomputed vector, if the caller already has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl DocumentChunk {
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: BTreeMap<String, String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata,
            embedding: None,
        }
    }
}

/// A chunk returned by a query, ranked by the store.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub metadata: BTreeMap<String, String>,
    /// Similarity to the query; only meaningful for ranking.
    pub score: f32,
}

/// How the candidate set is turned into the returned `k` chunks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SearchMode {
    /// Plain top-k by similarity.
    Similarity,
    /// Maximal marginal relevance over `fetch_k` nearest candidates.
    /// `lambda` = 1.0 is pure relevance, 0.0 is pure diversity.
    Mmr { fetch_k: usize, lambda: f32 },
}

impl Default for SearchMode {
    fn default() -> Self {
        SearchMode::Mmr {
            fetch_k: 10,
            lambda: 0.5,
        }
    }
}
