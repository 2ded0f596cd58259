//! Runtime and collection configuration.

use std::str::FromStr;

use crate::errors::RagError;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine distance (recommended for most embeddings).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

impl FromStr for DistanceKind {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceKind::Cosine),
            "dot" => Ok(DistanceKind::Dot),
            "euclid" | "l2" => Ok(DistanceKind::Euclid),
            other => Err(RagError::Config(format!("unknown distance '{other}'"))),
        }
    }
}

/// Describes the vector space of the collection.
#[derive(Clone, Debug)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub size: usize,
    /// Distance function.
    pub distance: DistanceKind,
}

/// Configuration for RAG ingestion and retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Upsert batch size (typical range: 128..512).
    pub upsert_batch: usize,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
    /// Expected embedding size; inferred from the first vector when `None`.
    pub embedding_dim: Option<usize>,
    /// Parallel embedding requests during ingestion.
    pub embedding_concurrency: usize,
}

impl RagConfig {
    /// Creates a sane default config for a given collection name and Qdrant endpoint.
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: collection.into(),
            distance: DistanceKind::Cosine,
            upsert_batch: 256,
            exact_search: false,
            embedding_dim: None,
            embedding_concurrency: 4,
        }
    }

    /// Reads the config from environment.
    ///
    /// - `QDRANT_URL` (default `http://localhost:6334`)
    /// - `QDRANT_API_KEY` (optional)
    /// - `QDRANT_COLLECTION` (default `financial_docs`)
    /// - `QDRANT_DISTANCE` (default `cosine`)
    /// - `QDRANT_BATCH_SIZE` (default 256)
    /// - `RAG_EXACT_SEARCH` (default false)
    /// - `EMBEDDING_DIM` (optional)
    /// - `EMBEDDING_CONCURRENCY` (default 4)
    pub fn from_env() -> Result<Self, RagError> {
        let mut cfg = Self::new_default(
            env("QDRANT_URL").unwrap_or_else(|| "http://localhost:6334".into()),
            env("QDRANT_COLLECTION").unwrap_or_else(|| "financial_docs".into()),
        );
        cfg.qdrant_api_key = env("QDRANT_API_KEY");
        if let Some(d) = env("QDRANT_DISTANCE") {
            cfg.distance = d.parse()?;
        }
        if let Some(b) = parse::<usize>("QDRANT_BATCH_SIZE")? {
            cfg.upsert_batch = b;
        }
        if let Some(e) = parse::<bool>("RAG_EXACT_SEARCH")? {
            cfg.exact_search = e;
        }
        cfg.embedding_dim = parse::<usize>("EMBEDDING_DIM")?;
        if let Some(c) = parse::<usize>("EMBEDDING_CONCURRENCY")? {
            cfg.embedding_concurrency = c;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection is empty".into()));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        if self.embedding_dim == Some(0) {
            return Err(RagError::Config("embedding_dim must be > 0".into()));
        }
        Ok(())
    }
}

fn env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse<T: FromStr>(key: &str) -> Result<Option<T>, RagError> {
    match env(key) {
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|_| RagError::Config(format!("{key} has invalid value '{v}'"))),
        None => Ok(None),
    }
}
