//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind a minimal API,
//! hiding away the verbose builder pattern and keeping the rest of the
//! application decoupled from `qdrant-client`.

use crate::config::{DistanceKind, RagConfig, VectorSpace};
use crate::errors::RagError;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, ScoredPoint, SearchParamsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QValue, VectorParamsBuilder, VectorsOutput,
};
use tracing::{debug, info, warn};

/// A search hit converted out of Qdrant types.
#[derive(Debug, Clone)]
pub struct ScoredHit {
    pub score: f32,
    pub payload: serde_json::Value,
    /// Stored dense vector, when requested and available.
    pub vector: Option<Vec<f32>>,
}

/// A facade over the Qdrant client to keep the rest of the code clean and stable.
///
/// This struct encapsulates:
/// - The underlying Qdrant client.
/// - The target collection name.
/// - The distance function used in the vector space.
pub struct QdrantFacade {
    pub(crate) client: Qdrant,
    pub(crate) collection: String,
    distance: DistanceKind,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// Uses the modern builder-based API of `qdrant-client` and supports
    /// optional API key authentication.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?; // Early validation of config.

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            distance: cfg.distance,
        })
    }

    /// Ensures that the collection exists in Qdrant.
    ///
    /// - If the collection already exists → no-op.
    /// - If missing → creates it with the given vector space configuration.
    pub async fn ensure_collection(&self, space: &VectorSpace) -> Result<(), RagError> {
        debug!(
            collection = %self.collection,
            size = space.size,
            distance = ?self.distance,
            "ensuring collection"
        );

        // Try to fetch collection info first.
        match self.client.collection_info(&self.collection).await {
            Ok(_) => {
                debug!("Collection '{}' already exists", self.collection);
                return Ok(());
            }
            Err(err) => {
                warn!(
                    collection = %self.collection,
                    error = %err,
                    "collection not found, will be created"
                );
            }
        }

        let distance = match self.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };

        // Create collection with vector configuration.
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(space.size as u64, distance)),
            )
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        info!(collection = %self.collection, "collection created");
        Ok(())
    }

    /// Upserts (inserts or updates) a batch of points into the collection.
    ///
    /// Returns the number of points sent (the call waits for Qdrant to apply them).
    pub async fn upsert_points(&self, points: Vec<PointStruct>) -> Result<u64, RagError> {
        if points.is_empty() {
            debug!("No points provided for upsert");
            return Ok(0);
        }

        let n = points.len() as u64;
        info!(collection = %self.collection, points = n, "upserting points");

        let res = self
            .client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        debug!("Upsert operation result={:?}", res.result);
        Ok(n)
    }

    /// Performs a similarity search in Qdrant.
    ///
    /// Returns hits sorted by score. Stored vectors are included when
    /// `with_vectors` is set (needed for MMR re-ranking).
    pub async fn search(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        with_vectors: bool,
        exact: bool,
    ) -> Result<Vec<ScoredHit>, RagError> {
        debug!(
            collection = %self.collection,
            top_k,
            with_vectors,
            exact,
            "searching"
        );

        let mut builder = SearchPointsBuilder::new(&self.collection, vector, top_k)
            .with_payload(true)
            .with_vectors(with_vectors);

        if exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        let out: Vec<ScoredHit> = res.result.into_iter().map(scored_to_hit).collect();

        debug!(hits = out.len(), "search completed");
        Ok(out)
    }
}

fn scored_to_hit(p: ScoredPoint) -> ScoredHit {
    ScoredHit {
        score: p.score,
        vector: p.vectors.and_then(dense_vector),
        payload: qpayload_to_json(p.payload),
    }
}

/// Extracts the unnamed dense vector from a search result.
fn dense_vector(v: VectorsOutput) -> Option<Vec<f32>> {
    use qdrant_client::qdrant::vector_output::Vector as V;
    use qdrant_client::qdrant::vectors_output::VectorsOptions;

    match v.vectors_options? {
        VectorsOptions::Vector(out) => match out.vector {
            Some(V::Dense(d)) => Some(d.data),
            Some(_) => None,
            #[allow(deprecated)]
            None => (!out.data.is_empty()).then_some(out.data),
        },
        VectorsOptions::Vectors(_) => None,
    }
}

/// Converts a Qdrant payload (`HashMap<String, qdrant::Value>`) into JSON.
pub(crate) fn qpayload_to_json(p: std::collections::HashMap<String, QValue>) -> serde_json::Value {
    serde_json::Value::Object(p.into_iter().map(|(k, v)| (k, qvalue_to_json(v))).collect())
}

fn qvalue_to_json(v: QValue) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    match v.kind {
        Some(K::StringValue(s)) => serde_json::Value::String(s),
        Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
        Some(K::DoubleValue(f)) => serde_json::json!(f),
        Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(K::StructValue(s)) => qpayload_to_json(s.fields),
        Some(K::ListValue(l)) => {
            serde_json::Value::Array(l.values.into_iter().map(qvalue_to_json).collect())
        }
        Some(K::NullValue(_)) | None => serde_json::Value::Null,
    }
}
