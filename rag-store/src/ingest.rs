//! Write path: resolve vectors → ensure collection → upsert into Qdrant in batches.
//!
//! Payload layout per point: `text` (string) and `metadata` (flat string map).

use crate::config::{RagConfig, VectorSpace};
use crate::embed::EmbeddingsProvider;
use crate::embed_pool::embed_missing;
use crate::errors::RagError;
use crate::qdrant_facade::QdrantFacade;
use crate::record::DocumentChunk;

use qdrant_client::qdrant::{
    PointId, PointStruct, Struct, Value as QValue, Vector, Vectors, value, vectors,
};
use services::uuid::stable_uuid;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Embeds (if needed) and upserts `chunks`, returning the number stored.
pub async fn add_chunks(
    cfg: &RagConfig,
    client: &QdrantFacade,
    provider: &dyn EmbeddingsProvider,
    mut chunks: Vec<DocumentChunk>,
) -> Result<u64, RagError> {
    dedup_in_place(&mut chunks);
    if chunks.is_empty() {
        debug!("no chunks to add");
        return Ok(0);
    }

    embed_missing(&mut chunks, provider, cfg.embedding_dim, cfg.embedding_concurrency).await?;
    let vector_size = determine_vector_size(&chunks, cfg.embedding_dim)?;

    client
        .ensure_collection(&VectorSpace {
            size: vector_size,
            distance: cfg.distance,
        })
        .await?;

    let mut total: u64 = 0;
    for batch in chunks.chunks(cfg.upsert_batch.max(1)) {
        let points = build_points(batch, vector_size)?;
        total += client.upsert_points(points).await?;
    }

    info!(stored = total, "chunks added");
    Ok(total)
}

/// Uses the configured dimension, or the first vector's length.
fn determine_vector_size(
    chunks: &[DocumentChunk],
    expected_dim: Option<usize>,
) -> Result<usize, RagError> {
    let first = chunks
        .iter()
        .find_map(|c| c.embedding.as_ref())
        .ok_or_else(|| RagError::MissingEmbedding(chunks[0].id.clone()))?;
    match expected_dim {
        Some(want) if first.len() != want => Err(RagError::VectorSizeMismatch {
            got: first.len(),
            want,
        }),
        Some(want) => Ok(want),
        None => Ok(first.len()),
    }
}

/// Builds Qdrant points for a batch of embedded chunks.
pub(crate) fn build_points(
    batch: &[DocumentChunk],
    vector_size: usize,
) -> Result<Vec<PointStruct>, RagError> {
    let mut pts = Vec::with_capacity(batch.len());

    for c in batch {
        let vector = c
            .embedding
            .clone()
            .ok_or_else(|| RagError::MissingEmbedding(c.id.clone()))?;
        if vector.len() != vector_size {
            return Err(RagError::VectorSizeMismatch {
                got: vector.len(),
                want: vector_size,
            });
        }

        let mut payload: HashMap<String, QValue> = HashMap::new();
        payload.insert("text".into(), qstring(&c.text));
        payload.insert(
            "metadata".into(),
            QValue {
                kind: Some(value::Kind::StructValue(Struct {
                    fields: c
                        .metadata
                        .iter()
                        .map(|(k, v)| (k.clone(), qstring(v)))
                        .collect(),
                })),
            },
        );

        // Stable point id: re-ingesting the same chunk overwrites it.
        let pid: PointId = stable_uuid(&c.id).to_string().into();

        #[allow(deprecated)]
        let vectors = Vectors {
            vectors_options: Some(vectors::VectorsOptions::Vector(Vector {
                data: vector,
                indices: None,
                vectors_count: None,
                vector: None,
            })),
        };

        pts.push(PointStruct {
            id: Some(pid),
            payload,
            vectors: Some(vectors),
            ..Default::default()
        });
    }

    Ok(pts)
}

/// Wraps a string into Qdrant `Value`.
fn qstring(s: &str) -> QValue {
    QValue {
        kind: Some(value::Kind::StringValue(s.to_string())),
    }
}

/// Drops repeated chunk ids, keeping the first occurrence.
fn dedup_in_place(chunks: &mut Vec<DocumentChunk>) {
    let mut seen: HashSet<String> = HashSet::with_capacity(chunks.len());
    chunks.retain(|c| seen.insert(c.id.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qdrant_facade::qpayload_to_json;
    use std::collections::BTreeMap;

    fn chunk(id: &str, dim: usize) -> DocumentChunk {
        let mut meta = BTreeMap::new();
        meta.insert("source".to_string(), "expenses.csv".to_string());
        DocumentChunk {
            embedding: Some(vec![0.5; dim]),
            ..DocumentChunk::new(id, "Category: Groceries", meta)
        }
    }

    #[test]
    fn points_carry_text_and_metadata() {
        let pts = build_points(&[chunk("a", 3)], 3).unwrap();
        assert_eq!(pts.len(), 1);
        let json = qpayload_to_json(pts[0].payload.clone());
        assert_eq!(json["text"], "Category: Groceries");
        assert_eq!(json["metadata"]["source"], "expenses.csv");
    }

    #[test]
    fn point_ids_are_stable() {
        let a = build_points(&[chunk("a", 3)], 3).unwrap();
        let b = build_points(&[chunk("a", 3)], 3).unwrap();
        assert_eq!(a[0].id, b[0].id);
    }

    #[test]
    fn wrong_dimension_is_rejected() {
        assert!(matches!(
            build_points(&[chunk("a", 2)], 3),
            Err(RagError::VectorSizeMismatch { got: 2, want: 3 })
        ));
    }

    #[test]
    fn duplicate_ids_are_dropped() {
        let mut v = vec![chunk("a", 1), chunk("a", 1), chunk("b", 1)];
        dedup_in_place(&mut v);
        assert_eq!(v.len(), 2);
    }
}
