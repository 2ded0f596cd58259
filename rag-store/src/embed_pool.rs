//! Embedding executor with concurrency and dimension checks.

use crate::{embed::EmbeddingsProvider, errors::RagError, record::DocumentChunk};
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

/// Embeds texts for chunks that have no precomputed vectors.
///
/// # Arguments
/// - `chunks`: mutable slice of [`DocumentChunk`]s.
/// - `provider`: embedding backend.
/// - `expected_dim`: if `Some`, enforces this vector size (error on mismatch).
/// - `concurrency`: maximum number of concurrent embedding tasks.
///
/// # Errors
/// Returns [`RagError::VectorSizeMismatch`] if dimensions mismatch,
/// or the provider error.
pub async fn embed_missing(
    chunks: &mut [DocumentChunk],
    provider: &dyn EmbeddingsProvider,
    expected_dim: Option<usize>,
    concurrency: usize,
) -> Result<(), RagError> {
    let idxs: Vec<usize> = chunks
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.embedding.is_none().then_some(i))
        .collect();

    if idxs.is_empty() {
        debug!("embed_pool::embed_missing: nothing to embed");
        return Ok(());
    }
    info!(
        total = chunks.len(),
        missing = idxs.len(),
        concurrency,
        "embed_pool::embed_missing"
    );

    let results: Vec<(usize, Vec<f32>)> = stream::iter(idxs)
        .map(|i| {
            let text = chunks[i].text.clone();
            async move {
                let v = provider.embed(&text).await?;
                Ok::<(usize, Vec<f32>), RagError>((i, v))
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, RagError>>()?;

    for (i, v) in results {
        if let Some(want) = expected_dim {
            if v.len() != want {
                return Err(RagError::VectorSizeMismatch { got: v.len(), want });
            }
        }
        chunks[i].embedding = Some(v);
    }

    debug!("embed_pool::embed_missing: embeddings filled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::hashing::HashingEmbedder;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn fills_only_missing_vectors() {
        let mut chunks = vec![
            DocumentChunk::new("a", "alpha", BTreeMap::new()),
            DocumentChunk {
                embedding: Some(vec![9.0; 8]),
                ..DocumentChunk::new("b", "beta", BTreeMap::new())
            },
        ];
        embed_missing(&mut chunks, &HashingEmbedder::new(8), Some(8), 2)
            .await
            .unwrap();
        assert_eq!(chunks[0].embedding.as_ref().unwrap().len(), 8);
        assert_eq!(chunks[1].embedding, Some(vec![9.0; 8]));
    }

    #[tokio::test]
    async fn dimension_mismatch_is_reported() {
        let mut chunks = vec![DocumentChunk::new("a", "alpha", BTreeMap::new())];
        let err = embed_missing(&mut chunks, &HashingEmbedder::new(4), Some(8), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::VectorSizeMismatch { got: 4, want: 8 }));
    }
}
