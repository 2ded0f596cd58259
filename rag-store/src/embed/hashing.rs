//! Deterministic feature-hashing embedder.
//!
//! Maps lowercase alphanumeric tokens into a fixed number of buckets. It has
//! no semantic knowledge but shares vocabulary-overlap behaviour with real
//! embeddings, which is enough for offline runs and tests.

use std::{future::Future, pin::Pin};

use crate::{EmbeddingsProvider, RagError};

#[derive(Clone, Debug)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            v[(fnv1a(token.as_bytes()) % self.dim as u64) as usize] += 1.0;
        }
        v
    }
}

impl EmbeddingsProvider for HashingEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.embed_sync(text)) })
    }
}

/// FNV-1a, stable across platforms and releases (unlike `DefaultHasher`).
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        h ^= u64::from(*b);
        h = h.wrapping_mul(0x0100_0000_01b3);
    }
    h
}
