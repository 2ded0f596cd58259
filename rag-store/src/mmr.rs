//! Maximal Marginal Relevance selection over precomputed vectors.

/// Picks up to `k` candidate indices balancing relevance against redundancy.
///
/// The first pick is the candidate most similar to the query; every next pick
/// maximizes `lambda * sim(query, c) - (1 - lambda) * max(sim(c, s))` over the
/// already selected `s`. Indices come back in selection order.
pub fn mmr_select(query: &[f32], candidates: &[Vec<f32>], k: usize, lambda: f32) -> Vec<usize> {
    let k = k.min(candidates.len());
    if k == 0 {
        return Vec::new();
    }

    let relevance: Vec<f32> = candidates.iter().map(|c| cosine(query, c)).collect();
    let mut selected: Vec<usize> = Vec::with_capacity(k);
    let mut remaining: Vec<usize> = (0..candidates.len()).collect();

    while selected.len() < k {
        let mut best: Option<(usize, f32)> = None;
        for (pos, &i) in remaining.iter().enumerate() {
            let redundancy = selected
                .iter()
                .map(|&s| cosine(&candidates[i], &candidates[s]))
                .fold(f32::NEG_INFINITY, f32::max);
            let score = if selected.is_empty() {
                relevance[i]
            } else {
                lambda * relevance[i] - (1.0 - lambda) * redundancy
            };
            // Strict `>` keeps the earlier (closer) candidate on ties.
            if best.is_none_or(|(_, b)| score > b) {
                best = Some((pos, score));
            }
        }
        let Some((pos, _)) = best else { break };
        selected.push(remaining.remove(pos));
    }

    selected
}

/// Cosine similarity; zero vectors are treated as orthogonal to everything.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut na, mut nb) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na.sqrt() * nb.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_pick_is_most_relevant() {
        let q = vec![1.0, 0.0];
        let c = vec![vec![0.5, 0.5], vec![1.0, 0.0], vec![0.0, 1.0]];
        assert_eq!(mmr_select(&q, &c, 1, 0.5)[0], 1);
    }

    #[test]
    fn duplicates_are_pushed_down() {
        let q = vec![1.0, 0.2];
        // 0 and 1 are identical; 2 is different but still somewhat relevant.
        let c = vec![vec![1.0, 0.1], vec![1.0, 0.1], vec![0.3, 1.0]];
        let picked = mmr_select(&q, &c, 2, 0.5);
        assert_eq!(picked, vec![0, 2]);
    }

    #[test]
    fn lambda_one_is_plain_similarity_order() {
        let q = vec![1.0, 0.0];
        let c = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]];
        assert_eq!(mmr_select(&q, &c, 3, 1.0), vec![1, 2, 0]);
    }

    #[test]
    fn k_is_bounded_by_candidates() {
        assert!(mmr_select(&[1.0], &[], 5, 0.5).is_empty());
        assert_eq!(mmr_select(&[1.0], &[vec![1.0]], 5, 0.5), vec![0]);
    }

    #[test]
    fn cosine_handles_zero() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
