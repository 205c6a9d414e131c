//! Similarity ranking.
//!
//! An explicit, testable ranking step decoupled from storage: candidates
//! come out of the store with their embeddings and are scored in-process.

use crate::store::ProductCandidate;

/// A candidate with its similarity score against the query embedding.
#[derive(Debug, Clone)]
pub struct ScoredProduct {
    pub id: String,
    pub score: f32,
}

/// Unnormalized dot product. Higher is more relevant.
///
/// A dimensionality mismatch scores 0.0 rather than comparing a partial
/// prefix; embeddings from a different model are not comparable.
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Score every candidate against the query embedding and keep the top `k`,
/// ordered by score descending. Ties break by product id ascending, so the
/// ranking is deterministic run to run.
pub fn rank_top_k(
    candidates: &[ProductCandidate],
    query_embedding: &[f32],
    k: usize,
) -> Vec<ScoredProduct> {
    let mut scored: Vec<ScoredProduct> = candidates
        .iter()
        .map(|candidate| ScoredProduct {
            id: candidate.id.clone(),
            score: dot_product(&candidate.embedding, query_embedding),
        })
        .collect();

    // total_cmp keeps the sort a total order even if a corrupt embedding
    // produces a NaN score.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
    scored.truncate(k);

    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, embedding: Vec<f32>) -> ProductCandidate {
        ProductCandidate {
            id: id.to_string(),
            embedding,
        }
    }

    #[test]
    fn unit_vector_scores() {
        let candidates = vec![
            candidate("P1", vec![1.0, 0.0, 0.0]),
            candidate("P2", vec![0.0, 1.0, 0.0]),
            candidate("P3", vec![0.0, 0.0, 1.0]),
        ];

        let ranked = rank_top_k(&candidates, &[1.0, 0.0, 0.0], 3);

        assert_eq!(ranked[0].id, "P1");
        assert_eq!(ranked[0].score, 1.0);
        assert_eq!(ranked[1].score, 0.0);
        assert_eq!(ranked[2].score, 0.0);
    }

    #[test]
    fn ties_break_by_id_ascending() {
        let candidates = vec![
            candidate("P3", vec![0.0, 1.0]),
            candidate("P1", vec![0.0, 1.0]),
            candidate("P2", vec![0.0, 1.0]),
        ];

        let ranked = rank_top_k(&candidates, &[1.0, 0.0], 3);
        let ids: Vec<&str> = ranked.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2", "P3"]);
    }

    #[test]
    fn ranking_is_deterministic() {
        let candidates = vec![
            candidate("P1", vec![0.5, 0.5]),
            candidate("P2", vec![0.5, 0.5]),
            candidate("P3", vec![0.9, 0.0]),
        ];
        let query = [1.0, 0.0];

        let first = rank_top_k(&candidates, &query, 3);
        for _ in 0..10 {
            let again = rank_top_k(&candidates, &query, 3);
            let a: Vec<&str> = first.iter().map(|s| s.id.as_str()).collect();
            let b: Vec<&str> = again.iter().map(|s| s.id.as_str()).collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn truncates_to_k() {
        let candidates: Vec<ProductCandidate> = (0..10)
            .map(|i| candidate(&format!("P{}", i), vec![i as f32]))
            .collect();

        let ranked = rank_top_k(&candidates, &[1.0], 3);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].id, "P9");
    }

    #[test]
    fn nan_scores_sort_without_panicking() {
        let candidates = vec![
            candidate("P1", vec![f32::NAN]),
            candidate("P2", vec![1.0]),
            candidate("P3", vec![0.5]),
        ];

        let ranked = rank_top_k(&candidates, &[1.0], 3);
        assert_eq!(ranked.len(), 3);

        let p2 = ranked.iter().position(|s| s.id == "P2").unwrap();
        let p3 = ranked.iter().position(|s| s.id == "P3").unwrap();
        assert!(p2 < p3);
    }

    #[test]
    fn dimension_mismatch_scores_zero() {
        assert_eq!(dot_product(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(dot_product(&[], &[]), 0.0);
    }
}
