//! Cosine similarity over example embeddings.

use std::cmp::Ordering;

use crate::corpus::EmbeddedExample;

/// Cosine similarity between two vectors, accumulated in f64.
/// Returns `None` when the vectors differ in length, are empty, or either
/// norm is zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return None;
    }

    Some(dot / denom)
}

/// Scores every example against `query`, most similar first.
/// Unscorable examples rank last; ties keep corpus order (stable sort).
pub fn rank_by_similarity(examples: &[EmbeddedExample], query: &[f32]) -> Vec<(usize, f64)> {
    let mut scored: Vec<(usize, f64)> = examples
        .iter()
        .enumerate()
        .map(|(index, example)| {
            let score = cosine_similarity(&example.embedding, query).unwrap_or(f64::NEG_INFINITY);
            (index, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn example(text: &str, embedding: Vec<f32>) -> EmbeddedExample {
        EmbeddedExample {
            text: text.to_string(),
            embedding,
        }
    }

    #[test]
    fn test_identical_vectors_score_one() {
        let similarity = cosine_similarity(&[0.5, 0.3, 0.2], &[0.5, 0.3, 0.2]).unwrap();
        assert!(
            (similarity - 1.0).abs() < EPSILON,
            "expected ~1.0, got {similarity}"
        );
    }

    #[test]
    fn test_orthogonal_vectors_score_zero() {
        let similarity = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(similarity.abs() < EPSILON);
    }

    #[test]
    fn test_opposite_vectors_score_negative_one() {
        let similarity = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!((similarity + 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_length_mismatch_is_none() {
        assert!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn test_empty_vectors_are_none() {
        assert!(cosine_similarity(&[], &[]).is_none());
    }

    #[test]
    fn test_zero_vector_is_none() {
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).is_none());
    }

    #[test]
    fn test_scale_invariance() {
        let base = cosine_similarity(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
        let scaled = cosine_similarity(&[3.0, 6.0, 9.0], &[4.0, 5.0, 6.0]).unwrap();
        assert!(
            (base - scaled).abs() < EPSILON,
            "positive scaling changed the similarity: {base} vs {scaled}"
        );
    }

    #[test]
    fn test_rank_most_similar_first() {
        let examples = vec![
            example("off-topic", vec![0.0, 1.0]),
            example("on-topic", vec![1.0, 0.0]),
        ];

        let ranked = rank_by_similarity(&examples, &[1.0, 0.0]);
        assert_eq!(ranked[0].0, 1, "the aligned example should rank first");
        assert!((ranked[0].1 - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_rank_ties_keep_corpus_order() {
        let examples = vec![
            example("first", vec![1.0, 0.0]),
            example("second", vec![1.0, 0.0]),
            example("third", vec![2.0, 0.0]),
        ];

        let ranked = rank_by_similarity(&examples, &[1.0, 0.0]);
        let order: Vec<usize> = ranked.iter().map(|(index, _)| *index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_rank_unscorable_examples_last() {
        let examples = vec![
            example("wrong dims", vec![1.0, 0.0, 0.0]),
            example("scorable", vec![0.5, 0.5]),
        ];

        let ranked = rank_by_similarity(&examples, &[1.0, 0.0]);
        assert_eq!(ranked.last().unwrap().0, 0);
        assert_eq!(ranked.last().unwrap().1, f64::NEG_INFINITY);
    }
}
