//! Similarity ranking
//!
//! Brute-force cosine scan over the candidate set. Degenerate vectors
//! (empty, zero magnitude, mismatched dimensions) score 0 instead of failing.

use std::cmp::Ordering;

use crate::rag::document::{Document, RankedResult};

/// Cosine similarity between two vectors, in [-1, 1].
///
/// Returns 0 when either vector is empty or zero, or when the dimensions differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if similarity.is_finite() {
        similarity.clamp(-1.0, 1.0) as f32
    } else {
        0.0
    }
}

/// Score, filter and order candidates against a query vector.
///
/// Candidates scoring below `threshold` are dropped. The rest are sorted by
/// similarity descending; ties keep their candidate order. At most `limit`
/// results are returned.
pub fn rank(
    query: &[f32],
    candidates: Vec<(Document, Vec<f32>)>,
    threshold: f32,
    limit: usize,
) -> Vec<RankedResult> {
    let mut scored: Vec<RankedResult> = candidates
        .into_iter()
        .map(|(document, embedding)| RankedResult {
            similarity: cosine_similarity(query, &embedding),
            document,
        })
        .filter(|r| r.similarity >= threshold)
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    scored.truncate(limit);
    scored
}
