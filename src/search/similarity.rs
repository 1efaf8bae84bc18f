//! Cosine similarity between a query vector and stacked adviser vectors
//!
//! Scores are in [-1, 1] and are not clamped here; clamping is a ranking
//! decision made by the engine.

use super::store::EmbeddingMatrix;

/// Cosine similarity between two vectors
///
/// Zero-norm inputs and length mismatches score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    cosine_with_norm(a, norm(a), b)
}

/// Similarity of `query` against every row of `matrix`, in row order
pub fn cosine_similarities(query: &[f32], matrix: &EmbeddingMatrix) -> Vec<f32> {
    if query.len() != matrix.dimension() {
        return vec![0.0; matrix.len()];
    }

    let query_norm = norm(query);
    matrix
        .rows()
        .map(|row| cosine_with_norm(query, query_norm, row))
        .collect()
}

// Sums run in f64: squares of any finite f32 neither overflow nor
// underflow to zero there.
fn cosine_with_norm(query: &[f32], query_norm: f64, row: &[f32]) -> f32 {
    let row_norm = norm(row);
    if query_norm > 0.0 && row_norm > 0.0 {
        (dot(query, row) / (query_norm * row_norm)).clamp(-1.0, 1.0) as f32
    } else {
        0.0
    }
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter().zip(b).map(|(&x, &y)| x as f64 * y as f64).sum()
}

fn norm(v: &[f32]) -> f64 {
    v.iter().map(|&x| x as f64 * x as f64).sum::<f64>().sqrt()
}
