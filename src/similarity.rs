//! Dot-product similarity over dense float vectors.
//!
//! Every embedding in this crate is L2-normalized when it is produced, so cosine
//! similarity reduces to a plain dot product. Nothing here renormalizes; callers
//! that need the cosine contract must hand in unit vectors.

/// Dot product of two equal-length vectors.
///
/// For unit-norm inputs this is the cosine similarity, a value in `[-1, 1]`.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Multiply each row of `rows` by `v`, producing one similarity per row.
pub fn matvec(rows: &[Vec<f32>], v: &[f32]) -> Vec<f32> {
    rows.iter().map(|row| dot(row, v)).collect()
}

/// Scale `v` to unit L2 norm in place.
///
/// Zero vectors are left untouched so degenerate provider output cannot
/// introduce NaNs downstream.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|value| value * value).sum::<f32>().sqrt();

    if norm > 0.0 {
        for value in v.iter_mut() {
            *value /= norm;
        }
    }
}
