//! Vector similarity functions.
//!
//! Pure Rust implementations without external dependencies.

/// Calculate cosine similarity between two vectors.
///
/// Returns value in [-1.0, 1.0] where 1.0 = identical direction. Zero
/// vectors and mismatched dimensions yield 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Normalize a vector to unit length in place.
pub fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in v.iter_mut() {
            *val /= norm;
        }
    }
}

/// Unit-length copies of every row.
pub fn normalize_rows(rows: &[Vec<f32>]) -> Vec<Vec<f32>> {
    rows.iter()
        .map(|row| {
            let mut row = row.clone();
            normalize(&mut row);
            row
        })
        .collect()
}

/// Arithmetic mean of the given vectors, not normalized.
///
/// Returns an empty vector for no input.
pub fn mean_centroid(members: &[&[f32]]) -> Vec<f32> {
    let Some(first) = members.first() else {
        return Vec::new();
    };

    let n = members.len() as f32;
    let mut centroid = vec![0.0f32; first.len()];

    for member in members {
        for (acc, &val) in centroid.iter_mut().zip(member.iter()) {
            *acc += val;
        }
    }

    for val in centroid.iter_mut() {
        *val /= n;
    }

    centroid
}
