/// Cosine similarity in `[-1, 1]`; `0.0` if either vector has zero norm or
/// the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Mean pairwise cosine distance (`1 - cos`) scaled to 0–100.
///
/// Fewer than two vectors have no pairs and score `0.0`.
pub fn mean_pairwise_distance(vectors: &[&[f32]]) -> f64 {
    let n = vectors.len();
    if n < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            total += 1.0 - cosine_similarity(vectors[i], vectors[j]);
        }
    }
    let pairs = (n * (n - 1) / 2) as f64;
    total / pairs * 100.0
}

/// Arithmetic mean; `0.0` for an empty iterator.
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
