use std::collections::BTreeMap;

/// Cosine similarity of two sparse vectors over their shared keys
///
/// Only keys present in both vectors contribute, norms included. Returns 0
/// when the vectors share no key or either restricted norm is zero.
pub fn sparse_cosine<K: Ord>(a: &BTreeMap<K, f64>, b: &BTreeMap<K, f64>) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (key, x) in a {
        if let Some(y) = b.get(key) {
            dot += x * y;
            norm_a += x * x;
            norm_b += y * y;
        }
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Cosine similarity of two dense vectors of equal length
pub fn dense_cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|y| y * y).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
