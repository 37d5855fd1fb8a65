use crate::stats::{Idf, TermFrequency};
use std::collections::HashMap;

/// Sparse TF-IDF weights keyed by term.
pub type WeightVector = HashMap<String, f64>;

/// Weight each term of `tf` by its IDF. Terms the corpus never saw are
/// dropped rather than stored as zero.
pub fn tfidf(tf: &TermFrequency, idf: &Idf) -> WeightVector {
    tf.iter()
        .filter_map(|(term, &count)| idf.get(term).map(|w| (term.clone(), count as f64 * w)))
        .collect()
}

pub fn magnitude(vector: &WeightVector) -> f64 {
    vector.values().map(|w| w * w).sum::<f64>().sqrt()
}

/// Cosine of the angle between two sparse vectors with precomputed norms.
/// Either norm being zero yields 0.
pub fn cosine_similarity(a: &WeightVector, mag_a: f64, b: &WeightVector, mag_b: f64) -> f64 {
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut dot = 0.0;
    for (term, w) in small {
        if let Some(other) = large.get(term) {
            dot += w * other;
        }
    }
    let sim = dot / (mag_a * mag_b);
    if sim.is_finite() { sim } else { 0.0 }
}
