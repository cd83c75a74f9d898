use crate::services::EmbeddingStore;

/// Clamp into [0, 1], mapping NaN to 0
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Cosine similarity of two pre-encoded texts
///
/// A text missing from the store, or a non-finite similarity, degrades to 0.
pub fn semantic_similarity(store: &EmbeddingStore, text_a: &str, text_b: &str) -> f64 {
    match store.similarity(text_a, text_b) {
        Some(similarity) if similarity.is_finite() => similarity,
        Some(similarity) => {
            tracing::warn!("Non-finite embedding similarity ({}), using 0", similarity);
            0.0
        }
        None => {
            tracing::warn!("Embedding not pre-encoded, using 0 for this signal");
            0.0
        }
    }
}
