use crate::core::signals::{clamp_unit, semantic_similarity};
use crate::core::value_chain::best_chain_score;
use crate::models::{AttendeeProfile, ScoringConfig};
use crate::services::EmbeddingStore;

fn join_or(items: &[String], default: &str) -> String {
    if items.is_empty() {
        default.to_string()
    } else {
        items.join(", ")
    }
}

/// Descriptive sentence for what a profile needs
pub fn needs_text(profile: &AttendeeProfile) -> String {
    match &profile.needs_vector {
        Some(nv) => format!(
            "{}. {} Looking for: {}. Constraints: {}.",
            nv.primary_need,
            nv.need_description,
            nv.target_counterparty_type,
            join_or(&nv.constraints, "none"),
        ),
        None => profile.fallback_text(),
    }
}

/// Descriptive sentence for what a profile provides
pub fn provides_text(profile: &AttendeeProfile) -> String {
    match &profile.provides_vector {
        Some(pv) => format!(
            "{}. {} Evidence: {}. Reach: {}.",
            pv.primary_capability,
            pv.capability_description,
            join_or(&pv.evidence, "none"),
            join_or(&pv.geographic_reach, "global"),
        ),
        None => profile.fallback_text(),
    }
}

/// Complementarity of B for A, in [0, 1]
///
/// Blends mutual needs/provides alignment, value-chain adjacency and a
/// bidirectional term that is boosted only when both directions align.
pub fn score(a: &AttendeeProfile, b: &AttendeeProfile, config: &ScoringConfig, embeddings: &EmbeddingStore) -> f64 {
    let weights = &config.complementarity;

    let ab_alignment = semantic_similarity(embeddings, &needs_text(a), &provides_text(b));
    let ba_alignment = semantic_similarity(embeddings, &needs_text(b), &provides_text(a));
    let avg_alignment = (ab_alignment + ba_alignment) / 2.0;

    let chain_score = best_chain_score(&a.value_chain_positions, &b.value_chain_positions);

    let bidirectional = if ab_alignment > config.bidirectional_threshold
        && ba_alignment > config.bidirectional_threshold
    {
        (avg_alignment * config.bidirectional_boost).min(1.0)
    } else {
        avg_alignment
    };

    let result = clamp_unit(
        weights.needs_provides_alignment * avg_alignment
            + weights.value_chain_adjacency * chain_score
            + weights.bidirectional * bidirectional,
    );

    tracing::debug!(
        "Complementarity {}->{}: align={:.3} chain={:.3} bidir={:.3} -> {:.3}",
        a.name, b.name, avg_alignment, chain_score, bidirectional, result
    );
    result
}
