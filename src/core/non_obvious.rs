use crate::core::signals::{clamp_unit, semantic_similarity};
use crate::core::value_chain::non_obvious_tag_score;
use crate::models::{AttendeeProfile, NonObviousVariant, ScoringConfig};
use crate::services::EmbeddingStore;

/// Problem-domain statement used for the embedding signal
pub fn problem_domain_text(profile: &AttendeeProfile) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(description) = profile.company_description.as_deref().filter(|d| !d.is_empty()) {
        parts.push(description.to_string());
    }
    if let Some(nv) = &profile.needs_vector {
        parts.push(format!("Key challenges: {}.", nv.primary_need));
    }
    if let Some(pv) = &profile.provides_vector {
        parts.push(format!("Building toward: {}.", pv.primary_capability));
    }

    if parts.is_empty() {
        profile.fallback_text()
    } else {
        parts.join(" ")
    }
}

/// Non-obvious connection score in [0, 1]
pub fn score(a: &AttendeeProfile, b: &AttendeeProfile, config: &ScoringConfig, embeddings: &EmbeddingStore) -> f64 {
    match config.non_obvious.variant {
        NonObviousVariant::TagBlend => tag_blend(a, b, config, embeddings),
        NonObviousVariant::EmbeddingOnly => embedding_only(a, b, config, embeddings),
    }
}

fn tag_blend(a: &AttendeeProfile, b: &AttendeeProfile, config: &ScoringConfig, embeddings: &EmbeddingStore) -> f64 {
    let params = &config.non_obvious;

    let (tag_score, shared) = non_obvious_tag_score(
        &a.value_chain_positions,
        &b.value_chain_positions,
        a.sector(),
        b.sector(),
        params.cross_sector_multiplier,
    );
    let embed_sim = semantic_similarity(embeddings, &problem_domain_text(a), &problem_domain_text(b));

    let result = clamp_unit(params.tag_weight * tag_score + params.embed_weight * embed_sim);

    tracing::debug!(
        "Non-obvious {}<->{}: tags={:.3} (shared={}) embed={:.3} -> {:.3}",
        a.name,
        b.name,
        tag_score,
        if shared.is_empty() { "none".to_string() } else { shared.into_iter().collect::<Vec<_>>().join(",") },
        embed_sim,
        result
    );
    result
}

fn embedding_only(a: &AttendeeProfile, b: &AttendeeProfile, config: &ScoringConfig, embeddings: &EmbeddingStore) -> f64 {
    let params = &config.non_obvious;
    let similarity = semantic_similarity(embeddings, &problem_domain_text(a), &problem_domain_text(b));

    let cross_sector = matches!((a.sector(), b.sector()), (Some(sa), Some(sb)) if sa != sb);
    if cross_sector && similarity > params.novelty_threshold {
        let boosted = clamp_unit(similarity * params.novelty_boost);
        tracing::debug!(
            "Non-obvious {}<->{}: sim={:.3} (cross-sector boost -> {:.3})",
            a.name, b.name, similarity, boosted
        );
        return boosted;
    }

    tracing::debug!(
        "Non-obvious {}<->{}: sim={:.3} (sectors: {:?} / {:?})",
        a.name, b.name, similarity, a.sector(), b.sector()
    );
    clamp_unit(similarity)
}
