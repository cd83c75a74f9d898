use crate::core::signals::clamp_unit;
use crate::models::{DimensionScores, ScoringWeights};

/// Weighted sum of the three dimensions, clamped to [0, 1]
///
/// Weights are used as given; they are not renormalized.
pub fn composite_score(scores: &DimensionScores, weights: &ScoringWeights) -> f64 {
    clamp_unit(
        weights.complementarity * scores.complementarity
            + weights.transaction_readiness * scores.transaction_readiness
            + weights.non_obvious * scores.non_obvious,
    )
}
