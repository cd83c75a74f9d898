use crate::models::TransactionType;

/// Score for any stage pair the rules do not cover
pub const NEUTRAL_STAGE_SCORE: f64 = 0.5;

/// How well two maturity stages suit a transaction type
///
/// Missing stages and unlisted pairs are neutral, never penalized.
pub fn stage_compatibility(tx_type: TransactionType, stage_a: Option<&str>, stage_b: Option<&str>) -> f64 {
    let (Some(a), Some(b)) = (stage_a, stage_b) else {
        return NEUTRAL_STAGE_SCORE;
    };
    if a.is_empty() || b.is_empty() {
        return NEUTRAL_STAGE_SCORE;
    }

    use TransactionType as Tx;
    match (tx_type, a, b) {
        (Tx::Investment, "sovereign_fund", "series_b") => 0.9,
        (Tx::Investment, "sovereign_fund", "pre_product") => 0.1,
        (Tx::Investment, "growth_vc", "series_b") => 0.95,
        (Tx::Investment, "growth_vc", "seed") => 0.3,
        (Tx::Investment, "seed_fund", "seed") => 0.9,
        (Tx::Investment, "seed_fund", "series_b") => 0.4,

        (Tx::Fundraising, "series_b", "sovereign_fund") => 0.9,
        (Tx::Fundraising, "series_b", "growth_vc") => 0.95,
        (Tx::Fundraising, "seed", "seed_fund") => 0.9,
        (Tx::Fundraising, "seed", "growth_vc") => 0.3,

        (Tx::CoInvestment, "sovereign_fund", "growth_vc") => 0.8,
        (Tx::CoInvestment, "growth_vc", "sovereign_fund") => 0.8,
        (Tx::CoInvestment, "growth_vc", "growth_vc") => 0.7,

        (Tx::Regulatory, "central_bank", "growth_startup") => 0.8,
        (Tx::Regulatory, "central_bank", "pre_product") => 0.4,

        (Tx::Partnership, "growth_startup", "growth_startup") => 0.7,

        _ => NEUTRAL_STAGE_SCORE,
    }
}
