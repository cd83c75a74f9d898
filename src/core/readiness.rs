use std::collections::HashSet;

use crate::core::inference::{infer_mandate_score, infer_maturity_score};
use crate::core::signals::clamp_unit;
use crate::core::stages::stage_compatibility;
use crate::core::transactions::best_transaction_type;
use crate::models::{AttendeeProfile, ScoringConfig, TransactionType, Urgency};

const RULE_WEIGHT: f64 = 0.7;
const STAGE_WEIGHT: f64 = 0.3;

/// Sub-signals behind a readiness score, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadinessSignals {
    pub mandate: f64,
    pub fit: f64,
    pub maturity: f64,
    pub alignment: f64,
}

impl ReadinessSignals {
    pub fn compute(a: &AttendeeProfile, b: &AttendeeProfile) -> Self {
        Self {
            mandate: mandate(a, b),
            fit: fit(a, b),
            maturity: (infer_maturity_score(&a.key_facts, a.stage()) + infer_maturity_score(&b.key_facts, b.stage()))
                / 2.0,
            alignment: alignment(a, b),
        }
    }
}

fn mandate(a: &AttendeeProfile, b: &AttendeeProfile) -> f64 {
    let authority = (infer_mandate_score(&a.title) + infer_mandate_score(&b.title)) / 2.0;
    let urgency_bonus = match a.needs_vector.as_ref().map(|nv| nv.urgency) {
        Some(Urgency::Active) => 0.1,
        Some(Urgency::Exploring) => 0.05,
        _ => 0.0,
    };
    (authority + urgency_bonus).min(1.0)
}

fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase().split_whitespace().map(str::to_string).collect()
}

fn fit(a: &AttendeeProfile, b: &AttendeeProfile) -> f64 {
    let mut fit = 0.5;

    if let (Some(nv), Some(pv)) = (&a.needs_vector, &b.provides_vector) {
        let target = word_set(&nv.target_counterparty_type);
        let capability = word_set(&pv.primary_capability);
        match target.intersection(&capability).count() {
            0 => {}
            1 => fit += 0.15,
            _ => fit += 0.3,
        }
    }

    match (a.sector(), b.sector()) {
        (Some(sa), Some(sb)) if sa == sb => fit += 0.15,
        (Some(_), Some(_)) => fit += 0.05,
        _ => {}
    }

    f64::min(fit, 1.0)
}

fn alignment(a: &AttendeeProfile, b: &AttendeeProfile) -> f64 {
    let mut alignment = 0.4;

    if let (Some(sa), Some(sb)) = (a.sector(), b.sector()) {
        if sa == sb {
            alignment += 0.2;
        }
    }

    if let (Some(pa), Some(pb)) = (&a.provides_vector, &b.provides_vector) {
        let reach_a: HashSet<&str> = pa.geographic_reach.iter().map(String::as_str).collect();
        let reach_b: HashSet<&str> = pb.geographic_reach.iter().map(String::as_str).collect();
        let overlap: HashSet<&str> = reach_a.intersection(&reach_b).copied().collect();

        if !overlap.is_empty() {
            alignment += if overlap.contains("global") { 0.1 } else { 0.2 };
        }
    }

    f64::min(alignment, 1.0)
}

/// Readiness of A and B to transact, with the transaction type they would form
///
/// Short-circuits to `(0.0, None)` when no role pair maps to a transaction.
pub fn score(a: &AttendeeProfile, b: &AttendeeProfile, config: &ScoringConfig) -> (f64, Option<TransactionType>) {
    match best_transaction_type(&a.roles(), &b.roles()) {
        Some(tx_type) => (score_for(a, b, tx_type, config), Some(tx_type)),
        None => {
            tracing::debug!("No transaction type for {}->{}", a.name, b.name);
            (0.0, None)
        }
    }
}

/// Readiness for an already-resolved transaction type
pub fn score_for(a: &AttendeeProfile, b: &AttendeeProfile, tx_type: TransactionType, config: &ScoringConfig) -> f64 {
    let signals = ReadinessSignals::compute(a, b);
    let weights = config.readiness.weights_for(tx_type);

    let rule_score = weights.mandate * signals.mandate
        + weights.fit * signals.fit
        + weights.maturity * signals.maturity
        + weights.alignment * signals.alignment;

    let stage_score = stage_compatibility(tx_type, a.stage(), b.stage());
    let result = clamp_unit(RULE_WEIGHT * rule_score + STAGE_WEIGHT * stage_score);

    tracing::debug!(
        "Transaction-readiness {}->{} ({}): mandate={:.2} fit={:.2} maturity={:.2} align={:.2} stage={:.2} -> {:.3}",
        a.name, b.name, tx_type, signals.mandate, signals.fit, signals.maturity, signals.alignment, stage_score, result
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NeedsVector, ProvidesVector, Role};

    fn investor() -> AttendeeProfile {
        let mut p = AttendeeProfile::new("Ines", "Managing Partner", "Northwind Growth");
        p.roles_at_event = vec![Role::DeployingCapital];
        p.stage = Some("growth_vc".into());
        p.sector = Some("venture_capital".into());
        p
    }

    fn founder() -> AttendeeProfile {
        let mut p = AttendeeProfile::new("Felix", "CEO", "Tokenly");
        p.roles_at_event = vec![Role::RaisingCapital];
        p.stage = Some("series_b".into());
        p.sector = Some("tokenization".into());
        p
    }

    fn needs(target: &str, urgency: Urgency) -> NeedsVector {
        NeedsVector {
            primary_need: "capital".into(),
            need_description: String::new(),
            target_counterparty_type: target.into(),
            urgency,
            constraints: vec![],
        }
    }

    fn provides(capability: &str, reach: &[&str]) -> ProvidesVector {
        ProvidesVector {
            primary_capability: capability.into(),
            capability_description: String::new(),
            evidence: vec![],
            geographic_reach: reach.iter().map(|s| s.to_string()).collect(),
            audience_access: vec![],
        }
    }

    #[test]
    fn test_no_transaction_short_circuits() {
        let config = ScoringConfig::default();
        let a = AttendeeProfile::new("A", "CEO", "X");
        let b = AttendeeProfile::new("B", "CEO", "Y");
        assert_eq!(score(&a, &b, &config), (0.0, None));
    }

    #[test]
    fn test_investment_pair() {
        let config = ScoringConfig::default();
        let (s, tx) = score(&investor(), &founder(), &config);
        assert_eq!(tx, Some(TransactionType::Investment));
        assert!(s > 0.0 && s <= 1.0);
    }

    #[test]
    fn test_investment_pair_exact_value() {
        let config = ScoringConfig::default();
        let a = investor();
        let b = founder();
        let signals = ReadinessSignals::compute(&a, &b);

        // partner 0.8, ceo 0.95, no needs vector
        assert!((signals.mandate - 0.875).abs() < 1e-9);
        // different but present sectors
        assert!((signals.fit - 0.55).abs() < 1e-9);
        // growth_vc and series_b both carry late-stage markers
        assert!((signals.maturity - 0.7).abs() < 1e-9);
        assert!((signals.alignment - 0.4).abs() < 1e-9);

        let rule = 0.30 * 0.875 + 0.30 * 0.55 + 0.25 * 0.7 + 0.15 * 0.4;
        let expected = 0.7 * rule + 0.3 * 0.95;
        assert!((score_for(&a, &b, TransactionType::Investment, &config) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_urgency_bonus() {
        let b = founder();
        let mut a = investor();
        let base = mandate(&a, &b);

        a.needs_vector = Some(needs("startup", Urgency::Active));
        assert!((mandate(&a, &b) - (base + 0.1)).abs() < 1e-9);

        a.needs_vector = Some(needs("startup", Urgency::Exploring));
        assert!((mandate(&a, &b) - (base + 0.05)).abs() < 1e-9);

        a.needs_vector = Some(needs("startup", Urgency::Passive));
        assert!((mandate(&a, &b) - base).abs() < 1e-9);
    }

    #[test]
    fn test_fit_word_overlap() {
        let mut a = AttendeeProfile::new("A", "CEO", "X");
        let mut b = AttendeeProfile::new("B", "CEO", "Y");
        assert!((fit(&a, &b) - 0.5).abs() < 1e-9);

        a.needs_vector = Some(needs("Custody Provider", Urgency::Passive));
        b.provides_vector = Some(provides("custody", &[]));
        assert!((fit(&a, &b) - 0.65).abs() < 1e-9);

        b.provides_vector = Some(provides("custody provider for banks", &[]));
        assert!((fit(&a, &b) - 0.8).abs() < 1e-9);

        a.sector = Some("fintech".into());
        b.sector = Some("fintech".into());
        assert!((fit(&a, &b) - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_alignment_geography() {
        let mut a = AttendeeProfile::new("A", "CEO", "X");
        let mut b = AttendeeProfile::new("B", "CEO", "Y");

        a.provides_vector = Some(provides("x", &["europe", "global"]));
        b.provides_vector = Some(provides("y", &["europe"]));
        assert!((alignment(&a, &b) - 0.6).abs() < 1e-9);

        b.provides_vector = Some(provides("y", &["global"]));
        assert!((alignment(&a, &b) - 0.5).abs() < 1e-9);

        b.provides_vector = Some(provides("y", &["apac"]));
        assert!((alignment(&a, &b) - 0.4).abs() < 1e-9);

        // overlap containing global alongside a region gets partial credit
        b.provides_vector = Some(provides("y", &["europe", "global"]));
        assert!((alignment(&a, &b) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unlisted_type_uses_fallback_weights() {
        let config = ScoringConfig::default();
        let a = AttendeeProfile::new("A", "CEO", "X");
        let b = AttendeeProfile::new("B", "CEO", "Y");
        let s = score_for(&a, &b, TransactionType::Regulatory, &config);

        let signals = ReadinessSignals::compute(&a, &b);
        let rule = 0.25 * (signals.mandate + signals.fit + signals.maturity + signals.alignment);
        assert!((s - (0.7 * rule + 0.3 * 0.5)).abs() < 1e-9);
    }
}
