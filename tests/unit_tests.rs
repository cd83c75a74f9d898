// Unit tests for Summit Match

use summit_match::core::{
    best_chain_score, best_transaction_type, composite_score, get_transaction_type, infer_mandate_score,
    infer_maturity_score, shared_problem_domains, stage_compatibility, value_chain_adjacency_score, VALUE_CHAINS,
};
use summit_match::models::{DimensionScores, Role, ScoringWeights, TransactionType, ValueChainPosition};

const TS: &str = "tokenized_securities";

fn pos(chain: &str, position: &str) -> ValueChainPosition {
    ValueChainPosition::new(chain, position)
}

fn all_positions() -> Vec<(&'static str, &'static str)> {
    VALUE_CHAINS
        .iter()
        .flat_map(|(chain, positions)| positions.iter().map(move |p| (*chain, *p)))
        .collect()
}

#[test]
fn test_adjacency_literals() {
    assert_eq!(value_chain_adjacency_score(TS, "issuance", TS, "custody"), 1.0);
    assert_eq!(value_chain_adjacency_score(TS, "issuance", TS, "settlement"), 0.6);
    assert_eq!(value_chain_adjacency_score(TS, "issuance", TS, "compliance_audit"), 0.3);
    assert_eq!(value_chain_adjacency_score(TS, "custody", TS, "custody"), 0.2);
}

#[test]
fn test_adjacency_unknown_positions_are_neutral() {
    assert_eq!(value_chain_adjacency_score(TS, "minting", TS, "custody"), 0.3);
    assert_eq!(value_chain_adjacency_score("unknown", "a", TS, "custody"), 0.3);
}

#[test]
fn test_adjacency_is_symmetric_over_catalogue() {
    let positions = all_positions();
    for (c1, p1) in &positions {
        for (c2, p2) in &positions {
            assert_eq!(
                value_chain_adjacency_score(c1, p1, c2, p2),
                value_chain_adjacency_score(c2, p2, c1, p1),
                "asymmetric for {}/{} vs {}/{}",
                c1, p1, c2, p2
            );
        }
    }
}

#[test]
fn test_best_chain_score_empty_sides() {
    let some = vec![pos(TS, "custody")];
    assert_eq!(best_chain_score(&[], &some), 0.3);
    assert_eq!(best_chain_score(&some, &[]), 0.3);
    assert_eq!(best_chain_score(&[], &[]), 0.3);
}

#[test]
fn test_best_chain_score_is_optimistic() {
    let a = vec![pos(TS, "issuance"), pos("capital_markets", "exit")];
    let b = vec![pos(TS, "compliance_audit"), pos(TS, "custody")];
    assert_eq!(best_chain_score(&a, &b), 1.0);
}

#[test]
fn test_shared_problem_domains() {
    let shared = shared_problem_domains(&[pos(TS, "custody")], &[pos("defi_infrastructure", "compliance")]);
    assert!(shared.contains("regulatory_compliance"));
    assert!(shared.contains("institutional_trust"));
    assert_eq!(shared.len(), 2);
}

#[test]
fn test_transaction_matrix() {
    assert_eq!(get_transaction_type(Role::Other, Role::Other), None);
    assert_eq!(best_transaction_type(&[Role::Other], &[Role::Other]), None);
    assert_eq!(
        best_transaction_type(&[Role::DeployingCapital], &[Role::RaisingCapital]),
        Some(TransactionType::Investment)
    );
}

#[test]
fn test_transaction_matrix_is_total() {
    for a in Role::ALL {
        for b in Role::ALL {
            // every pair resolves without panicking; `other` never transacts
            let tx = get_transaction_type(a, b);
            if a == Role::Other || b == Role::Other {
                assert_eq!(tx, None);
            }
        }
    }
}

#[test]
fn test_stage_compatibility() {
    assert_eq!(stage_compatibility(TransactionType::Investment, Some("sovereign_fund"), Some("series_b")), 0.9);
    assert_eq!(stage_compatibility(TransactionType::Investment, None, Some("series_b")), 0.5);
    assert_eq!(stage_compatibility(TransactionType::Investment, Some("x"), Some("y")), 0.5);
}

#[test]
fn test_inference_helpers() {
    assert_eq!(infer_mandate_score("Chief Executive (CEO)"), 0.95);
    assert_eq!(infer_mandate_score("Intern"), 0.5);
    assert!((infer_maturity_score(&["Live with 2 customers".to_string()], Some("seed")) - 0.7).abs() < 1e-9);
}

#[test]
fn test_composite_monotonicity() {
    let weights = ScoringWeights::default();
    let base = DimensionScores {
        complementarity: 0.4,
        transaction_readiness: 0.4,
        non_obvious: 0.4,
    };
    let before = composite_score(&base, &weights);

    let bumped = [
        DimensionScores { complementarity: 0.9, ..base },
        DimensionScores { transaction_readiness: 0.9, ..base },
        DimensionScores { non_obvious: 0.9, ..base },
    ];
    for scores in &bumped {
        assert!(composite_score(scores, &weights) >= before);
    }
}
