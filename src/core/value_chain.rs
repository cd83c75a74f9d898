//! Value-chain catalogue and problem-domain tags.
//!
//! Each chain is an ordered list of industry positions. The distance between
//! two positions on the same chain measures how complementary they are, and
//! the tags attached to each position expose overlap across chains.

use crate::models::ValueChainPosition;
use std::collections::BTreeSet;

/// Score used whenever there is not enough data to compare positions
pub const NEUTRAL_CHAIN_SCORE: f64 = 0.3;

/// Ordered positions for every known chain
pub const VALUE_CHAINS: &[(&str, &[&str])] = &[
    (
        "tokenized_securities",
        &["issuance", "custody", "settlement", "distribution", "compliance_audit"],
    ),
    (
        "defi_infrastructure",
        &["protocol", "scaling_l1_l2", "interoperability", "wallet_access", "compliance"],
    ),
    (
        "institutional_adoption",
        &["regulatory_framework", "sandbox", "pilot", "production", "scale"],
    ),
    (
        "capital_markets",
        &["fund_formation", "deal_sourcing", "due_diligence", "portfolio_management", "exit"],
    ),
];

/// Problem-domain tags per (chain, position)
const POSITION_TAGS: &[(&str, &str, &[&str])] = &[
    ("tokenized_securities", "issuance", &["market_structure", "regulatory_compliance", "asset_origination"]),
    ("tokenized_securities", "custody", &["institutional_trust", "asset_safeguarding", "regulatory_compliance"]),
    ("tokenized_securities", "settlement", &["settlement_finality", "cross_border_interop", "institutional_trust"]),
    ("tokenized_securities", "distribution", &["market_structure", "cross_border_interop", "investor_access"]),
    ("tokenized_securities", "compliance_audit", &["regulatory_compliance", "identity_access", "institutional_trust"]),
    ("defi_infrastructure", "protocol", &["protocol_design", "settlement_finality", "throughput_scaling"]),
    ("defi_infrastructure", "scaling_l1_l2", &["throughput_scaling", "settlement_finality", "institutional_trust"]),
    ("defi_infrastructure", "interoperability", &["cross_border_interop", "settlement_finality", "protocol_design"]),
    ("defi_infrastructure", "wallet_access", &["identity_access", "investor_access", "user_onboarding"]),
    ("defi_infrastructure", "compliance", &["regulatory_compliance", "identity_access", "institutional_trust"]),
    ("institutional_adoption", "regulatory_framework", &["regulatory_compliance", "market_structure", "institutional_trust"]),
    ("institutional_adoption", "sandbox", &["regulatory_compliance", "market_validation", "institutional_trust"]),
    ("institutional_adoption", "pilot", &["market_validation", "institutional_trust", "throughput_scaling"]),
    ("institutional_adoption", "production", &["institutional_trust", "settlement_finality", "asset_safeguarding"]),
    ("institutional_adoption", "scale", &["cross_border_interop", "throughput_scaling", "investor_access"]),
    ("capital_markets", "fund_formation", &["market_structure", "regulatory_compliance", "investor_access"]),
    ("capital_markets", "deal_sourcing", &["market_validation", "investor_access", "asset_origination"]),
    ("capital_markets", "due_diligence", &["institutional_trust", "regulatory_compliance", "market_validation"]),
    ("capital_markets", "portfolio_management", &["asset_safeguarding", "institutional_trust", "cross_border_interop"]),
    ("capital_markets", "exit", &["market_structure", "investor_access", "cross_border_interop"]),
];

/// Positions of a chain in order, `None` if the chain is unknown
pub fn chain_positions(chain: &str) -> Option<&'static [&'static str]> {
    VALUE_CHAINS
        .iter()
        .find(|(name, _)| *name == chain)
        .map(|(_, positions)| *positions)
}

/// Index of a position within its chain
pub fn position_index(chain: &str, position: &str) -> Option<usize> {
    chain_positions(chain)?.iter().position(|p| *p == position)
}

pub fn is_known_position(chain: &str, position: &str) -> bool {
    position_index(chain, position).is_some()
}

/// Tags for a position; empty when the position is unknown
pub fn position_tags(chain: &str, position: &str) -> BTreeSet<&'static str> {
    POSITION_TAGS
        .iter()
        .find(|(c, p, _)| *c == chain && *p == position)
        .map(|(_, _, tags)| tags.iter().copied().collect())
        .unwrap_or_default()
}

/// Every problem-domain tag in the catalogue
pub fn all_problem_domains() -> BTreeSet<&'static str> {
    POSITION_TAGS
        .iter()
        .flat_map(|(_, _, tags)| tags.iter().copied())
        .collect()
}

fn union_tags(positions: &[ValueChainPosition]) -> BTreeSet<&'static str> {
    positions
        .iter()
        .flat_map(|p| position_tags(p.chain(), p.position()))
        .collect()
}

/// Tags present on both sides (union per side, then intersection)
pub fn shared_problem_domains(
    positions_a: &[ValueChainPosition],
    positions_b: &[ValueChainPosition],
) -> BTreeSet<&'static str> {
    let tags_a = union_tags(positions_a);
    let tags_b = union_tags(positions_b);
    tags_a.intersection(&tags_b).copied().collect()
}

/// Jaccard overlap of problem domains, boosted when sectors differ
///
/// Returns the score together with the shared tags.
pub fn non_obvious_tag_score(
    positions_a: &[ValueChainPosition],
    positions_b: &[ValueChainPosition],
    sector_a: Option<&str>,
    sector_b: Option<&str>,
    cross_sector_multiplier: f64,
) -> (f64, BTreeSet<&'static str>) {
    let tags_a = union_tags(positions_a);
    let tags_b = union_tags(positions_b);
    let shared: BTreeSet<&'static str> = tags_a.intersection(&tags_b).copied().collect();

    if shared.is_empty() {
        return (0.0, shared);
    }

    let union_len = tags_a.union(&tags_b).count();
    let mut score = if union_len > 0 {
        shared.len() as f64 / union_len as f64
    } else {
        0.0
    };

    if let (Some(a), Some(b)) = (sector_a, sector_b) {
        if a != b {
            score = (score * cross_sector_multiplier).min(1.0);
        }
    }

    (score, shared)
}

/// Complementarity of two positions
///
/// Same chain: adjacent positions score highest, identical ones lowest.
/// Different chains: fall back to tag overlap.
pub fn value_chain_adjacency_score(chain_a: &str, pos_a: &str, chain_b: &str, pos_b: &str) -> f64 {
    if chain_a != chain_b {
        let tags_a = position_tags(chain_a, pos_a);
        let tags_b = position_tags(chain_b, pos_b);
        if tags_a.is_empty() || tags_b.is_empty() {
            return NEUTRAL_CHAIN_SCORE;
        }
        return match tags_a.intersection(&tags_b).count() {
            0 => 0.2,
            1 => 0.5,
            _ => 0.8,
        };
    }

    let (Some(idx_a), Some(idx_b)) = (position_index(chain_a, pos_a), position_index(chain_b, pos_b)) else {
        return NEUTRAL_CHAIN_SCORE;
    };

    match idx_a.abs_diff(idx_b) {
        0 => 0.2,
        1 => 1.0,
        2 => 0.6,
        _ => 0.3,
    }
}

/// Best adjacency over the full cross-product of both sides' positions
pub fn best_chain_score(positions_a: &[ValueChainPosition], positions_b: &[ValueChainPosition]) -> f64 {
    if positions_a.is_empty() || positions_b.is_empty() {
        return NEUTRAL_CHAIN_SCORE;
    }

    positions_a
        .iter()
        .flat_map(|a| {
            positions_b.iter().map(move |b| {
                value_chain_adjacency_score(a.chain(), a.position(), b.chain(), b.position())
            })
        })
        .fold(0.0, f64::max)
}
