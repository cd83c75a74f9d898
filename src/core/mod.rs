// Core algorithm exports
pub mod complementarity;
pub mod composite;
pub mod inference;
pub mod matcher;
pub mod non_obvious;
pub mod readiness;
pub mod signals;
pub mod stages;
pub mod transactions;
pub mod value_chain;

#[cfg(test)]
pub(crate) mod test_support;

pub use composite::composite_score;
pub use inference::{infer_audience, infer_capability, infer_geographic_reach, infer_mandate_score, infer_maturity_score};
pub use matcher::{embedding_corpus, MatchResult, Matcher};
pub use stages::stage_compatibility;
pub use transactions::{best_transaction_type, get_transaction_type};
pub use value_chain::{
    all_problem_domains, best_chain_score, is_known_position, non_obvious_tag_score, position_tags,
    shared_problem_domains, value_chain_adjacency_score, VALUE_CHAINS,
};
