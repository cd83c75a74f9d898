//! Summit Match - counterparty matching engine for event attendees
//!
//! This library scores every ordered pair of attendees on complementarity,
//! transaction readiness and non-obvious overlap, then returns a ranked
//! top-K briefing per attendee.

pub mod config;
pub mod core;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{Matcher, MatchResult, value_chain::value_chain_adjacency_score};
pub use models::{AttendeeProfile, MatchBriefing, ScoredPair, ScoringConfig, ScoringWeights};
pub use pipeline::{MatchPipeline, RunOutcome};
pub use progress::{NoProgress, ProgressSink, Stage};
