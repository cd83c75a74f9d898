// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    slugify, AttendeeProfile, ComplementarityWeights, DimensionScores, MatchBriefing, NeedsVector,
    NonObviousParams, NonObviousVariant, ProvidesVector, ReadinessTable, ReadinessWeights, Role,
    ScoredPair, ScoringConfig, ScoringWeights, TicketType, TransactionType, Urgency,
    ValueChainPosition,
};
pub use requests::BriefingsRequest;
pub use responses::{BriefingsResponse, ErrorResponse, HealthResponse, ValueChainView};
