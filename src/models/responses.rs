use serde::{Deserialize, Serialize};
use crate::models::domain::MatchBriefing;

/// Response for the briefings endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingsResponse {
    #[serde(rename = "runId")]
    pub run_id: String,
    pub briefings: Vec<MatchBriefing>,
    #[serde(rename = "totalProfiles")]
    pub total_profiles: usize,
    #[serde(rename = "pairsScored")]
    pub pairs_scored: usize,
    #[serde(rename = "generatedAt")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// One value chain in catalogue order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueChainView {
    pub name: String,
    pub positions: Vec<String>,
}
