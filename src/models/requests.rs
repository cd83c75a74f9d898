use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::AttendeeProfile;

/// Request to rank every attendee against every other
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BriefingsRequest {
    #[validate(length(min = 1))]
    pub profiles: Vec<AttendeeProfile>,
    #[serde(default)]
    #[serde(alias = "top_k", rename = "topK")]
    #[validate(range(min = 1, max = 50))]
    pub top_k: Option<u16>,
}
