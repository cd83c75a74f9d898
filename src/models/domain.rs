use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Canonical role an attendee plays at the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    DeployingCapital,
    RaisingCapital,
    ExploringPartnerships,
    SeekingTechnology,
    RegulatoryPolicy,
    MediaContent,
    Other,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::DeployingCapital,
        Role::RaisingCapital,
        Role::ExploringPartnerships,
        Role::SeekingTechnology,
        Role::RegulatoryPolicy,
        Role::MediaContent,
        Role::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::DeployingCapital => "deploying_capital",
            Role::RaisingCapital => "raising_capital",
            Role::ExploringPartnerships => "exploring_partnerships",
            Role::SeekingTechnology => "seeking_technology",
            Role::RegulatoryPolicy => "regulatory_policy",
            Role::MediaContent => "media_content",
            Role::Other => "other",
        }
    }

    /// Parse a role label, returning `None` for anything outside the canonical set
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == label)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of business interaction two roles can plausibly form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Investment,
    CoInvestment,
    Fundraising,
    InvestmentPitch,
    Partnership,
    GtmPartnership,
    TechPartnership,
    Integration,
    TechnicalCollaboration,
    TechEvaluation,
    PolicyDialogue,
    PolicyCoordination,
    SandboxCandidacy,
    SandboxCandidates,
    SandboxEvaluation,
    SandboxParticipation,
    MediaExposure,
    ContentCollaboration,
    /// Only referenced by stage rules; no role pair produces it
    Regulatory,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Investment => "investment",
            TransactionType::CoInvestment => "co_investment",
            TransactionType::Fundraising => "fundraising",
            TransactionType::InvestmentPitch => "investment_pitch",
            TransactionType::Partnership => "partnership",
            TransactionType::GtmPartnership => "gtm_partnership",
            TransactionType::TechPartnership => "tech_partnership",
            TransactionType::Integration => "integration",
            TransactionType::TechnicalCollaboration => "technical_collaboration",
            TransactionType::TechEvaluation => "tech_evaluation",
            TransactionType::PolicyDialogue => "policy_dialogue",
            TransactionType::PolicyCoordination => "policy_coordination",
            TransactionType::SandboxCandidacy => "sandbox_candidacy",
            TransactionType::SandboxCandidates => "sandbox_candidates",
            TransactionType::SandboxEvaluation => "sandbox_evaluation",
            TransactionType::SandboxParticipation => "sandbox_participation",
            TransactionType::MediaExposure => "media_exposure",
            TransactionType::ContentCollaboration => "content_collaboration",
            TransactionType::Regulatory => "regulatory",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    #[default]
    Delegate,
    Sponsor,
    Speaker,
    Vip,
}

/// How pressing a stated need is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Active,
    #[default]
    Exploring,
    Passive,
}

/// What an attendee is looking for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedsVector {
    pub primary_need: String,
    #[serde(default)]
    pub need_description: String,
    #[serde(default)]
    pub target_counterparty_type: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub constraints: Vec<String>,
}

/// What an attendee brings to the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidesVector {
    pub primary_capability: String,
    #[serde(default)]
    pub capability_description: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub geographic_reach: Vec<String>,
    #[serde(default)]
    pub audience_access: Vec<String>,
}

/// A (chain, position) pair, serialized as `["chain", "position"]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueChainPosition(pub String, pub String);

impl ValueChainPosition {
    pub fn new(chain: impl Into<String>, position: impl Into<String>) -> Self {
        Self(chain.into(), position.into())
    }

    pub fn chain(&self) -> &str {
        &self.0
    }

    pub fn position(&self) -> &str {
        &self.1
    }
}

/// Event attendee profile
///
/// Created by ingestion and enriched by extraction before scoring.
/// The scoring core only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendeeProfile {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub company_description: Option<String>,
    #[serde(default)]
    pub ticket_type: TicketType,
    #[serde(default)]
    pub role_at_event: Option<Role>,
    #[serde(default)]
    pub roles_at_event: Vec<Role>,
    #[serde(default)]
    pub looking_for: Option<String>,
    #[serde(default)]
    pub stated_goal: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub funding_raised: Option<String>,
    #[serde(default)]
    pub key_facts: Vec<String>,
    #[serde(default)]
    pub needs_vector: Option<NeedsVector>,
    #[serde(default)]
    pub provides_vector: Option<ProvidesVector>,
    #[serde(default)]
    pub value_chain_positions: Vec<ValueChainPosition>,
}

impl AttendeeProfile {
    /// Minimal profile with everything optional left empty
    pub fn new(name: impl Into<String>, title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            title: title.into(),
            company: company.into(),
            product: None,
            company_description: None,
            ticket_type: TicketType::default(),
            role_at_event: None,
            roles_at_event: Vec::new(),
            looking_for: None,
            stated_goal: String::new(),
            sector: None,
            stage: None,
            funding_raised: None,
            key_facts: Vec::new(),
            needs_vector: None,
            provides_vector: None,
            value_chain_positions: Vec::new(),
        }
        .normalize()
    }

    /// Fill derived fields once at ingestion time
    pub fn normalize(mut self) -> Self {
        if self.id.trim().is_empty() {
            self.id = slugify(&self.name);
        }
        if self.stated_goal.is_empty() {
            if let Some(looking_for) = &self.looking_for {
                self.stated_goal = looking_for.clone();
            }
        }
        if self.company_description.as_deref().filter(|d| !d.is_empty()).is_none() {
            self.company_description = self.product.clone();
        }
        if self.roles_at_event.is_empty() {
            if let Some(role) = self.role_at_event {
                self.roles_at_event = vec![role];
            }
        }
        self
    }

    /// Roles in their enrichment order, `[Other]` when nothing is known
    pub fn roles(&self) -> Vec<Role> {
        if !self.roles_at_event.is_empty() {
            return self.roles_at_event.clone();
        }
        match self.role_at_event {
            Some(role) => vec![role],
            None => vec![Role::Other],
        }
    }

    /// Plain-text identity line used whenever a structured vector is missing
    pub fn fallback_text(&self) -> String {
        format!("{} at {}. {}", self.title, self.company, self.stated_goal)
    }

    /// Sector, treating blank strings as absent
    pub fn sector(&self) -> Option<&str> {
        self.sector.as_deref().filter(|s| !s.is_empty())
    }

    /// Stage, treating blank strings as absent
    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref().filter(|s| !s.is_empty())
    }
}

/// Lower-case, strip punctuation, join words with `-`
pub fn slugify(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Per-dimension scores for one ordered pair, each in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub complementarity: f64,
    pub transaction_readiness: f64,
    pub non_obvious: f64,
}

/// Scored ordered pair (A's perspective on B)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub attendee_a_id: String,
    pub attendee_b_id: String,
    pub scores: DimensionScores,
    pub composite: f64,
    pub transaction_type: Option<TransactionType>,
}

/// Ranked matches for one attendee, best first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchBriefing {
    pub attendee_id: String,
    pub attendee_name: String,
    pub matches: Vec<ScoredPair>,
}

/// Composite weights for the three dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub complementarity: f64,
    pub transaction_readiness: f64,
    pub non_obvious: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            complementarity: 0.50,
            transaction_readiness: 0.30,
            non_obvious: 0.20,
        }
    }
}

/// Sub-weights inside the complementarity dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplementarityWeights {
    pub needs_provides_alignment: f64,
    pub value_chain_adjacency: f64,
    pub bidirectional: f64,
}

impl Default for ComplementarityWeights {
    fn default() -> Self {
        Self {
            needs_provides_alignment: 0.50,
            value_chain_adjacency: 0.30,
            bidirectional: 0.20,
        }
    }
}

/// Sub-signal weights for transaction readiness
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadinessWeights {
    pub mandate: f64,
    pub fit: f64,
    pub maturity: f64,
    pub alignment: f64,
}

impl ReadinessWeights {
    pub const fn new(mandate: f64, fit: f64, maturity: f64, alignment: f64) -> Self {
        Self { mandate, fit, maturity, alignment }
    }
}

impl Default for ReadinessWeights {
    fn default() -> Self {
        Self::new(0.25, 0.25, 0.25, 0.25)
    }
}

const CAPITAL_WEIGHTS: ReadinessWeights = ReadinessWeights::new(0.30, 0.30, 0.25, 0.15);
const COLLABORATION_WEIGHTS: ReadinessWeights = ReadinessWeights::new(0.20, 0.25, 0.30, 0.25);
const POLICY_WEIGHTS: ReadinessWeights = ReadinessWeights::new(0.30, 0.20, 0.25, 0.25);

/// Readiness weights per transaction type, with a fallback for unlisted types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessTable {
    pub by_type: HashMap<TransactionType, ReadinessWeights>,
    pub fallback: ReadinessWeights,
}

impl ReadinessTable {
    pub fn weights_for(&self, tx_type: TransactionType) -> ReadinessWeights {
        self.by_type.get(&tx_type).copied().unwrap_or(self.fallback)
    }
}

impl Default for ReadinessTable {
    fn default() -> Self {
        use TransactionType::*;

        let mut by_type = HashMap::new();
        for tx in [Investment, Fundraising, CoInvestment, InvestmentPitch] {
            by_type.insert(tx, CAPITAL_WEIGHTS);
        }
        for tx in [
            Partnership,
            GtmPartnership,
            TechPartnership,
            Integration,
            TechnicalCollaboration,
            MediaExposure,
            ContentCollaboration,
            TechEvaluation,
        ] {
            by_type.insert(tx, COLLABORATION_WEIGHTS);
        }
        for tx in [
            PolicyDialogue,
            SandboxCandidacy,
            SandboxCandidates,
            SandboxEvaluation,
            SandboxParticipation,
            PolicyCoordination,
        ] {
            by_type.insert(tx, POLICY_WEIGHTS);
        }

        Self {
            by_type,
            fallback: ReadinessWeights::default(),
        }
    }
}

/// Which non-obvious scorer to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonObviousVariant {
    /// Shared problem-domain tags blended with embedding similarity
    #[default]
    TagBlend,
    /// Embedding similarity only, boosted for cross-sector pairs
    EmbeddingOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonObviousParams {
    pub variant: NonObviousVariant,
    pub tag_weight: f64,
    pub embed_weight: f64,
    pub cross_sector_multiplier: f64,
    pub novelty_threshold: f64,
    pub novelty_boost: f64,
}

impl Default for NonObviousParams {
    fn default() -> Self {
        Self {
            variant: NonObviousVariant::TagBlend,
            tag_weight: 0.80,
            embed_weight: 0.20,
            cross_sector_multiplier: 1.5,
            novelty_threshold: 0.5,
            novelty_boost: 1.3,
        }
    }
}

/// Everything the scorers need besides the profiles themselves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    pub complementarity: ComplementarityWeights,
    pub bidirectional_threshold: f64,
    pub bidirectional_boost: f64,
    pub readiness: ReadinessTable,
    pub non_obvious: NonObviousParams,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            complementarity: ComplementarityWeights::default(),
            bidirectional_threshold: 0.3,
            bidirectional_boost: 1.3,
            readiness: ReadinessTable::default(),
            non_obvious: NonObviousParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Dr. Amara  Osei"), "dr-amara-osei");
        assert_eq!(slugify("  Jean-Luc Picard "), "jean-luc-picard");
    }

    #[test]
    fn test_normalize_fills_derived_fields() {
        let json = r#"{
            "name": "Lena Vogt",
            "title": "CEO",
            "company": "Tokenly",
            "product": "Tokenization rails for funds",
            "looking_for": "Series B lead",
            "role_at_event": "raising_capital"
        }"#;
        let profile: AttendeeProfile = serde_json::from_str(json).unwrap();
        let profile = profile.normalize();

        assert_eq!(profile.id, "lena-vogt");
        assert_eq!(profile.stated_goal, "Series B lead");
        assert_eq!(profile.company_description.as_deref(), Some("Tokenization rails for funds"));
        assert_eq!(profile.roles_at_event, vec![Role::RaisingCapital]);
    }

    #[test]
    fn test_blank_description_falls_back_to_product() {
        let json = r#"{"name": "Ola Berg", "product": "Custody APIs", "company_description": ""}"#;
        let profile: AttendeeProfile = serde_json::from_str(json).unwrap();
        let profile = profile.normalize();
        assert_eq!(profile.company_description.as_deref(), Some("Custody APIs"));

        let json = r#"{"name": "Ola Berg", "product": "Custody APIs", "company_description": "Nordic custodian"}"#;
        let profile: AttendeeProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.normalize().company_description.as_deref(), Some("Nordic custodian"));
    }

    #[test]
    fn test_roles_default_to_other() {
        let profile = AttendeeProfile::new("Sam", "Analyst", "Acme");
        assert_eq!(profile.roles(), vec![Role::Other]);
    }

    #[test]
    fn test_value_chain_position_serializes_as_pair() {
        let pos = ValueChainPosition::new("tokenized_securities", "custody");
        let json = serde_json::to_string(&pos).unwrap();
        assert_eq!(json, r#"["tokenized_securities","custody"]"#);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("media_content"), Some(Role::MediaContent));
        assert_eq!(Role::parse("speaker"), None);
    }

    #[test]
    fn test_readiness_table_fallback() {
        let table = ReadinessTable::default();
        assert_eq!(table.weights_for(TransactionType::Investment), CAPITAL_WEIGHTS);
        assert_eq!(table.weights_for(TransactionType::Regulatory), ReadinessWeights::default());
    }
}
