use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::inference::{infer_audience, infer_capability, infer_geographic_reach};
use crate::core::value_chain::is_known_position;
use crate::models::{AttendeeProfile, NeedsVector, ProvidesVector, Role, Urgency, ValueChainPosition};
use crate::progress::{ProgressSink, Stage};
use crate::services::cache::{CacheKey, ExtractionCache};

/// Errors that can occur while extracting structured intent
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

const SYSTEM_PROMPT: &str = r#"You are an expert analyst for a Web3/blockchain conference matchmaking engine.
Given an attendee profile, extract structured intelligence in JSON.

Return a single JSON object with these keys:

{
  "needs": {
    "primary_need": "concise label",
    "need_description": "1-2 sentence detail",
    "target_counterparty_type": "who they need to meet",
    "urgency": "active|exploring|passive",
    "constraints": ["specific requirement 1", ...]
  },
  "provides": {
    "primary_capability": "concise label",
    "capability_description": "1-2 sentence detail",
    "evidence": ["verifiable data point 1", ...],
    "geographic_reach": ["region1", ...],
    "audience_access": ["audience type 1", ...]
  },
  "roles_at_event": ["deploying_capital", "raising_capital", "exploring_partnerships",
                     "seeking_technology", "regulatory_policy", "media_content"],
  "value_chain_positions": [["chain_name", "position"], ...]
}

RULES:
- roles_at_event: pick 1-3 from the allowed values based on the profile. Multiple roles are expected.
- value_chain_positions: map to positions in these chains:
  tokenized_securities: issuance, custody, settlement, distribution, compliance_audit
  defi_infrastructure: protocol, scaling_l1_l2, interoperability, wallet_access, compliance
  institutional_adoption: regulatory_framework, sandbox, pilot, production, scale
  capital_markets: fund_formation, deal_sourcing, due_diligence, portfolio_management, exit
- provides: infer from context (title, company, product). Do NOT copy stated_goal into provides.
- urgency: "active" if language shows immediacy/mandates, "exploring" if open/interested, "passive" if vague.
- Return ONLY valid JSON, no markdown fences.
"#;

/// Needs block as returned by the model, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawNeeds {
    pub primary_need: String,
    pub need_description: String,
    pub target_counterparty_type: String,
    pub urgency: Option<String>,
    pub constraints: Vec<String>,
}

/// Provides block as returned by the model, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProvides {
    pub primary_capability: String,
    pub capability_description: String,
    pub evidence: Vec<String>,
    pub geographic_reach: Vec<String>,
    pub audience_access: Vec<String>,
}

/// Unvalidated extraction output
///
/// Everything is optional. `apply_extraction` decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionPayload {
    pub needs: Option<RawNeeds>,
    pub provides: Option<RawProvides>,
    pub roles_at_event: Vec<String>,
    pub value_chain_positions: Vec<Value>,
}

/// Structured-intent backend
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, profile: &AttendeeProfile) -> Result<ExtractionPayload, ExtractionError>;
}

/// Profile rendered as the user message for the extraction prompt
pub fn build_user_message(profile: &AttendeeProfile) -> String {
    let mut parts = vec![
        format!("Name: {}", profile.name),
        format!("Title: {}", profile.title),
        format!("Company: {}", profile.company),
    ];

    if let Some(product) = profile.product.as_deref().filter(|p| !p.is_empty()) {
        parts.push(format!("Product/offering: {}", product));
    }
    if let Some(description) = profile.company_description.as_deref().filter(|d| !d.is_empty()) {
        if profile.product.as_deref() != Some(description) {
            parts.push(format!("Company description: {}", description));
        }
    }
    if !profile.stated_goal.is_empty() {
        parts.push(format!("Stated goal: {}", profile.stated_goal));
    }
    if let Some(sector) = profile.sector() {
        parts.push(format!("Sector: {}", sector));
    }
    if let Some(stage) = profile.stage() {
        parts.push(format!("Stage: {}", stage));
    }
    if let Some(funding) = profile.funding_raised.as_deref().filter(|f| !f.is_empty()) {
        parts.push(format!("Funding raised: {}", funding));
    }
    if !profile.key_facts.is_empty() {
        parts.push(format!("Key facts: {}", profile.key_facts.join("; ")));
    }
    if !profile.roles_at_event.is_empty() {
        let roles: Vec<&str> = profile.roles_at_event.iter().map(Role::as_str).collect();
        parts.push(format!("Self-reported roles: {}", roles.join(", ")));
    }

    parts.join("\n")
}

/// Body of the first fenced code block, or the whole text when unfenced
pub fn strip_fences(text: &str) -> &str {
    let Some(start) = text.find("```") else {
        return text.trim();
    };
    let rest = &text[start + 3..];
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    match rest.find("```") {
        Some(end) => rest[..end].trim(),
        None => text.trim(),
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint
pub struct HttpExtractor {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    client: Client,
}

impl HttpExtractor {
    pub fn new(endpoint: String, api_key: Option<String>, model: String) -> Result<Self, ExtractionError> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            endpoint,
            api_key,
            model,
            client,
        })
    }
}

#[async_trait]
impl Extractor for HttpExtractor {
    async fn extract(&self, profile: &AttendeeProfile) -> Result<ExtractionPayload, ExtractionError> {
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        let user_message = build_user_message(profile);

        let mut request = self.client.post(&url).json(&ChatRequest {
            model: &self.model,
            temperature: 0.0,
            max_tokens: 2048,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_message,
                },
            ],
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ExtractionError::ApiError(format!(
                "Failed to extract {}: {}",
                profile.name,
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::InvalidResponse(format!("Failed to parse completion: {}", e)))?;

        let raw = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ExtractionError::InvalidResponse("Completion has no choices".into()))?;

        match serde_json::from_str::<ExtractionPayload>(strip_fences(&raw)) {
            Ok(payload) => Ok(payload),
            Err(e) => {
                let preview: String = raw.chars().take(200).collect();
                tracing::warn!("Model {} returned unusable JSON ({}): {}", self.model, e, preview);
                Ok(ExtractionPayload::default())
            }
        }
    }
}

fn parse_urgency(label: Option<&str>) -> Urgency {
    match label.map(|l| l.trim().to_lowercase()).as_deref() {
        Some("active") => Urgency::Active,
        Some("passive") => Urgency::Passive,
        _ => Urgency::Exploring,
    }
}

fn fallback_needs(profile: &AttendeeProfile) -> NeedsVector {
    let goal = if profile.stated_goal.is_empty() {
        profile.title.clone()
    } else {
        profile.stated_goal.clone()
    };
    NeedsVector {
        primary_need: goal.clone(),
        need_description: goal,
        target_counterparty_type: String::new(),
        urgency: Urgency::Exploring,
        constraints: Vec::new(),
    }
}

fn fallback_provides(profile: &AttendeeProfile) -> ProvidesVector {
    let description = profile.company_description.as_deref().filter(|d| !d.is_empty());

    ProvidesVector {
        primary_capability: infer_capability(&profile.title, description),
        capability_description: description
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} at {}", profile.title, profile.company)),
        evidence: profile.key_facts.iter().take(3).cloned().collect(),
        geographic_reach: infer_geographic_reach(description),
        audience_access: infer_audience(&profile.title, description),
    }
}

fn parse_position(item: &Value) -> Option<ValueChainPosition> {
    let pair = item.as_array()?;
    if pair.len() != 2 {
        return None;
    }
    let chain = pair[0].as_str()?;
    let position = pair[1].as_str()?;
    is_known_position(chain, position).then(|| ValueChainPosition::new(chain, position))
}

/// Enriched copy of `profile` with every usable part of `payload` applied
///
/// Missing or unusable parts keep what the profile already carries, then
/// fall back to deterministic inference, so the result is always scoreable.
pub fn apply_extraction(profile: &AttendeeProfile, payload: &ExtractionPayload) -> AttendeeProfile {
    let needs = match payload.needs.as_ref().filter(|n| !n.primary_need.is_empty()) {
        Some(raw) => NeedsVector {
            primary_need: raw.primary_need.clone(),
            need_description: raw.need_description.clone(),
            target_counterparty_type: raw.target_counterparty_type.clone(),
            urgency: parse_urgency(raw.urgency.as_deref()),
            constraints: raw.constraints.clone(),
        },
        None => match &profile.needs_vector {
            Some(existing) => existing.clone(),
            None => fallback_needs(profile),
        },
    };

    let provides = match payload.provides.as_ref().filter(|p| !p.primary_capability.is_empty()) {
        Some(raw) => ProvidesVector {
            primary_capability: raw.primary_capability.clone(),
            capability_description: raw.capability_description.clone(),
            evidence: raw.evidence.clone(),
            geographic_reach: raw.geographic_reach.clone(),
            audience_access: raw.audience_access.clone(),
        },
        None => match &profile.provides_vector {
            Some(existing) => existing.clone(),
            None => fallback_provides(profile),
        },
    };

    let mut roles: Vec<Role> = payload.roles_at_event.iter().filter_map(|r| Role::parse(r)).collect();
    if roles.is_empty() {
        roles = profile.roles();
    }

    let mut positions: Vec<ValueChainPosition> =
        payload.value_chain_positions.iter().filter_map(parse_position).collect();
    if positions.is_empty() {
        positions = profile
            .value_chain_positions
            .iter()
            .filter(|p| is_known_position(p.chain(), p.position()))
            .cloned()
            .collect();
    }

    let preview = |s: &str| s.chars().take(40).collect::<String>();
    tracing::info!(
        "Extracted {}: roles={:?}, positions={}, needs={}, provides={}",
        profile.name,
        roles.iter().map(Role::as_str).collect::<Vec<_>>(),
        positions.len(),
        preview(&needs.primary_need),
        preview(&provides.primary_capability)
    );

    let mut enriched = profile.clone();
    enriched.needs_vector = Some(needs);
    enriched.provides_vector = Some(provides);
    enriched.roles_at_event = roles;
    enriched.value_chain_positions = positions;
    enriched
}

/// Extraction collaborator with its injected cache
///
/// Never fails: extractor errors degrade to the deterministic fallbacks.
pub struct ProfileEnricher {
    extractor: Option<Arc<dyn Extractor>>,
    cache: ExtractionCache,
}

impl ProfileEnricher {
    pub fn new(extractor: Option<Arc<dyn Extractor>>, cache_capacity: u64) -> Self {
        Self {
            extractor,
            cache: ExtractionCache::new(cache_capacity),
        }
    }

    /// Enricher that only uses deterministic inference
    pub fn deterministic() -> Self {
        Self::new(None, 1)
    }

    pub fn has_extractor(&self) -> bool {
        self.extractor.is_some()
    }

    pub async fn enrich(&self, profile: &AttendeeProfile) -> AttendeeProfile {
        let Some(extractor) = &self.extractor else {
            return apply_extraction(profile, &ExtractionPayload::default());
        };

        let key = CacheKey::profile(profile);
        if let Some(payload) = self.cache.get(&key) {
            return apply_extraction(profile, &payload);
        }

        match extractor.extract(profile).await {
            Ok(payload) => {
                if payload == ExtractionPayload::default() {
                    tracing::warn!("Empty extraction for {}, using fallbacks", profile.name);
                }
                let payload = self.cache.insert(key, payload);
                apply_extraction(profile, &payload)
            }
            Err(e) => {
                // not cached, so the next run retries
                tracing::warn!("Extraction failed for {}, using fallbacks: {}", profile.name, e);
                apply_extraction(profile, &ExtractionPayload::default())
            }
        }
    }

    /// Enrich every profile in order, reporting extraction progress
    pub async fn enrich_all(&self, profiles: &[AttendeeProfile], progress: &dyn ProgressSink) -> Vec<AttendeeProfile> {
        let total = profiles.len().max(1);
        let mut enriched = Vec::with_capacity(profiles.len());

        for (i, profile) in profiles.iter().enumerate() {
            enriched.push(self.enrich(profile).await);
            progress.report(Stage::Extraction, Stage::Extraction.overall((i + 1) as f64 / total as f64));
        }

        tracing::info!("Enriched {} profiles", enriched.len());
        enriched
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}
