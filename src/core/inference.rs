//! Keyword-driven fallbacks used when extraction is missing or incomplete.
//!
//! Every classifier is an ordered list of rules checked by substring
//! containment on lower-cased text. Order matters wherever keywords overlap.

/// Seniority keywords, most senior first
const TITLE_SENIORITY: &[(&str, f64)] = &[
    ("ceo", 0.95),
    ("cfo", 0.9),
    ("cto", 0.85),
    ("coo", 0.85),
    ("cio", 0.85),
    ("founder", 0.9),
    ("co-founder", 0.9),
    ("president", 0.9),
    ("managing director", 0.85),
    ("general partner", 0.9),
    ("partner", 0.8),
    ("director", 0.75),
    ("head", 0.75),
    ("vp", 0.7),
    ("vice president", 0.7),
    ("senior", 0.6),
    ("manager", 0.5),
    ("analyst", 0.3),
];

const DEFAULT_MANDATE: f64 = 0.5;

const LATE_STAGE_MARKERS: &[&str] = &["series_b", "series_c", "growth", "scale"];
const EARLY_STAGE_MARKERS: &[&str] = &["series_a", "seed"];
const MATURITY_SIGNALS: &[&str] = &["live", "customer", "deploy", "production", "bank", "partner"];

/// Capability buckets, first match wins
const CAPABILITY_RULES: &[(&[&str], &str)] = &[
    (&["fund", "invest", "capital", "wealth", "allocat"], "capital_deployment"),
    (&["custod", "settlement", "clearing"], "custody_settlement"),
    (&["l2", "layer", "scaling", "protocol", "infrastructure"], "blockchain_infrastructure"),
    (&["regulat", "policy", "compliance", "central bank", "cbdc"], "regulatory_framework"),
    (&["venture", "vc", "gp", "general partner"], "venture_investment"),
];
const DEFAULT_CAPABILITY: &str = "technology_services";

/// Audience buckets, every match is kept
const AUDIENCE_RULES: &[(&[&str], &str)] = &[
    (&["bank", "institution", "sovereign"], "institutional_investors"),
    (&["startup", "founder", "ceo"], "startups"),
    (&["regulat", "policy", "government"], "regulators"),
];

/// Region buckets, every match is kept
const REGION_RULES: &[(&[&str], &str)] = &[
    (&["europe", "eu", "mica", "german", "french"], "europe"),
    (&["middle east", "abu dhabi", "dubai", "saudi"], "middle_east"),
    (&["asia", "apac", "singapore", "japan", "korea"], "apac"),
    (&["us", "america", "new york"], "north_america"),
];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

fn combined_text(title: &str, description: Option<&str>) -> String {
    match description {
        Some(desc) if !desc.is_empty() => format!("{} {}", title, desc).to_lowercase(),
        _ => title.to_lowercase(),
    }
}

/// Authority to act on a deal, inferred from a job title
pub fn infer_mandate_score(title: &str) -> f64 {
    let title = title.to_lowercase();
    TITLE_SENIORITY
        .iter()
        .find(|(keyword, _)| title.contains(keyword))
        .map(|(_, score)| *score)
        .unwrap_or(DEFAULT_MANDATE)
}

/// Organizational traction from the stage label and verifiable key facts
pub fn infer_maturity_score(key_facts: &[String], stage: Option<&str>) -> f64 {
    let mut score: f64 = 0.5;

    if let Some(stage) = stage.filter(|s| !s.is_empty()) {
        let stage = stage.to_lowercase();
        if contains_any(&stage, LATE_STAGE_MARKERS) {
            score += 0.2;
        } else if contains_any(&stage, EARLY_STAGE_MARKERS) {
            score += 0.1;
        } else if stage.contains("pre") {
            score -= 0.1;
        }
    }

    if !key_facts.is_empty() {
        let joined = key_facts.join(" ").to_lowercase();
        let hits = MATURITY_SIGNALS.iter().filter(|s| joined.contains(*s)).count();
        score += (hits as f64 * 0.05).min(0.2);
    }

    score.clamp(0.0, 1.0)
}

pub fn infer_capability(title: &str, description: Option<&str>) -> String {
    let text = combined_text(title, description);
    CAPABILITY_RULES
        .iter()
        .find(|(keywords, _)| contains_any(&text, keywords))
        .map(|(_, label)| *label)
        .unwrap_or(DEFAULT_CAPABILITY)
        .to_string()
}

pub fn infer_audience(title: &str, description: Option<&str>) -> Vec<String> {
    let text = combined_text(title, description);
    let audiences: Vec<String> = AUDIENCE_RULES
        .iter()
        .filter(|(keywords, _)| contains_any(&text, keywords))
        .map(|(_, label)| label.to_string())
        .collect();

    if audiences.is_empty() {
        vec!["general".to_string()]
    } else {
        audiences
    }
}

pub fn infer_geographic_reach(description: Option<&str>) -> Vec<String> {
    let Some(text) = description.filter(|d| !d.is_empty()).map(str::to_lowercase) else {
        return vec!["global".to_string()];
    };

    let regions: Vec<String> = REGION_RULES
        .iter()
        .filter(|(keywords, _)| contains_any(&text, keywords))
        .map(|(_, label)| label.to_string())
        .collect();

    if regions.is_empty() {
        vec!["global".to_string()]
    } else {
        regions
    }
}
