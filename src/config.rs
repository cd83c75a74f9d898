use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::models::{
    ComplementarityWeights, NonObviousParams, NonObviousVariant, ReadinessTable, ReadinessWeights, ScoringConfig,
    ScoringWeights, TransactionType,
};

/// Errors that can occur while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    #[validate(nested)]
    pub matching: MatchingSettings,
    #[validate(nested)]
    pub scoring: ScoringSettings,
    #[validate(nested)]
    pub embedding: EmbeddingSettings,
    pub extraction: ExtractionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MatchingSettings {
    #[serde(default = "default_top_k")]
    #[validate(range(min = 1, max = 50))]
    pub top_k: usize,
    /// Upper bound per request; scoring is quadratic (500 profiles is about 250k pairs)
    #[serde(default = "default_max_profiles")]
    #[validate(range(min = 2))]
    pub max_profiles: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_profiles: default_max_profiles(),
        }
    }
}

fn default_top_k() -> usize { 4 }
fn default_max_profiles() -> usize { 500 }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WeightsConfig {
    #[serde(default = "default_complementarity_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub complementarity: f64,
    #[serde(default = "default_readiness_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub transaction_readiness: f64,
    #[serde(default = "default_non_obvious_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub non_obvious: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            complementarity: default_complementarity_weight(),
            transaction_readiness: default_readiness_weight(),
            non_obvious: default_non_obvious_weight(),
        }
    }
}

fn default_complementarity_weight() -> f64 { 0.50 }
fn default_readiness_weight() -> f64 { 0.30 }
fn default_non_obvious_weight() -> f64 { 0.20 }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ComplementarityConfig {
    #[serde(default = "default_alignment_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub needs_provides_alignment: f64,
    #[serde(default = "default_chain_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub value_chain_adjacency: f64,
    #[serde(default = "default_bidirectional_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub bidirectional: f64,
    #[serde(default = "default_bidirectional_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub bidirectional_threshold: f64,
    #[serde(default = "default_bidirectional_boost")]
    #[validate(range(min = 0.0))]
    pub bidirectional_boost: f64,
}

impl Default for ComplementarityConfig {
    fn default() -> Self {
        Self {
            needs_provides_alignment: default_alignment_weight(),
            value_chain_adjacency: default_chain_weight(),
            bidirectional: default_bidirectional_weight(),
            bidirectional_threshold: default_bidirectional_threshold(),
            bidirectional_boost: default_bidirectional_boost(),
        }
    }
}

fn default_alignment_weight() -> f64 { 0.50 }
fn default_chain_weight() -> f64 { 0.30 }
fn default_bidirectional_weight() -> f64 { 0.20 }
fn default_bidirectional_threshold() -> f64 { 0.3 }
fn default_bidirectional_boost() -> f64 { 1.3 }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NonObviousConfig {
    #[serde(default)]
    pub variant: NonObviousVariant,
    #[serde(default = "default_tag_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub tag_weight: f64,
    #[serde(default = "default_embed_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub embed_weight: f64,
    #[serde(default = "default_cross_sector_multiplier")]
    #[validate(range(min = 0.0))]
    pub cross_sector_multiplier: f64,
    #[serde(default = "default_novelty_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub novelty_threshold: f64,
    #[serde(default = "default_novelty_boost")]
    #[validate(range(min = 0.0))]
    pub novelty_boost: f64,
}

impl Default for NonObviousConfig {
    fn default() -> Self {
        Self {
            variant: NonObviousVariant::default(),
            tag_weight: default_tag_weight(),
            embed_weight: default_embed_weight(),
            cross_sector_multiplier: default_cross_sector_multiplier(),
            novelty_threshold: default_novelty_threshold(),
            novelty_boost: default_novelty_boost(),
        }
    }
}

fn default_tag_weight() -> f64 { 0.80 }
fn default_embed_weight() -> f64 { 0.20 }
fn default_cross_sector_multiplier() -> f64 { 1.5 }
fn default_novelty_threshold() -> f64 { 0.5 }
fn default_novelty_boost() -> f64 { 1.3 }

/// Readiness weights per transaction type; unlisted types use `fallback`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessConfig {
    #[serde(default = "default_readiness_table")]
    pub by_type: HashMap<TransactionType, ReadinessWeights>,
    #[serde(default)]
    pub fallback: ReadinessWeights,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            by_type: default_readiness_table(),
            fallback: ReadinessWeights::default(),
        }
    }
}

fn default_readiness_table() -> HashMap<TransactionType, ReadinessWeights> {
    ReadinessTable::default().by_type
}

fn validate_readiness(readiness: &ReadinessConfig) -> Result<(), ValidationError> {
    let in_range = |w: &ReadinessWeights| {
        [w.mandate, w.fit, w.maturity, w.alignment]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    };
    if readiness.by_type.values().all(in_range) && in_range(&readiness.fallback) {
        Ok(())
    } else {
        Err(ValidationError::new("readiness_weight_out_of_range"))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ScoringSettings {
    #[serde(default)]
    #[validate(nested)]
    pub weights: WeightsConfig,
    #[serde(default)]
    #[validate(nested)]
    pub complementarity: ComplementarityConfig,
    #[serde(default)]
    #[validate(custom(function = "validate_readiness"))]
    pub readiness: ReadinessConfig,
    #[serde(default)]
    #[validate(nested)]
    pub non_obvious: NonObviousConfig,
}

impl ScoringSettings {
    pub fn to_scoring_config(&self) -> ScoringConfig {
        ScoringConfig {
            weights: ScoringWeights {
                complementarity: self.weights.complementarity,
                transaction_readiness: self.weights.transaction_readiness,
                non_obvious: self.weights.non_obvious,
            },
            complementarity: ComplementarityWeights {
                needs_provides_alignment: self.complementarity.needs_provides_alignment,
                value_chain_adjacency: self.complementarity.value_chain_adjacency,
                bidirectional: self.complementarity.bidirectional,
            },
            bidirectional_threshold: self.complementarity.bidirectional_threshold,
            bidirectional_boost: self.complementarity.bidirectional_boost,
            readiness: ReadinessTable {
                by_type: self.readiness.by_type.clone(),
                fallback: self.readiness.fallback,
            },
            non_obvious: NonObviousParams {
                variant: self.non_obvious.variant,
                tag_weight: self.non_obvious.tag_weight,
                embed_weight: self.non_obvious.embed_weight,
                cross_sector_multiplier: self.non_obvious.cross_sector_multiplier,
                novelty_threshold: self.non_obvious.novelty_threshold,
                novelty_boost: self.non_obvious.novelty_boost,
            },
        }
    }

    /// Weight groups that do not sum to 1.0
    ///
    /// Sums are a convention only, so these are warnings, not errors.
    pub fn weight_convention_warnings(&self) -> Vec<String> {
        let mut groups: Vec<(String, f64)> = vec![
            (
                "scoring.weights".to_string(),
                self.weights.complementarity + self.weights.transaction_readiness + self.weights.non_obvious,
            ),
            (
                "scoring.complementarity".to_string(),
                self.complementarity.needs_provides_alignment
                    + self.complementarity.value_chain_adjacency
                    + self.complementarity.bidirectional,
            ),
            (
                "scoring.non_obvious".to_string(),
                self.non_obvious.tag_weight + self.non_obvious.embed_weight,
            ),
            (
                "scoring.readiness.fallback".to_string(),
                readiness_sum(&self.readiness.fallback),
            ),
        ];

        let mut by_type: Vec<_> = self.readiness.by_type.iter().collect();
        by_type.sort_by_key(|(tx, _)| tx.as_str());
        groups.extend(
            by_type
                .into_iter()
                .map(|(tx, w)| (format!("scoring.readiness.by_type.{}", tx), readiness_sum(w))),
        );

        groups
            .into_iter()
            .filter(|(_, sum)| (sum - 1.0).abs() > 1e-6)
            .map(|(name, sum)| format!("{} sums to {:.3}, expected 1.0", name, sum))
            .collect()
    }
}

fn readiness_sum(w: &ReadinessWeights) -> f64 {
    w.mandate + w.fit + w.maturity + w.alignment
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmbeddingSettings {
    /// OpenAI-compatible base URL; the local hashing embedder is used when unset
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dimensions")]
    #[validate(range(min = 1))]
    pub dimensions: usize,
    #[serde(default = "default_batch_size")]
    #[validate(range(min = 1))]
    pub batch_size: usize,
    /// Per-run store size; each profile contributes up to three texts
    #[serde(default = "default_embedding_cache_capacity")]
    pub cache_capacity: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            batch_size: default_batch_size(),
            cache_capacity: default_embedding_cache_capacity(),
        }
    }
}

fn default_embedding_model() -> String { "all-MiniLM-L6-v2".to_string() }
fn default_dimensions() -> usize { 384 }
fn default_batch_size() -> usize { 64 }
fn default_embedding_cache_capacity() -> u64 { 20_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionSettings {
    /// OpenAI-compatible base URL; extraction is purely deterministic when unset
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_extraction_model")]
    pub model: String,
    #[serde(default = "default_extraction_cache_capacity")]
    pub cache_capacity: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            model: default_extraction_model(),
            cache_capacity: default_extraction_cache_capacity(),
        }
    }
}

fn default_extraction_model() -> String { "gpt-4o-mini".to_string() }
fn default_extraction_cache_capacity() -> u64 { 5_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

fn env_source() -> Environment {
    // e.g., SUMMIT__MATCHING__TOP_K -> matching.top_k
    Environment::with_prefix("SUMMIT")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SUMMIT__)
    pub fn load() -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(env_source())
            .build()?;

        Self::finish(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        Self::finish(settings)
    }

    fn finish(config: Config) -> Result<Self, SettingsError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}
