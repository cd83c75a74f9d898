//! Coarse progress checkpoints for a full matching run.
//!
//! Progress is advisory. Sinks must be cheap and thread-safe because the
//! pairwise stage reports from rayon workers.

use std::fmt;

/// Stage of a matching run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extraction,
    EmbeddingFit,
    PairwiseScoring,
    Ranking,
    Complete,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Extraction => "extraction",
            Stage::EmbeddingFit => "embedding_fit",
            Stage::PairwiseScoring => "pairwise_scoring",
            Stage::Ranking => "ranking",
            Stage::Complete => "complete",
        }
    }

    /// Share of the overall run covered by this stage
    pub fn span(&self) -> (f64, f64) {
        match self {
            Stage::Extraction => (0.0, 0.25),
            Stage::EmbeddingFit => (0.25, 0.30),
            Stage::PairwiseScoring => (0.30, 0.70),
            Stage::Ranking => (0.70, 1.0),
            Stage::Complete => (1.0, 1.0),
        }
    }

    /// Map a fraction of this stage onto overall progress
    pub fn overall(&self, fraction: f64) -> f64 {
        let (start, end) = self.span();
        start + (end - start) * fraction.clamp(0.0, 1.0)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receiver for progress checkpoints, `overall` in [0, 1]
pub trait ProgressSink: Send + Sync {
    fn report(&self, stage: Stage, overall: f64);
}

/// Sink that discards every checkpoint
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _stage: Stage, _overall: f64) {}
}

impl<F> ProgressSink for F
where
    F: Fn(Stage, f64) + Send + Sync,
{
    fn report(&self, stage: Stage, overall: f64) {
        self(stage, overall)
    }
}
