use std::sync::Arc;

use crate::core::{embedding_corpus, Matcher};
use crate::models::{AttendeeProfile, MatchBriefing, ScoringConfig};
use crate::progress::{ProgressSink, Stage};
use crate::services::{Embedder, EmbeddingStore, HashingEmbedder, ProfileEnricher};

/// Output of one full run
#[derive(Debug)]
pub struct RunOutcome {
    pub briefings: Vec<MatchBriefing>,
    pub pairs_scored: usize,
}

/// Enriched profiles with their own fitted embedding store
///
/// Each run fits a fresh store, so texts from earlier runs can never crowd
/// out the current corpus.
pub struct PreparedRun {
    profiles: Vec<AttendeeProfile>,
    embeddings: EmbeddingStore,
}

impl PreparedRun {
    pub fn profiles(&self) -> &[AttendeeProfile] {
        &self.profiles
    }

    pub fn embeddings(&self) -> &EmbeddingStore {
        &self.embeddings
    }
}

/// Full matching run: extraction, embedding fit, pairwise scoring, ranking
///
/// The extraction cache persists across runs until `reset` is called.
pub struct MatchPipeline {
    enricher: ProfileEnricher,
    embedder: Arc<dyn Embedder>,
    embedding_capacity: u64,
    matcher: Matcher,
    top_k: usize,
}

impl MatchPipeline {
    pub fn new(
        enricher: ProfileEnricher,
        embedder: Arc<dyn Embedder>,
        embedding_capacity: u64,
        matcher: Matcher,
        top_k: usize,
    ) -> Self {
        Self {
            enricher,
            embedder,
            embedding_capacity,
            matcher,
            top_k,
        }
    }

    /// Pipeline with no network collaborators
    pub fn offline(config: ScoringConfig, top_k: usize, dimensions: usize) -> Self {
        Self::new(
            ProfileEnricher::deterministic(),
            Arc::new(HashingEmbedder::new(dimensions)),
            20_000,
            Matcher::new(config),
            top_k,
        )
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn default_top_k(&self) -> usize {
        self.top_k
    }

    /// Enrich profiles and fit a per-run embedding store
    pub async fn prepare(&self, profiles: &[AttendeeProfile], progress: &dyn ProgressSink) -> PreparedRun {
        progress.report(Stage::Extraction, Stage::Extraction.overall(0.0));
        let enriched = self.enricher.enrich_all(profiles, progress).await;
        tracing::info!("Extraction complete for {} profiles", enriched.len());

        progress.report(Stage::EmbeddingFit, Stage::EmbeddingFit.overall(0.0));
        let embeddings = EmbeddingStore::new(self.embedder.clone(), self.embedding_capacity);
        let corpus = embedding_corpus(&enriched);
        match embeddings.fit(&corpus).await {
            Ok(encoded) => tracing::info!("Embedding fit complete ({} new of {} texts)", encoded, corpus.len()),
            Err(e) => tracing::warn!("Embedding fit failed, semantic signals will score 0: {}", e),
        }
        progress.report(Stage::EmbeddingFit, Stage::EmbeddingFit.overall(1.0));

        PreparedRun {
            profiles: enriched,
            embeddings,
        }
    }

    /// Pairwise scoring and ranking; CPU-bound, keep it off async workers
    pub fn score(&self, run: &PreparedRun, top_k: Option<usize>, progress: &dyn ProgressSink) -> RunOutcome {
        let top_k = top_k.unwrap_or(self.top_k);

        let result = self.matcher.rank(&run.profiles, &run.embeddings, top_k, progress);
        tracing::info!(
            "Ranking complete: {} briefings, {} pairs, top_k={}",
            result.briefings.len(),
            result.pairs_scored,
            top_k
        );
        progress.report(Stage::Complete, 1.0);

        RunOutcome {
            briefings: result.briefings,
            pairs_scored: result.pairs_scored,
        }
    }

    /// Rank every attendee; `top_k` overrides the configured default
    pub async fn run(
        &self,
        profiles: &[AttendeeProfile],
        top_k: Option<usize>,
        progress: &dyn ProgressSink,
    ) -> RunOutcome {
        let prepared = self.prepare(profiles, progress).await;
        self.score(&prepared, top_k, progress)
    }

    /// Drop every cached extraction
    pub fn reset(&self) {
        self.enricher.clear();
        tracing::info!("Pipeline caches cleared");
    }
}
