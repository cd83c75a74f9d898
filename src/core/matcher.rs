use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use rayon::prelude::*;

use crate::core::{complementarity, composite::composite_score, non_obvious, readiness};
use crate::models::{AttendeeProfile, DimensionScores, MatchBriefing, ScoredPair, ScoringConfig};
use crate::progress::{ProgressSink, Stage};
use crate::services::EmbeddingStore;

/// Result of a ranking pass
#[derive(Debug)]
pub struct MatchResult {
    pub briefings: Vec<MatchBriefing>,
    pub pairs_scored: usize,
}

/// Every text the scorers will look up, in profile order
///
/// Feed this to `EmbeddingStore::fit` before ranking so that the pairwise
/// phase only reads from the cache.
pub fn embedding_corpus(profiles: &[AttendeeProfile]) -> Vec<String> {
    profiles
        .iter()
        .flat_map(|p| {
            [
                complementarity::needs_text(p),
                complementarity::provides_text(p),
                non_obvious::problem_domain_text(p),
            ]
        })
        .collect()
}

/// Pairwise scoring and ranking engine
///
/// # Pipeline Stages
/// 1. Score every ordered pair (A, B) with A != B, in parallel over A
/// 2. Sort each attendee's pairs by composite, best first (stable)
/// 3. Keep the top K per attendee
#[derive(Debug, Clone)]
pub struct Matcher {
    config: ScoringConfig,
}

impl Matcher {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn with_default_config() -> Self {
        Self {
            config: ScoringConfig::default(),
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score B from A's perspective
    pub fn score_pair(&self, a: &AttendeeProfile, b: &AttendeeProfile, embeddings: &EmbeddingStore) -> ScoredPair {
        let (transaction_readiness, transaction_type) = readiness::score(a, b, &self.config);

        let scores = DimensionScores {
            complementarity: complementarity::score(a, b, &self.config, embeddings),
            transaction_readiness,
            non_obvious: non_obvious::score(a, b, &self.config, embeddings),
        };
        let composite = composite_score(&scores, &self.config.weights);

        ScoredPair {
            attendee_a_id: a.id.clone(),
            attendee_b_id: b.id.clone(),
            scores,
            composite,
            transaction_type,
        }
    }

    /// Rank every other attendee for each attendee
    ///
    /// Briefings come back in input order. Pairs with equal composites keep
    /// the order in which B appears in `profiles`.
    pub fn rank(
        &self,
        profiles: &[AttendeeProfile],
        embeddings: &EmbeddingStore,
        top_k: usize,
        progress: &dyn ProgressSink,
    ) -> MatchResult {
        let total = profiles.len().max(1);
        let scored_rows = AtomicUsize::new(0);

        let rows: Vec<Vec<ScoredPair>> = profiles
            .par_iter()
            .map(|a| {
                let row: Vec<ScoredPair> = profiles
                    .iter()
                    .filter(|b| b.id != a.id)
                    .map(|b| self.score_pair(a, b, embeddings))
                    .collect();

                let done = scored_rows.fetch_add(1, AtomicOrdering::Relaxed) + 1;
                progress.report(Stage::PairwiseScoring, Stage::PairwiseScoring.overall(done as f64 / total as f64));
                row
            })
            .collect();

        let pairs_scored: usize = rows.iter().map(Vec::len).sum();
        tracing::info!("Scored {} ordered pairs across {} attendees", pairs_scored, profiles.len());

        let mut briefings = Vec::with_capacity(profiles.len());
        for (i, (profile, mut matches)) in profiles.iter().zip(rows).enumerate() {
            // Sort by composite (descending); sort_by is stable
            matches.sort_by(|x, y| y.composite.partial_cmp(&x.composite).unwrap_or(Ordering::Equal));
            matches.truncate(top_k);

            briefings.push(MatchBriefing {
                attendee_id: profile.id.clone(),
                attendee_name: profile.name.clone(),
                matches,
            });
            progress.report(Stage::Ranking, Stage::Ranking.overall((i + 1) as f64 / total as f64));
        }

        MatchResult {
            briefings,
            pairs_scored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{fitted_store, profile_with_vectors};
    use crate::models::{Role, TransactionType, ValueChainPosition};
    use crate::progress::NoProgress;
    use std::sync::Mutex;

    fn investor() -> AttendeeProfile {
        let mut p = profile_with_vectors("Ines Alvarez", "series b tokenization startup", "growth capital");
        p.title = "Managing Partner".into();
        p.roles_at_event = vec![Role::DeployingCapital];
        p.stage = Some("growth_vc".into());
        p.sector = Some("venture_capital".into());
        p
    }

    fn founder() -> AttendeeProfile {
        let mut p = profile_with_vectors("Felix Brandt", "growth capital", "series b tokenization startup");
        p.title = "CEO".into();
        p.roles_at_event = vec![Role::RaisingCapital];
        p.stage = Some("series_b".into());
        p.sector = Some("tokenization".into());
        p
    }

    fn bystander(name: &str) -> AttendeeProfile {
        profile_with_vectors(name, "podcast guests", "event photography")
    }

    #[tokio::test]
    async fn test_investment_scenario() {
        let matcher = Matcher::with_default_config();
        let a = investor();
        let b = founder();

        let mut c = a.clone();
        c.id = "c".into();
        c.roles_at_event = vec![Role::Other];
        let mut d = b.clone();
        d.id = "d".into();
        d.roles_at_event = vec![Role::Other];

        let store = fitted_store(&[&a, &b]).await;
        let pair = matcher.score_pair(&a, &b, &store);
        let other_pair = matcher.score_pair(&c, &d, &store);

        assert_eq!(pair.transaction_type, Some(TransactionType::Investment));
        assert!(pair.scores.transaction_readiness > 0.0);
        assert!(pair.composite > 0.0);
        assert_eq!(other_pair.transaction_type, None);
        assert!(pair.composite > other_pair.composite);
    }

    #[tokio::test]
    async fn test_scores_stay_in_unit_range() {
        let matcher = Matcher::with_default_config();
        let mut a = investor();
        a.value_chain_positions = vec![
            ValueChainPosition::new("capital_markets", "deal_sourcing"),
            ValueChainPosition::new("tokenized_securities", "issuance"),
        ];
        let mut b = founder();
        b.value_chain_positions = vec![ValueChainPosition::new("tokenized_securities", "custody")];
        let c = bystander("Cara");
        let store = fitted_store(&[&a, &b, &c]).await;

        for (x, y) in [(&a, &b), (&b, &a), (&a, &c), (&c, &b)] {
            let pair = matcher.score_pair(x, y, &store);
            for value in [
                pair.scores.complementarity,
                pair.scores.transaction_readiness,
                pair.scores.non_obvious,
                pair.composite,
            ] {
                assert!((0.0..=1.0).contains(&value));
            }
        }
    }

    #[tokio::test]
    async fn test_ranking_order() {
        let matcher = Matcher::with_default_config();
        let mut a = investor();
        a.value_chain_positions = vec![ValueChainPosition::new("capital_markets", "deal_sourcing")];
        let mut b = founder();
        b.value_chain_positions = vec![ValueChainPosition::new("capital_markets", "due_diligence")];
        let c = bystander("Cara");
        let profiles = vec![a.clone(), c.clone(), b.clone()];
        let store = fitted_store(&[&a, &b, &c]).await;

        let ab = matcher.score_pair(&a, &b, &store).composite;
        let ac = matcher.score_pair(&a, &c, &store).composite;
        assert!(ab > ac);

        let result = matcher.rank(&profiles, &store, 4, &NoProgress);
        let briefing = &result.briefings[0];
        assert_eq!(briefing.attendee_id, a.id);
        assert_eq!(briefing.matches[0].attendee_b_id, b.id);
        assert_eq!(briefing.matches[1].attendee_b_id, c.id);
    }

    #[tokio::test]
    async fn test_top_k_truncation() {
        let matcher = Matcher::with_default_config();
        let profiles = vec![investor(), founder(), bystander("Cara"), bystander("Dmitri"), bystander("Eve")];
        let refs: Vec<&AttendeeProfile> = profiles.iter().collect();
        let store = fitted_store(&refs).await;

        let result = matcher.rank(&profiles, &store, 2, &NoProgress);

        assert_eq!(result.pairs_scored, 20);
        assert_eq!(result.briefings.len(), 5);
        for briefing in &result.briefings {
            assert_eq!(briefing.matches.len(), 2);
            assert!(briefing.matches[0].composite >= briefing.matches[1].composite);
            assert!(briefing.matches.iter().all(|m| m.attendee_b_id != briefing.attendee_id));
        }
    }

    #[tokio::test]
    async fn test_ties_keep_input_order() {
        let matcher = Matcher::with_default_config();
        // identical content, distinct ids
        let profiles = vec![bystander("Ann"), bystander("Ben"), bystander("Cy"), bystander("Di")];
        let refs: Vec<&AttendeeProfile> = profiles.iter().collect();
        let store = fitted_store(&refs).await;

        let result = matcher.rank(&profiles, &store, 3, &NoProgress);
        let order: Vec<&str> = result.briefings[0]
            .matches
            .iter()
            .map(|m| m.attendee_b_id.as_str())
            .collect();
        assert_eq!(order, vec!["ben", "cy", "di"]);
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_never_paired() {
        let matcher = Matcher::with_default_config();
        let a = investor();
        let mut twin = founder();
        twin.id = a.id.clone();
        let store = fitted_store(&[&a, &twin]).await;

        let result = matcher.rank(&[a, twin], &store, 4, &NoProgress);
        assert_eq!(result.pairs_scored, 0);
        assert!(result.briefings.iter().all(|b| b.matches.is_empty()));
    }

    #[tokio::test]
    async fn test_reports_progress() {
        let matcher = Matcher::with_default_config();
        let profiles = vec![investor(), founder(), bystander("Cara")];
        let refs: Vec<&AttendeeProfile> = profiles.iter().collect();
        let store = fitted_store(&refs).await;

        let seen = Mutex::new(Vec::new());
        let sink = |stage: Stage, overall: f64| seen.lock().unwrap().push((stage, overall));
        matcher.rank(&profiles, &store, 4, &sink);

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 6);
        assert!(seen.iter().filter(|(s, _)| *s == Stage::PairwiseScoring).all(|(_, p)| *p > 0.3 && *p <= 0.7 + 1e-9));
        assert_eq!(seen.last().map(|(s, _)| *s), Some(Stage::Ranking));
        assert!((seen.last().unwrap().1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input() {
        let matcher = Matcher::with_default_config();
        let store = crate::core::test_support::empty_store();
        let result = matcher.rank(&[], &store, 4, &NoProgress);
        assert!(result.briefings.is_empty());
        assert_eq!(result.pairs_scored, 0);
    }
}
