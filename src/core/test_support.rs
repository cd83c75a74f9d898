//! Shared fixtures for scorer tests.

use std::sync::Arc;

use crate::core::matcher::embedding_corpus;
use crate::models::{AttendeeProfile, NeedsVector, ProvidesVector, Urgency};
use crate::services::{EmbeddingStore, HashingEmbedder};

pub fn profile_with_vectors(name: &str, need: &str, capability: &str) -> AttendeeProfile {
    let mut profile = AttendeeProfile::new(name, "Director", format!("{} Labs", name));
    profile.needs_vector = Some(NeedsVector {
        primary_need: need.to_string(),
        need_description: need.to_string(),
        target_counterparty_type: need.to_string(),
        urgency: Urgency::Exploring,
        constraints: vec![],
    });
    profile.provides_vector = Some(ProvidesVector {
        primary_capability: capability.to_string(),
        capability_description: capability.to_string(),
        evidence: vec![],
        geographic_reach: vec![],
        audience_access: vec![],
    });
    profile
}

pub fn empty_store() -> EmbeddingStore {
    EmbeddingStore::new(Arc::new(HashingEmbedder::new(512)), 10_000)
}

pub async fn fitted_store(profiles: &[&AttendeeProfile]) -> EmbeddingStore {
    let store = empty_store();
    let owned: Vec<AttendeeProfile> = profiles.iter().map(|p| (*p).clone()).collect();
    store
        .fit(&embedding_corpus(&owned))
        .await
        .expect("hashing embedder never fails");
    store
}
