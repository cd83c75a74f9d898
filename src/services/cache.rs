use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::models::AttendeeProfile;
use crate::services::extraction::ExtractionPayload;

/// In-process cache of extraction results, keyed by profile hash
///
/// Injected into the enricher and cleared explicitly between runs.
pub struct ExtractionCache {
    entries: Cache<String, Arc<ExtractionPayload>>,
}

impl ExtractionCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: Cache::new(capacity),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<ExtractionPayload>> {
        let hit = self.entries.get(key);
        if hit.is_some() {
            tracing::trace!("Extraction cache hit: {}", key);
        }
        hit
    }

    pub fn insert(&self, key: String, payload: ExtractionPayload) -> Arc<ExtractionPayload> {
        let payload = Arc::new(payload);
        self.entries.insert(key, payload.clone());
        payload
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
        tracing::debug!("Extraction cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        self.entries.run_pending_tasks();
        CacheStats {
            size: self.entries.entry_count(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Stable hash of the fields extraction reads, 16 hex characters
    pub fn profile(profile: &AttendeeProfile) -> String {
        let key = format!(
            "{}|{}|{}|{}|{}",
            profile.name,
            profile.title,
            profile.company,
            profile.product.as_deref().unwrap_or(""),
            profile.stated_goal
        );
        let digest = format!("{:x}", Sha256::digest(key.as_bytes()));
        digest[..16].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_key_is_stable() {
        let a = AttendeeProfile::new("Ana Ruiz", "CEO", "Ledgerline");
        let b = AttendeeProfile::new("Ana Ruiz", "CEO", "Ledgerline");
        let key = CacheKey::profile(&a);

        assert_eq!(key.len(), 16);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, CacheKey::profile(&b));
    }

    #[test]
    fn test_profile_key_ignores_unhashed_fields() {
        let a = AttendeeProfile::new("Ana Ruiz", "CEO", "Ledgerline");
        let mut b = a.clone();
        b.sector = Some("fintech".into());
        assert_eq!(CacheKey::profile(&a), CacheKey::profile(&b));

        b.stated_goal = "Meet custodians".into();
        assert_ne!(CacheKey::profile(&a), CacheKey::profile(&b));
    }

    #[test]
    fn test_cache_insert_get_clear() {
        let cache = ExtractionCache::new(100);
        assert!(cache.get("k").is_none());

        cache.insert("k".into(), ExtractionPayload::default());
        assert!(cache.get("k").is_some());
        assert_eq!(cache.stats().size, 1);

        cache.clear();
        assert!(cache.get("k").is_none());
    }
}
