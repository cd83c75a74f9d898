use async_trait::async_trait;
use moka::sync::Cache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while producing embeddings
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Shared, immutable embedding vector
pub type Embedding = Arc<Vec<f32>>;

/// Text-to-vector backend
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Encode texts, returning one vector per input in the same order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn dimensions(&self) -> usize;

    fn model_id(&self) -> &str;
}

/// Cosine similarity in [-1, 1]; 0.0 for empty, mismatched or zero vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm = norm_a.sqrt() * norm_b.sqrt();
    if norm == 0.0 {
        return 0.0;
    }
    dot / norm
}

/// Local feature-hashing embedder
///
/// Deterministic and offline: each lower-cased alphanumeric token is hashed
/// with SHA-256 into a signed bucket and the result is L2-normalized, so
/// vectors are stable across builds.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for token in lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let digest = Sha256::digest(token.as_bytes());
            let mut prefix = [0u8; 8];
            prefix.copy_from_slice(&digest[..8]);
            let h = u64::from_le_bytes(prefix);
            let bucket = (h % self.dimensions as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in vector.iter_mut() {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        "feature-hashing"
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible `/embeddings` endpoint
pub struct HttpEmbedder {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    dimensions: usize,
    batch_size: usize,
    client: Client,
}

impl HttpEmbedder {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        model: String,
        dimensions: usize,
        batch_size: usize,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            endpoint,
            api_key,
            model,
            dimensions,
            batch_size: batch_size.max(1),
            client,
        })
    }

    async fn embed_chunk(&self, chunk: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let url = format!("{}/embeddings", self.endpoint.trim_end_matches('/'));

        let mut request = self.client.post(&url).json(&EmbeddingRequest {
            model: &self.model,
            input: chunk,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(EmbeddingError::ApiError(format!(
                "Failed to embed {} texts: {}",
                chunk.len(),
                response.status()
            )));
        }

        let mut body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(format!("Failed to parse embeddings: {}", e)))?;

        if body.data.len() != chunk.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "Expected {} embeddings, got {}",
                chunk.len(),
                body.data.len()
            )));
        }

        body.data.sort_by_key(|d| d.index);

        body.data
            .into_iter()
            .map(|d| {
                if self.dimensions > 0 && d.embedding.len() != self.dimensions {
                    Err(EmbeddingError::DimensionMismatch {
                        expected: self.dimensions,
                        actual: d.embedding.len(),
                    })
                } else {
                    Ok(d.embedding)
                }
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            tracing::debug!("Embedding batch of {} texts with {}", chunk.len(), self.model);
            vectors.extend(self.embed_chunk(chunk).await?);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Embedding cache injected into the pipeline
///
/// `fit` populates it once before scoring so that the pairwise phase only
/// performs concurrent reads.
pub struct EmbeddingStore {
    embedder: Arc<dyn Embedder>,
    cache: Cache<String, Embedding>,
    capacity: u64,
}

impl EmbeddingStore {
    pub fn new(embedder: Arc<dyn Embedder>, capacity: u64) -> Self {
        Self {
            embedder,
            cache: Cache::new(capacity),
            capacity,
        }
    }

    /// Encode every not-yet-cached text in one batched call
    ///
    /// Returns the number of newly encoded texts.
    pub async fn fit(&self, corpus: &[String]) -> Result<usize, EmbeddingError> {
        let mut seen = HashSet::new();
        let missing: Vec<String> = corpus
            .iter()
            .filter(|text| seen.insert(text.as_str()) && !self.cache.contains_key(text.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() {
            return Ok(0);
        }

        let resident = self.len();
        if resident + missing.len() as u64 > self.capacity {
            tracing::warn!(
                "Embedding store would hold {} texts, capacity is {}; evicted texts will score 0",
                resident + missing.len() as u64,
                self.capacity
            );
        }

        let vectors = self.embedder.embed_batch(&missing).await?;
        if vectors.len() != missing.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "Expected {} embeddings, got {}",
                missing.len(),
                vectors.len()
            )));
        }

        for (text, vector) in missing.iter().zip(vectors) {
            self.cache.insert(text.clone(), Arc::new(vector));
        }

        tracing::info!(
            "Pre-encoded {} texts ({}-dim, model {})",
            missing.len(),
            self.embedder.dimensions(),
            self.embedder.model_id()
        );
        Ok(missing.len())
    }

    /// Cached vector, encoding and caching on a miss
    pub async fn get_embedding(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if let Some(hit) = self.cache.get(text) {
            tracing::trace!("Embedding cache hit");
            return Ok(hit);
        }

        let mut vectors = self.embedder.embed_batch(&[text.to_string()]).await?;
        let vector = vectors
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("Empty embedding batch".into()))?;

        let vector = Arc::new(vector);
        self.cache.insert(text.to_string(), vector.clone());
        Ok(vector)
    }

    /// Cached vector without touching the backend
    pub fn cached(&self, text: &str) -> Option<Embedding> {
        self.cache.get(text)
    }

    /// Cosine similarity of two cached texts, `None` if either is missing
    pub fn similarity(&self, text_a: &str, text_b: &str) -> Option<f64> {
        let a = self.cached(text_a)?;
        let b = self.cached(text_b)?;
        Some(cosine_similarity(&a, &b))
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks();
    }

    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> EmbeddingStore {
        EmbeddingStore::new(Arc::new(HashingEmbedder::new(128)), 1000)
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_hashing_embedder_is_deterministic() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.embed_one("Tokenized custody for banks");
        let b = embedder.embed_one("tokenized  CUSTODY, for banks");
        assert_eq!(a, b);
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_hashing_embedder_buckets_are_pinned() {
        let embedder = HashingEmbedder::new(16);

        let custody = embedder.embed_one("custody");
        assert_eq!(custody[1], -1.0);
        assert_eq!(custody.iter().filter(|v| **v != 0.0).count(), 1);

        let settlement = embedder.embed_one("Settlement");
        assert_eq!(settlement[7], -1.0);
    }

    #[tokio::test]
    async fn test_fresh_store_per_corpus_keeps_every_text() {
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(64));

        for run in 0..5 {
            let corpus: Vec<String> = (0..15).map(|i| format!("run {} text {}", run, i)).collect();
            let store = EmbeddingStore::new(embedder.clone(), 20);
            assert_eq!(store.fit(&corpus).await.unwrap(), 15);
            assert!(corpus.iter().all(|t| store.similarity(t, t).is_some()));
        }
    }

    #[test]
    fn test_hashing_embedder_overlap() {
        let embedder = HashingEmbedder::new(256);
        let a = embedder.embed_one("institutional custody settlement");
        let b = embedder.embed_one("custody settlement partner");
        let c = embedder.embed_one("");
        assert!(cosine_similarity(&a, &b) > 0.0);
        assert_eq!(cosine_similarity(&a, &c), 0.0);
    }

    #[tokio::test]
    async fn test_fit_dedups_and_skips_cached() {
        let store = store();
        let corpus = vec!["alpha".to_string(), "beta".to_string(), "alpha".to_string()];

        assert_eq!(store.fit(&corpus).await.unwrap(), 2);
        assert_eq!(store.fit(&corpus).await.unwrap(), 0);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_get_embedding_caches_on_demand() {
        let store = store();
        assert!(store.cached("gamma").is_none());

        let first = store.get_embedding("gamma").await.unwrap();
        let second = store.cached("gamma").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_similarity_requires_cached_texts() {
        let store = store();
        store.fit(&["one two".to_string()]).await.unwrap();

        assert!(store.similarity("one two", "three").is_none());
        let same = store.similarity("one two", "one two").unwrap();
        assert!((same - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_clear_resets_cache() {
        let store = store();
        store.fit(&["delta".to_string()]).await.unwrap();
        store.clear();
        assert!(store.cached("delta").is_none());
        assert!(store.similarity("delta", "delta").is_none());
    }

    #[tokio::test]
    async fn test_http_embedder_orders_by_index() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"index":1,"embedding":[0.0,1.0]},{"index":0,"embedding":[1.0,0.0]}]}"#)
            .create_async()
            .await;

        let embedder = HttpEmbedder::new(server.url(), Some("secret".into()), "mini".into(), 2, 16).unwrap();
        let vectors = embedder
            .embed_batch(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_http_embedder_rejects_wrong_dimensions() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_body(r#"{"data":[{"index":0,"embedding":[1.0,0.0,0.0]}]}"#)
            .create_async()
            .await;

        let embedder = HttpEmbedder::new(server.url(), None, "mini".into(), 2, 16).unwrap();
        let result = embedder.embed_batch(&["first".to_string()]).await;
        assert!(matches!(result, Err(EmbeddingError::DimensionMismatch { expected: 2, actual: 3 })));
    }

    #[tokio::test]
    async fn test_http_embedder_surfaces_api_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("POST", "/embeddings").with_status(503).create_async().await;

        let embedder = HttpEmbedder::new(server.url(), None, "mini".into(), 2, 16).unwrap();
        let result = embedder.embed_batch(&["first".to_string()]).await;
        assert!(matches!(result, Err(EmbeddingError::ApiError(_))));
    }
}
