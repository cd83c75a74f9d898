// Service exports
pub mod cache;
pub mod embeddings;
pub mod extraction;

pub use cache::{CacheKey, CacheStats, ExtractionCache};
pub use embeddings::{cosine_similarity, Embedder, Embedding, EmbeddingError, EmbeddingStore, HashingEmbedder, HttpEmbedder};
pub use extraction::{apply_extraction, ExtractionError, ExtractionPayload, Extractor, HttpExtractor, ProfileEnricher};
