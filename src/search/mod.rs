//! Adviser matching
//!
//! Embeds a query once, compares it with both adviser profiles and ranks the
//! blended scores.

pub mod embedding;
pub mod engine;
pub mod similarity;
pub mod store;

pub use embedding::{Embedder, HtpEmbedder, SerializedEmbedder, HTP_DIM};
pub use engine::{RecommendationEngine, ScoredAdviser, ScoringWeights, DEFAULT_TOP_K};
pub use similarity::{cosine_similarities, cosine_similarity};
pub use store::{EmbeddingMatrix, VectorStore};
