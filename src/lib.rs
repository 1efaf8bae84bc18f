//! advisify library
//!
//! Recommends thesis advisers by matching a thesis title against each
//! adviser's area of expertise and history of supervised theses.
//!
//! # Modules
//!
//! - `core`: Data model, project types and configuration
//! - `search`: Embedding, similarity scoring and ranking
//! - `error`: Error taxonomy shared by both

pub mod core;
pub mod error;
pub mod search;

// Re-exports for convenience
pub use crate::core::adviser::Adviser;
pub use crate::core::config::Config;
pub use crate::core::paths::AppPaths;
pub use crate::core::project_types::{is_known_project_type, PROJECT_TYPES};
pub use crate::core::query::Query;
pub use error::{AdvisifyError, Result};
pub use search::{Embedder, HtpEmbedder, RecommendationEngine, ScoredAdviser, ScoringWeights, VectorStore};
