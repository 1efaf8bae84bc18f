//! Recommendation engine - combines embedder, vector store and scoring
//!
//! A request is embedded once and compared against both adviser profiles.
//! The two similarities are blended into an overall score, and advisers are
//! ranked by it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::embedding::Embedder;
use super::similarity::cosine_similarities;
use super::store::VectorStore;
use crate::core::adviser::Adviser;
use crate::core::query::Query;
use crate::error::{AdvisifyError, Result};

pub const DEFAULT_TOP_K: usize = 5;

const WEIGHT_SUM_TOLERANCE: f32 = 1e-6;

/// Blend weights for the two similarity signals
///
/// Weights sum to one, so the overall score stays within the range of its
/// inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub expertise: f32,
    pub past_thesis: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            expertise: 0.4,
            past_thesis: 0.6,
        }
    }
}

impl ScoringWeights {
    pub fn new(expertise: f32, past_thesis: f32) -> Result<Self> {
        for (name, weight) in [("expertise", expertise), ("past_thesis", past_thesis)] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(AdvisifyError::config(format!(
                    "{} weight must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }

        let sum = expertise + past_thesis;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AdvisifyError::config(format!(
                "weights must sum to 1.0, got {} + {} = {}",
                expertise, past_thesis, sum
            )));
        }

        Ok(Self {
            expertise,
            past_thesis,
        })
    }

    /// Unclamped overall score
    pub fn blend(&self, expertise: f32, past_thesis: f32) -> f32 {
        self.expertise * expertise + self.past_thesis * past_thesis
    }
}

/// One ranked adviser with its three scores, each in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredAdviser<'a> {
    #[serde(flatten)]
    pub adviser: &'a Adviser,
    pub expertise_similarity: f32,
    pub past_thesis_similarity: f32,
    pub overall_similarity: f32,
}

/// Scores and ranks advisers for a query
pub struct RecommendationEngine<E> {
    store: Arc<VectorStore>,
    embedder: E,
    weights: ScoringWeights,
}

impl<E: Embedder> RecommendationEngine<E> {
    /// Fails when the embedder and the store disagree on dimension
    pub fn new(store: Arc<VectorStore>, embedder: E) -> Result<Self> {
        let expected = store.dimension();
        let found = embedder.dimension();
        if expected != found {
            return Err(AdvisifyError::dimension_mismatch(
                "embedder output vs. stored adviser vectors",
                expected,
                found,
            ));
        }

        Ok(Self {
            store,
            embedder,
            weights: ScoringWeights::default(),
        })
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Top `top_k` advisers for `query`, best first
    ///
    /// Returns `min(top_k, N)` entries. Nothing is returned on failure.
    pub fn recommend(&self, query: &Query, top_k: usize) -> Result<Vec<ScoredAdviser<'_>>> {
        if query.is_empty() {
            tracing::debug!("rejecting empty query");
            return Err(AdvisifyError::InvalidQuery);
        }

        let text = query.composed_text();
        let vector = self.embed(&text)?;

        let mut ranked = self.rank(&vector);
        ranked.truncate(top_k);

        tracing::debug!(
            text = %text,
            returned = ranked.len(),
            best = ?ranked.first().map(|r| r.overall_similarity),
            "recommendation computed"
        );

        Ok(ranked)
    }

    /// Score every adviser against a query vector, best first
    ///
    /// Scores are clamped to [0, 1] independently; negative similarity means
    /// "no match". Equal overall scores keep load order.
    pub fn rank(&self, query_vector: &[f32]) -> Vec<ScoredAdviser<'_>> {
        let sim_expertise = cosine_similarities(query_vector, self.store.expertise_matrix());
        let sim_past_thesis = cosine_similarities(query_vector, self.store.past_thesis_matrix());

        let mut ranked: Vec<ScoredAdviser<'_>> = self
            .store
            .advisers()
            .iter()
            .zip(sim_expertise.iter().zip(&sim_past_thesis))
            .map(|(adviser, (&expertise, &past_thesis))| ScoredAdviser {
                adviser,
                expertise_similarity: clamp_unit(expertise),
                past_thesis_similarity: clamp_unit(past_thesis),
                overall_similarity: clamp_unit(self.weights.blend(expertise, past_thesis)),
            })
            .collect();

        // `sort_by` is stable
        ranked.sort_by(|a, b| b.overall_similarity.total_cmp(&a.overall_similarity));
        ranked
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.embedder.encode(text)?;

        if vector.len() != self.store.dimension() {
            return Err(AdvisifyError::embedding(format!(
                "model returned {} dimensions, expected {}",
                vector.len(),
                self.store.dimension()
            )));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(AdvisifyError::embedding("model returned a non-finite value"));
        }

        Ok(vector)
    }
}

/// Clamp to [0, 1]; non-finite scores count as no match and `-0.0` becomes
/// `0.0` so that `total_cmp` sees equal scores as ties
fn clamp_unit(score: f32) -> f32 {
    if !score.is_finite() {
        return 0.0;
    }
    score.clamp(0.0, 1.0) + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::embedding::HtpEmbedder;
    use std::cell::Cell;
    use std::f32::consts::FRAC_1_SQRT_2;

    /// Returns a fixed vector and counts calls
    struct FixedEmbedder {
        vector: Vec<f32>,
        calls: Cell<usize>,
    }

    impl FixedEmbedder {
        fn new(vector: Vec<f32>) -> Self {
            Self {
                vector,
                calls: Cell::new(0),
            }
        }
    }

    impl Embedder for FixedEmbedder {
        fn dimension(&self) -> usize {
            self.vector.len()
        }

        fn encode(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.vector.clone())
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn dimension(&self) -> usize {
            2
        }

        fn encode(&self, _text: &str) -> Result<Vec<f32>> {
            Err(AdvisifyError::embedding("model unavailable"))
        }
    }

    /// Claims two dimensions but returns three
    struct WrongLengthEmbedder;

    impl Embedder for WrongLengthEmbedder {
        fn dimension(&self) -> usize {
            2
        }

        fn encode(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }
    }

    fn adviser(name: &str, expertise: [f32; 2], past_thesis: [f32; 2]) -> Adviser {
        Adviser::new(name, "", "", expertise.to_vec(), past_thesis.to_vec())
    }

    /// A matches expertise exactly but opposes on past theses, B is moderate
    /// on both, C is orthogonal on both
    fn abc_store() -> Arc<VectorStore> {
        Arc::new(
            VectorStore::from_advisers(vec![
                adviser("A", [1.0, 0.0], [-1.0, 0.0]),
                adviser("B", [1.0, 1.0], [1.0, 1.0]),
                adviser("C", [0.0, 1.0], [0.0, 1.0]),
            ])
            .unwrap(),
        )
    }

    fn names<'a>(ranked: &[ScoredAdviser<'a>]) -> Vec<&'a str> {
        ranked.iter().map(|r| r.adviser.name.as_str()).collect()
    }

    #[test]
    fn test_three_adviser_scenario() -> Result<()> {
        let engine = RecommendationEngine::new(abc_store(), FixedEmbedder::new(vec![1.0, 0.0]))?;
        let ranked = engine.recommend(&Query::new("query"), 5)?;

        assert_eq!(names(&ranked), vec!["B", "A", "C"]);

        let b = &ranked[0];
        assert!((b.expertise_similarity - FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((b.past_thesis_similarity - FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((b.overall_similarity - FRAC_1_SQRT_2).abs() < 1e-6);

        // 0.4 * 1.0 + 0.6 * -1.0 = -0.2 before clamping
        let a = &ranked[1];
        assert_eq!(a.expertise_similarity, 1.0);
        assert_eq!(a.past_thesis_similarity, 0.0);
        assert_eq!(a.overall_similarity, 0.0);

        let c = &ranked[2];
        assert_eq!(c.expertise_similarity, 0.0);
        assert_eq!(c.past_thesis_similarity, 0.0);
        assert_eq!(c.overall_similarity, 0.0);
        Ok(())
    }

    #[test]
    fn test_expertise_match_can_win() -> Result<()> {
        // With expertise weighted 0.9, A scores 0.9 and B stays at 0.707
        let store = Arc::new(VectorStore::from_advisers(vec![
            adviser("A", [1.0, 0.0], [0.0, 1.0]),
            adviser("B", [1.0, 1.0], [1.0, 1.0]),
        ])?);
        let engine = RecommendationEngine::new(store, FixedEmbedder::new(vec![1.0, 0.0]))?
            .with_weights(ScoringWeights::new(0.9, 0.1)?);

        let ranked = engine.recommend(&Query::new("query"), 5)?;
        assert_eq!(names(&ranked), vec!["A", "B"]);
        assert!((ranked[0].overall_similarity - 0.9).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_overall_is_weighted_blend() {
        let engine =
            RecommendationEngine::new(abc_store(), FixedEmbedder::new(vec![0.8, 0.6])).unwrap();
        let query = [0.8f32, 0.6];
        let sim_e = cosine_similarities(&query, engine.store().expertise_matrix());
        let sim_p = cosine_similarities(&query, engine.store().past_thesis_matrix());

        for (i, adviser) in engine.store().advisers().iter().enumerate() {
            let blended = 0.4 * sim_e[i] + 0.6 * sim_p[i];
            assert_eq!(engine.weights().blend(sim_e[i], sim_p[i]), blended);

            let scored = engine
                .rank(&query)
                .into_iter()
                .find(|s| s.adviser.name == adviser.name)
                .unwrap();
            assert_eq!(scored.overall_similarity, blended.clamp(0.0, 1.0));
        }
    }

    #[test]
    fn test_scores_within_unit_range() -> Result<()> {
        let store = Arc::new(VectorStore::from_advisers(vec![
            adviser("P", [-1.0, -1.0], [-0.5, 0.2]),
            adviser("Q", [3.0, 4.0], [-3.0, 4.0]),
            adviser("R", [0.0, 0.0], [1.0, 0.0]),
        ])?);

        for query in [[1.0, 0.0], [-1.0, 0.3], [0.0, 0.0], [0.6, 0.8]] {
            let engine = RecommendationEngine::new(store.clone(), FixedEmbedder::new(query.to_vec()))?;
            for scored in engine.recommend(&Query::new("q"), 10)? {
                for score in [
                    scored.expertise_similarity,
                    scored.past_thesis_similarity,
                    scored.overall_similarity,
                ] {
                    assert!((0.0..=1.0).contains(&score), "{score} out of range");
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_ties_keep_load_order() -> Result<()> {
        let store = Arc::new(VectorStore::from_advisers(vec![
            adviser("first", [0.0, 1.0], [0.0, 1.0]),
            adviser("best", [1.0, 0.0], [1.0, 0.0]),
            adviser("second", [0.0, 1.0], [0.0, 1.0]),
            adviser("third", [0.0, 2.0], [0.0, 3.0]),
        ])?);
        let engine = RecommendationEngine::new(store, FixedEmbedder::new(vec![1.0, 0.0]))?;

        let ranked = engine.recommend(&Query::new("q"), 10)?;
        assert_eq!(names(&ranked), vec!["best", "first", "second", "third"]);
        Ok(())
    }

    #[test]
    fn test_negative_zero_ties_keep_load_order() -> Result<()> {
        let store = Arc::new(VectorStore::from_advisers(vec![
            adviser("loaded_first", [-0.0, 1.0], [-0.0, 1.0]),
            adviser("loaded_second", [0.0, 1.0], [0.0, 1.0]),
        ])?);
        let engine = RecommendationEngine::new(store, FixedEmbedder::new(vec![1.0, -0.0]))?;

        let ranked = engine.recommend(&Query::new("q"), 10)?;
        assert_eq!(names(&ranked), vec!["loaded_first", "loaded_second"]);
        for scored in &ranked {
            assert!(scored.overall_similarity.is_sign_positive());
            assert!(scored.expertise_similarity.is_sign_positive());
        }
        Ok(())
    }

    #[test]
    fn test_extreme_magnitudes_stay_in_range() -> Result<()> {
        let store = Arc::new(VectorStore::from_advisers(vec![
            adviser("huge", [1e20, 0.0], [1e20, 0.0]),
            adviser("tiny", [1e-30, 0.0], [1e-30, 0.0]),
            adviser("opposed", [-1e20, 0.0], [0.0, 1e-30]),
        ])?);
        let engine = RecommendationEngine::new(store, FixedEmbedder::new(vec![1e20, 0.0]))?;

        let ranked = engine.recommend(&Query::new("q"), 10)?;
        assert_eq!(names(&ranked), vec!["huge", "tiny", "opposed"]);
        assert_eq!(ranked[0].overall_similarity, 1.0);
        assert_eq!(ranked[1].overall_similarity, 1.0);
        assert_eq!(ranked[2].overall_similarity, 0.0);
        for scored in &ranked {
            for score in [
                scored.expertise_similarity,
                scored.past_thesis_similarity,
                scored.overall_similarity,
            ] {
                assert!((0.0..=1.0).contains(&score), "{score} out of range");
            }
        }
        Ok(())
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(f32::NAN), 0.0);
        assert_eq!(clamp_unit(f32::INFINITY), 0.0);
        assert_eq!(clamp_unit(1.5), 1.0);
        assert_eq!(clamp_unit(-0.3), 0.0);
        assert!(clamp_unit(-0.0).is_sign_positive());
        assert_eq!(clamp_unit(-0.0).total_cmp(&0.0), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_top_k_length() -> Result<()> {
        let engine = RecommendationEngine::new(abc_store(), FixedEmbedder::new(vec![1.0, 0.0]))?;
        let query = Query::new("q");

        assert_eq!(engine.recommend(&query, 0)?.len(), 0);
        assert_eq!(engine.recommend(&query, 2)?.len(), 2);
        assert_eq!(names(&engine.recommend(&query, 2)?), vec!["B", "A"]);
        assert_eq!(engine.recommend(&query, 3)?.len(), 3);
        assert_eq!(names(&engine.recommend(&query, DEFAULT_TOP_K)?), vec!["B", "A", "C"]);
        Ok(())
    }

    #[test]
    fn test_empty_query_rejected_before_embedding() {
        let embedder = FixedEmbedder::new(vec![1.0, 0.0]);
        let engine = RecommendationEngine::new(abc_store(), embedder).unwrap();

        let err = engine.recommend(&Query::new("   "), 5).unwrap_err();
        assert!(matches!(err, AdvisifyError::InvalidQuery));
        assert!(err.is_user_error());
        assert_eq!(engine.embedder.calls.get(), 0);
    }

    #[test]
    fn test_tags_only_query_succeeds() -> Result<()> {
        let engine = RecommendationEngine::new(abc_store(), FixedEmbedder::new(vec![1.0, 0.0]))?;
        let ranked = engine.recommend(&Query::new("").with_tags(["Web App"]), 5)?;
        assert_eq!(ranked.len(), 3);
        assert_eq!(engine.embedder.calls.get(), 1);
        Ok(())
    }

    #[test]
    fn test_embedding_failure_aborts() {
        let engine = RecommendationEngine::new(abc_store(), FailingEmbedder).unwrap();
        let err = engine.recommend(&Query::new("q"), 5).unwrap_err();
        assert!(matches!(err, AdvisifyError::Embedding(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_wrong_vector_length_is_embedding_error() {
        let engine = RecommendationEngine::new(abc_store(), WrongLengthEmbedder).unwrap();
        assert!(matches!(
            engine.recommend(&Query::new("q"), 5),
            Err(AdvisifyError::Embedding(_))
        ));
    }

    #[test]
    fn test_dimension_checked_at_construction() {
        let result = RecommendationEngine::new(abc_store(), HtpEmbedder::new());
        assert!(matches!(
            result,
            Err(AdvisifyError::DimensionMismatch {
                expected: 2,
                found: 384,
                ..
            })
        ));
    }

    #[test]
    fn test_recommend_is_deterministic() -> Result<()> {
        let embed = HtpEmbedder::new();
        let advisers = [
            ("Dr. Cruz", "machine learning agriculture", "crop yield prediction models"),
            ("Dr. Reyes", "computer networks security", "intrusion detection systems"),
            ("Dr. Santos", "mobile development", "mobile apps for small businesses"),
        ]
        .iter()
        .map(|(name, expertise, past)| -> Result<Adviser> {
            Ok(Adviser::new(
                *name,
                *expertise,
                *past,
                embed.encode(expertise)?,
                embed.encode(past)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

        let engine = RecommendationEngine::new(Arc::new(VectorStore::from_advisers(advisers)?), embed)?;
        let query = Query::new("Predicting crop yield with machine learning")
            .with_tags(["AI / Machine Learning"]);

        let first = engine.recommend(&query, 5)?;
        let second = engine.recommend(&query, 5)?;
        assert_eq!(first, second);
        assert_eq!(first[0].adviser.name, "Dr. Cruz");
        Ok(())
    }

    #[test]
    fn test_weights_validation() {
        assert!(ScoringWeights::new(0.4, 0.6).is_ok());
        assert!(ScoringWeights::new(1.0, 0.0).is_ok());
        assert!(ScoringWeights::new(0.5, 0.6).is_err());
        assert!(ScoringWeights::new(-0.2, 1.2).is_err());
        assert!(ScoringWeights::new(f32::NAN, 0.6).is_err());
        assert_eq!(ScoringWeights::default(), ScoringWeights::new(0.4, 0.6).unwrap());
    }

    #[test]
    fn test_scored_adviser_json() -> Result<()> {
        let engine = RecommendationEngine::new(abc_store(), FixedEmbedder::new(vec![1.0, 0.0]))?;
        let ranked = engine.recommend(&Query::new("q"), 1)?;

        let json = serde_json::to_value(&ranked[0]).unwrap();
        assert_eq!(json["name"], "B");
        assert!(json.get("overall_similarity").is_some());
        assert!(json.get("adviser").is_none());
        Ok(())
    }
}
