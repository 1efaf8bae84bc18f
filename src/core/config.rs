//! YAML configuration (`advisify.yaml`)
//!
//! Every field is optional; a missing file yields the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::paths::{AppPaths, DATASET_FILE};
use crate::error::{AdvisifyError, Result};
use crate::search::engine::{ScoringWeights, DEFAULT_TOP_K};

/// Default upper bound on a single embedding call at the service boundary
pub const DEFAULT_EMBED_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Dataset path, relative to the directory holding the config file
    pub dataset: PathBuf,
    pub top_k: usize,
    pub weights: ScoringWeights,
    pub embed_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from(DATASET_FILE),
            top_k: DEFAULT_TOP_K,
            weights: ScoringWeights::default(),
            embed_timeout_ms: DEFAULT_EMBED_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Parse and validate a config file
    ///
    /// A relative `dataset` is rebased onto the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&text)?;

        if let Some(dir) = path.parent() {
            config.dataset = AppPaths::from_root(dir.to_path_buf()).resolve(&config.dataset);
        }

        Ok(config)
    }

    /// Load the file at `paths.config` if present, defaults otherwise
    pub fn load_or_default(paths: &AppPaths) -> Result<Self> {
        if paths.config.exists() {
            tracing::debug!(path = %paths.config.display(), "loading config");
            return Self::load(&paths.config);
        }

        Ok(Self {
            dataset: paths.dataset.clone(),
            ..Self::default()
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a map
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ScoringWeights::new(self.weights.expertise, self.weights.past_thesis)?;
        if self.embed_timeout_ms == 0 {
            return Err(AdvisifyError::config("embed_timeout_ms must be positive"));
        }
        Ok(())
    }
}
