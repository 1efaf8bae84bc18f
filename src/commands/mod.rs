pub mod index;
pub mod recommend;
pub mod types;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use advisify::{AppPaths, Config, HtpEmbedder, RecommendationEngine, VectorStore};

/// Options shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub dataset: Option<PathBuf>,
}

impl GlobalOptions {
    /// Config file (explicit, or `advisify.yaml` in the working directory)
    /// with command-line overrides applied
    pub fn load_config(&self) -> Result<Config> {
        let paths = AppPaths::from_current_dir()?;

        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::load_or_default(&paths).context("Failed to load config")?,
        };

        if let Some(dataset) = &self.dataset {
            config.dataset = paths.resolve(dataset);
        }

        Ok(config)
    }
}

/// Load the dataset and build the engine with the built-in embedder
pub fn open_engine(config: &Config) -> Result<RecommendationEngine<HtpEmbedder>> {
    let store = VectorStore::load(&config.dataset)
        .with_context(|| format!("Failed to load adviser dataset {}", config.dataset.display()))?;

    let engine = RecommendationEngine::new(Arc::new(store), HtpEmbedder::new())
        .context("Dataset was not embedded with the built-in model; run `advisify index` first")?
        .with_weights(config.weights);

    Ok(engine)
}
