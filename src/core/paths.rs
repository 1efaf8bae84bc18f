use std::path::{Path, PathBuf};

use crate::error::Result;

pub const CONFIG_FILE: &str = "advisify.yaml";
pub const DATASET_FILE: &str = "advisers.csv";

/// Well-known locations relative to the working root
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub config: PathBuf,
    pub dataset: PathBuf,
}

impl AppPaths {
    pub fn from_current_dir() -> Result<Self> {
        Ok(Self::from_root(std::env::current_dir()?))
    }

    pub fn from_root(root: PathBuf) -> Self {
        Self {
            config: root.join(CONFIG_FILE),
            dataset: root.join(DATASET_FILE),
            root,
        }
    }

    /// Resolve `path` against the root unless it is already absolute
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_root() {
        let paths = AppPaths::from_root(PathBuf::from("/srv/advisify"));
        assert_eq!(paths.config, PathBuf::from("/srv/advisify/advisify.yaml"));
        assert_eq!(paths.dataset, PathBuf::from("/srv/advisify/advisers.csv"));
        assert_eq!(
            paths.resolve(Path::new("data/a.csv")),
            PathBuf::from("/srv/advisify/data/a.csv")
        );
        assert_eq!(paths.resolve(Path::new("/tmp/a.csv")), PathBuf::from("/tmp/a.csv"));
    }
}
