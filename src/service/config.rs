use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    assets::bundle::AssetSet,
    cache::store::CachedImageStore,
    foundation::error::BackdropResult,
    service::generator::{GenerationService, ServiceOpts},
};

/// File-level configuration of a [`GenerationService`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Root of the on-disk image cache.
    pub cache_dir: PathBuf,
    /// Directory holding the template assets under their conventional names.
    pub assets_dir: PathBuf,
    /// Compositing worker threads; unset lets rayon decide.
    pub compose_threads: Option<usize>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("dist"),
            assets_dir: PathBuf::from("assets"),
            compose_threads: None,
        }
    }
}

impl ServiceConfig {
    /// Parse a JSON config file; missing fields take their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> BackdropResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg = serde_json::from_str(&text)
            .with_context(|| format!("parse config '{}'", path.display()))?;
        Ok(cfg)
    }

    /// Load the assets, open the cache and build the service.
    pub fn build(&self) -> BackdropResult<GenerationService> {
        let assets = AssetSet::load_dir(&self.assets_dir)?;
        let store = CachedImageStore::open(&self.cache_dir)?;
        GenerationService::new(
            assets,
            store,
            ServiceOpts {
                compose_threads: self.compose_threads,
            },
        )
    }
}
