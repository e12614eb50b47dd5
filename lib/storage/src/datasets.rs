use crate::file_cache::{read_if_exists, write_atomic};
use askschema_core::{DatasetCatalog, Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// `datasets.json` holding the dataset slugs fetched from a catalog
#[derive(Debug, Clone)]
pub struct DatasetListCache {
    path: PathBuf,
}

impl DatasetListCache {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self { path: data_dir.as_ref().join("datasets.json") }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Option<Vec<String>>> {
        match read_if_exists(&self.path)? {
            Some(data) => serde_json::from_slice(&data)
                .map(Some)
                .map_err(|e| Error::Cache(format!("{}: {}", self.path.display(), e))),
            None => Ok(None),
        }
    }

    pub fn write(&self, datasets: &[String]) -> Result<()> {
        let data = serde_json::to_vec(datasets)
            .map_err(|e| Error::Cache(format!("cannot serialize dataset list: {}", e)))?;
        write_atomic(&self.path, &data)
    }
}

/// Serves the cached dataset list, fetching it from `inner` on first use.
pub struct CachedCatalog {
    inner: Arc<dyn DatasetCatalog>,
    cache: DatasetListCache,
}

impl CachedCatalog {
    pub fn new(inner: Arc<dyn DatasetCatalog>, cache: DatasetListCache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl DatasetCatalog for CachedCatalog {
    async fn datasets(&self) -> Result<Vec<String>> {
        if let Some(datasets) = self.cache.read()? {
            return Ok(datasets);
        }

        let datasets = self.inner.datasets().await?;
        self.cache.write(&datasets)?;
        info!(count = datasets.len(), path = %self.cache.path().display(), "dataset list cached");
        Ok(datasets)
    }
}
