//! Embedding index resolution
//!
//! Resolves the [`EmbeddingIndex`] of a dataset: process memory first, then
//! the cache store, then a cold build from the schema source and the
//! embedding provider. Concurrent callers asking for the same cold dataset
//! await a single build, which runs on its own task so that a caller going
//! away does not cancel it for the others.

use crate::cache::CacheStore;
use crate::error::{Error, Result};
use crate::index::EmbeddingIndex;
use crate::provider::{Embedder, SchemaSource};
use ahash::{AHashMap, AHashSet};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default bound on each provider call
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

type PendingBuild = Shared<BoxFuture<'static, Result<Arc<EmbeddingIndex>>>>;

#[derive(Default)]
struct ResolverState {
    ready: AHashMap<String, Arc<EmbeddingIndex>>,
    building: AHashMap<String, PendingBuild>,
}

struct Inner {
    cache: Arc<dyn CacheStore>,
    schema: Arc<dyn SchemaSource>,
    embedder: Arc<dyn Embedder>,
    timeout: Duration,
    state: Mutex<ResolverState>,
}

/// Supplies embedding indexes by dataset name
#[derive(Clone)]
pub struct IndexResolver {
    inner: Arc<Inner>,
}

impl IndexResolver {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        schema: Arc<dyn SchemaSource>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self::with_timeout(cache, schema, embedder, DEFAULT_PROVIDER_TIMEOUT)
    }

    pub fn with_timeout(
        cache: Arc<dyn CacheStore>,
        schema: Arc<dyn SchemaSource>,
        embedder: Arc<dyn Embedder>,
        timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                cache,
                schema,
                embedder,
                timeout,
                state: Mutex::new(ResolverState::default()),
            }),
        }
    }

    /// Return the index for `dataset`, building and caching it on first use.
    pub async fn resolve(&self, dataset: &str) -> Result<Arc<EmbeddingIndex>> {
        let pending = {
            let mut state = self.inner.state.lock();
            if let Some(index) = state.ready.get(dataset) {
                return Ok(index.clone());
            }
            match state.building.get(dataset) {
                Some(pending) => {
                    debug!(dataset, "joining in-flight index build");
                    pending.clone()
                }
                None => {
                    let pending = self.spawn_build(dataset.to_string());
                    state.building.insert(dataset.to_string(), pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Whether `dataset` is already resolved in this process.
    pub fn is_loaded(&self, dataset: &str) -> bool {
        self.inner.state.lock().ready.contains_key(dataset)
    }

    /// Forget the in-process index of `dataset` so the next `resolve` reads
    /// the cache store again. An in-flight build is left alone.
    pub fn evict(&self, dataset: &str) -> bool {
        let removed = self.inner.state.lock().ready.remove(dataset).is_some();
        if removed {
            info!(dataset, "embedding index evicted");
        }
        removed
    }

    // Called with the state lock held; the task only takes the lock after
    // its build ended (or unwound), so it cannot miss the `building` entry.
    fn spawn_build(&self, dataset: String) -> PendingBuild {
        let inner = self.inner.clone();
        let slot = BuildSlot {
            inner: inner.clone(),
            dataset: Some(dataset.clone()),
        };
        let handle = tokio::spawn(async move {
            let result = inner.build(&dataset).await.map(Arc::new);
            slot.complete(&result);
            result
        });

        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(Error::Cache(format!("index build task failed: {}", e))),
            }
        }
        .boxed()
        .shared()
    }
}

/// The `building` entry of one in-flight build. Dropping it without
/// `complete` (the build panicked or was cancelled) clears the entry so the
/// next caller starts a fresh build.
struct BuildSlot {
    inner: Arc<Inner>,
    dataset: Option<String>,
}

impl BuildSlot {
    fn complete(mut self, result: &Result<Arc<EmbeddingIndex>>) {
        if let Some(dataset) = self.dataset.take() {
            let mut state = self.inner.state.lock();
            state.building.remove(&dataset);
            if let Ok(index) = result {
                state.ready.insert(dataset, index.clone());
            }
        }
    }
}

impl Drop for BuildSlot {
    fn drop(&mut self) {
        if let Some(dataset) = self.dataset.take() {
            warn!(dataset = %dataset, "index build aborted");
            self.inner.state.lock().building.remove(&dataset);
        }
    }
}

impl Inner {
    async fn build(&self, dataset: &str) -> Result<EmbeddingIndex> {
        let cached_columns = self.cache.read_columns(dataset)?;
        if let Some(columns) = &cached_columns {
            if let Some(embeddings) = self.cache.read_embeddings(dataset)? {
                debug!(dataset, columns = columns.len(), "embedding index loaded from cache");
                return EmbeddingIndex::new(dataset, columns.clone(), embeddings);
            }
        }

        let columns = match cached_columns {
            Some(columns) => columns,
            None => {
                let columns = self.fetch_columns(dataset).await?;
                self.cache.write_columns(dataset, &columns)?;
                columns
            }
        };

        let embeddings = self.embed_columns(dataset, &columns).await?;
        let index = EmbeddingIndex::new(dataset, columns, embeddings)?;
        self.cache.write_embeddings(dataset, &index.matrix())?;

        info!(
            dataset = index.dataset(),
            columns = index.len(),
            dim = index.dim(),
            "embedding index built"
        );
        Ok(index)
    }

    async fn fetch_columns(&self, dataset: &str) -> Result<Vec<String>> {
        let columns = tokio::time::timeout(self.timeout, self.schema.columns(dataset))
            .await
            .map_err(|_| {
                Error::SchemaFetch(format!(
                    "schema source timed out after {:?} for dataset {}",
                    self.timeout, dataset
                ))
            })?
            .map_err(|e| match e {
                Error::SchemaFetch(_) => e,
                other => Error::SchemaFetch(other.to_string()),
            })?;

        validate_columns(dataset, &columns)?;
        Ok(columns)
    }

    async fn embed_columns(&self, dataset: &str, columns: &[String]) -> Result<Vec<Vec<f32>>> {
        tokio::time::timeout(self.timeout, self.embedder.embed(columns))
            .await
            .map_err(|_| {
                Error::EmbeddingMismatch(format!(
                    "embedding provider timed out after {:?} for dataset {}",
                    self.timeout, dataset
                ))
            })?
            .map_err(|e| match e {
                Error::EmbeddingMismatch(_) => e,
                other => Error::EmbeddingMismatch(other.to_string()),
            })
    }
}

fn validate_columns(dataset: &str, columns: &[String]) -> Result<()> {
    if columns.is_empty() {
        return Err(Error::SchemaFetch(format!("dataset {} has no columns", dataset)));
    }

    let mut seen = AHashSet::with_capacity(columns.len());
    for column in columns {
        if column.is_empty() {
            return Err(Error::SchemaFetch(format!(
                "dataset {} has an empty column name",
                dataset
            )));
        }
        if !seen.insert(column.as_str()) {
            return Err(Error::SchemaFetch(format!(
                "dataset {} lists column {} twice",
                dataset, column
            )));
        }
    }
    Ok(())
}
