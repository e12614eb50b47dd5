//! Query pipeline
//!
//! resolve index → embed query → rank → judge → render

use crate::error::{Error, Result};
use crate::judge::Judge;
use crate::provider::{ChatModel, DatasetCatalog, Embedder};
use crate::rank::{rank_with, DEFAULT_TOP_K};
use crate::render::{render, ChatResponse};
use crate::resolver::{IndexResolver, DEFAULT_PROVIDER_TIMEOUT};
use crate::vector::Similarity;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Inbound request: a question about one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(alias = "input")]
    pub query: String,
    pub dataset: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssistantConfig {
    pub top_k: usize,
    pub similarity: Similarity,
    pub embed_timeout: Duration,
    pub judge_timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            similarity: Similarity::Dot,
            embed_timeout: DEFAULT_PROVIDER_TIMEOUT,
            judge_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

/// Answers schema questions for any dataset the resolver can supply
pub struct Assistant {
    resolver: IndexResolver,
    embedder: Arc<dyn Embedder>,
    judge: Judge,
    catalog: Option<Arc<dyn DatasetCatalog>>,
    config: AssistantConfig,
}

impl Assistant {
    pub fn new(
        resolver: IndexResolver,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn ChatModel>,
        config: AssistantConfig,
    ) -> Self {
        Self {
            resolver,
            embedder,
            judge: Judge::new(model).with_timeout(config.judge_timeout),
            catalog: None,
            config,
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn DatasetCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn resolver(&self) -> &IndexResolver {
        &self.resolver
    }

    pub fn has_catalog(&self) -> bool {
        self.catalog.is_some()
    }

    /// Answer one request.
    ///
    /// Index and embedding failures are returned as errors. Judge failures
    /// produce [`ChatResponse::apology`].
    pub async fn answer(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let query = request.query.trim();
        let dataset = request.dataset.trim();
        if query.is_empty() {
            return Err(Error::InvalidRequest("query must not be empty".to_string()));
        }
        if dataset.is_empty() {
            return Err(Error::InvalidRequest("dataset must not be empty".to_string()));
        }

        let index = self.resolver.resolve(dataset).await?;
        let query_vector = self.embed_query(query).await?;
        let ranked = rank_with(&query_vector, &index, self.config.top_k, self.config.similarity)?;
        debug!(
            dataset,
            ranked = ranked.len(),
            best = ranked.first().map(|r| r.column.as_str()).unwrap_or(""),
            "columns ranked"
        );

        match self.judge.judge(query, &ranked).await {
            Ok(verdict) => Ok(render(&verdict)),
            Err(e) if e.is_degradable() => {
                warn!(dataset, error = %e, "judgment failed, answering with apology");
                Ok(ChatResponse::apology())
            }
            Err(e) => Err(e),
        }
    }

    /// Dataset names from the configured catalog.
    pub async fn datasets(&self) -> Result<Vec<String>> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| Error::InvalidConfig("no dataset catalog configured".to_string()))?;
        catalog.datasets().await
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let timeout = self.config.embed_timeout;
        let mut vectors = tokio::time::timeout(timeout, self.embedder.embed(&[query.to_string()]))
            .await
            .map_err(|_| {
                Error::EmbeddingMismatch(format!("query embedding timed out after {:?}", timeout))
            })?
            .map_err(|e| match e {
                Error::EmbeddingMismatch(_) => e,
                other => Error::EmbeddingMismatch(other.to_string()),
            })?;

        if vectors.len() != 1 {
            return Err(Error::EmbeddingMismatch(format!(
                "expected 1 query vector, got {}",
                vectors.len()
            )));
        }
        Ok(vectors.remove(0))
    }
}
