//! # askschema
//!
//! Natural-language schema search: ask a question about a dataset and learn
//! which of its columns can answer it.
//!
//! ## How it works
//!
//! 1. The dataset's column names are embedded once and cached on disk
//! 2. The question is embedded and every column is scored against it
//! 3. The top-K columns go to a chat model that judges which are usable and
//!    which missing columns would help more
//! 4. The verdict is rendered as prose plus documentation links
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! OPENAI_API_KEY=... askschema --data-dir ./data --http-port 8080
//! curl -XPOST localhost:8080/api/chat \
//!      -H 'content-type: application/json' \
//!      -d '{"input": "which endpoints are slowest?", "dataset": "frontend"}'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use askschema::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> askschema::Result<()> {
//! let openai = Arc::new(OpenAiClient::new(OpenAiConfig::new("sk-...")).unwrap());
//! let resolver = IndexResolver::new(
//!     Arc::new(FileCacheStore::new("./data")?),
//!     Arc::new(CsvSchemaSource::new("./data")),
//!     openai.clone(),
//! );
//! let assistant = Assistant::new(resolver, openai.clone(), openai, AssistantConfig::default());
//!
//! let response = assistant
//!     .answer(&ChatRequest { query: "why are pages slow?".into(), dataset: "frontend".into() })
//!     .await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - `askschema-core` - Embedding index, ranking, judgment, rendering, pipeline
//! - `askschema-storage` - Atomic file cache and local schema files
//! - `askschema-providers` - OpenAI and Honeycomb HTTP clients
//! - `askschema-api` - REST API

// Re-export core types
pub use askschema_core::{
    rank, rank_with, render, sanitize_then_parse, Assistant, AssistantConfig, CacheStore,
    ChatModel, ChatRequest, ChatResponse, ColumnAdvice, DatasetCatalog, Embedder, EmbeddingIndex,
    Error, IndexResolver, Judge, JudgmentVerdict, MemoryCacheStore, RankedColumn, Result,
    SchemaSource, Similarity, DEFAULT_TOP_K, DOCS_URL,
};

// Re-export storage
pub use askschema_storage::{CachedCatalog, CsvSchemaSource, DatasetListCache, FileCacheStore};

// Re-export providers
pub use askschema_providers::{HoneycombClient, OpenAiClient, OpenAiConfig};

// Re-export API
pub use askschema_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Assistant, AssistantConfig, CacheStore, CachedCatalog, ChatModel, ChatRequest,
        ChatResponse, CsvSchemaSource, DatasetCatalog, DatasetListCache, Embedder,
        EmbeddingIndex, Error, FileCacheStore, HoneycombClient, IndexResolver, OpenAiClient,
        OpenAiConfig, RestApi, Result, SchemaSource, Similarity, DEFAULT_TOP_K,
    };
}
