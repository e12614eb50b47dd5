//! # askschema Core
//!
//! Core library for askschema, a natural-language schema search assistant.
//!
//! Given a question and a dataset, the assistant ranks the dataset's columns
//! by embedding similarity to the question, asks a language model which of
//! the top columns are actually useful, and renders the verdict for the user.
//!
//! - [`EmbeddingIndex`] - Column name to embedding mapping for one dataset
//! - [`IndexResolver`] - Cache-backed, single-flight index construction
//! - [`rank`] - Top-K column ranking against a query vector
//! - [`Judge`] - Chat-model judgment of ranked columns
//! - [`render`] - Verdict to user-facing text
//! - [`Assistant`] - The whole pipeline
//!
//! ## Example
//!
//! ```rust
//! use askschema_core::{rank, EmbeddingIndex};
//!
//! let index = EmbeddingIndex::new(
//!     "frontend",
//!     vec!["latency_ms".into(), "status_code".into(), "user_id".into()],
//!     vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]],
//! ).unwrap();
//!
//! let ranked = rank(&[1.0, 0.0], &index, 2).unwrap();
//! assert_eq!(ranked[0].column, "latency_ms");
//! assert_eq!(ranked[1].column, "user_id");
//! ```

pub mod assistant;
pub mod cache;
pub mod error;
pub mod index;
pub mod judge;
pub mod provider;
pub mod rank;
pub mod render;
pub mod resolver;
pub mod vector;
pub mod verdict;

pub use assistant::{Assistant, AssistantConfig, ChatRequest};
pub use cache::{CacheStore, MemoryCacheStore};
pub use error::{Error, Result};
pub use index::EmbeddingIndex;
pub use judge::Judge;
pub use provider::{
    ChatModel, CompletionRequest, DatasetCatalog, Embedder, Message, ResponseFormat, Role,
    SchemaSource,
};
pub use rank::{rank, rank_with, RankedColumn, DEFAULT_TOP_K};
pub use render::{render, ChatResponse, DOCS_URL};
pub use resolver::{IndexResolver, DEFAULT_PROVIDER_TIMEOUT};
pub use vector::{cosine, score, Similarity, Vector};
pub use verdict::{sanitize_then_parse, ColumnAdvice, JudgmentVerdict};
