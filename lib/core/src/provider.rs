//! Collaborator traits
//!
//! The core never talks to the network directly. Schema catalogs, embedding
//! models and chat models are injected behind these traits; concrete HTTP
//! clients live in `askschema-providers`.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Returns the ordered column names of a dataset.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn columns(&self, dataset: &str) -> Result<Vec<String>>;
}

/// Produces one fixed-size vector per input text, in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Generates text for a message sequence. `Ok(None)` means the provider
/// answered without any content.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>>;
}

/// Lists the datasets available to the assistant.
#[async_trait]
pub trait DatasetCatalog: Send + Sync {
    async fn datasets(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Text,
    JsonObject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}
