//! OpenAI-compatible embeddings and chat completions

use askschema_core::{
    ChatModel, CompletionRequest, Embedder, Error, Message, ResponseFormat, Result,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4-turbo-preview";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Client for `/embeddings` and `/chat/completions`
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("OpenAI API key is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> std::result::Result<String, String> {
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request to {} failed: {}", path, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("reading {} response failed: {}", path, e))?;
        if !status.is_success() {
            return Err(format!("{} returned {}: {}", path, status, text));
        }
        Ok(text)
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let body = json!({
            "model": self.config.embedding_model,
            "input": inputs,
        });
        let text = self.post("embeddings", &body).await.map_err(Error::EmbeddingMismatch)?;
        let vectors = parse_embeddings(&text)?;
        if vectors.len() != inputs.len() {
            return Err(Error::EmbeddingMismatch(format!(
                "sent {} inputs, received {} embeddings",
                inputs.len(),
                vectors.len()
            )));
        }
        debug!(inputs = inputs.len(), model = %self.config.embedding_model, "embeddings received");
        Ok(vectors)
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>> {
        let body = chat_body(&self.config.chat_model, request);
        let text = self
            .post("chat/completions", &body)
            .await
            .map_err(Error::JudgeUnavailable)?;
        parse_chat_content(&text)
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a askschema_core::Role,
    content: &'a str,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(m: &'a Message) -> Self {
        Self { role: &m.role, content: &m.content }
    }
}

fn chat_body(model: &str, request: &CompletionRequest) -> serde_json::Value {
    let messages: Vec<WireMessage<'_>> = request.messages.iter().map(WireMessage::from).collect();
    let mut body = json!({
        "model": model,
        "messages": messages,
        "temperature": request.temperature,
    });
    if request.response_format == ResponseFormat::JsonObject {
        body["response_format"] = json!({ "type": "json_object" });
    }
    body
}

/// Embeddings from a response body, ordered by their `index` field.
fn parse_embeddings(text: &str) -> Result<Vec<Vec<f32>>> {
    let mut response: EmbeddingResponse = serde_json::from_str(text)
        .map_err(|e| Error::EmbeddingMismatch(format!("invalid embeddings response: {}", e)))?;
    response.data.sort_by_key(|d| d.index);
    Ok(response.data.into_iter().map(|d| d.embedding).collect())
}

/// Content of the first choice, `None` when absent or null.
fn parse_chat_content(text: &str) -> Result<Option<String>> {
    let response: ChatResponse = serde_json::from_str(text)
        .map_err(|e| Error::JudgeUnavailable(format!("invalid chat response: {}", e)))?;
    Ok(response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embeddings_sorted_by_index() {
        let body = r#"{"object":"list","data":[
            {"object":"embedding","index":1,"embedding":[0.0,1.0]},
            {"object":"embedding","index":0,"embedding":[1.0,0.0]}
        ],"model":"text-embedding-3-small"}"#;
        assert_eq!(parse_embeddings(body).unwrap(), vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_bad_embeddings_body() {
        let err = parse_embeddings(r#"{"error":{"message":"quota"}}"#).unwrap_err();
        assert!(matches!(err, Error::EmbeddingMismatch(_)));
    }

    #[test]
    fn test_chat_content() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  {\"a\":1} "}}]}"#;
        assert_eq!(parse_chat_content(body).unwrap().as_deref(), Some("{\"a\":1}"));
        let null = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert_eq!(parse_chat_content(null).unwrap(), None);
        assert_eq!(parse_chat_content(r#"{"choices":[]}"#).unwrap(), None);
    }

    #[test]
    fn test_chat_body() {
        let request = CompletionRequest {
            messages: vec![Message::system("be terse"), Message::user("hi")],
            temperature: 0.0,
            response_format: ResponseFormat::JsonObject,
        };
        let body = chat_body("gpt-4-turbo-preview", &request);
        assert_eq!(body["model"], "gpt-4-turbo-preview");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(OpenAiClient::new(OpenAiConfig::new(" ")).is_err());
    }

    #[test]
    fn test_endpoint_join() {
        let mut config = OpenAiConfig::new("sk-test");
        config.base_url = "http://localhost:8080/v1/".to_string();
        let client = OpenAiClient::new(config).unwrap();
        assert_eq!(client.endpoint("embeddings"), "http://localhost:8080/v1/embeddings");
    }
}
