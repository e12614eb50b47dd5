//! Language-model adjudication
//!
//! Asks a chat model which of the ranked columns can answer a natural
//! language query, and which missing columns would answer it better.

use crate::error::{Error, Result};
use crate::provider::{ChatModel, CompletionRequest, Message, ResponseFormat};
use crate::rank::RankedColumn;
use crate::resolver::DEFAULT_PROVIDER_TIMEOUT;
use crate::verdict::{sanitize_then_parse, JudgmentVerdict};
use std::sync::Arc;
use std::time::Duration;

const ROLE_PROMPT: &str = "You are an expert on modern application and infrastructure Observability. \
In particular, you have detailed knowledge of the data schema used for various Observability questions, \
and are effective at judging if columns/fields/attributes in this schema are appropriate for various tasks.";

const TASK_PROMPT: &str =
    "You are asked to judge the quality of a given schema for use in Natural Language Querying (NLQ).";

/// Judges ranked columns with a chat model
#[derive(Clone)]
pub struct Judge {
    model: Arc<dyn ChatModel>,
    timeout: Duration,
}

impl Judge {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Classify `columns` for `query`. No retries.
    pub async fn judge(&self, query: &str, columns: &[RankedColumn]) -> Result<JudgmentVerdict> {
        let request = build_request(query, columns);

        let content = tokio::time::timeout(self.timeout, self.model.complete(&request))
            .await
            .map_err(|_| {
                Error::JudgeUnavailable(format!("chat model timed out after {:?}", self.timeout))
            })?
            .map_err(|e| match e {
                Error::JudgeUnavailable(_) => e,
                other => Error::JudgeUnavailable(other.to_string()),
            })?;

        match content {
            Some(text) if !text.trim().is_empty() => sanitize_then_parse(&text),
            _ => Err(Error::JudgeUnavailable(
                "chat model returned no content".to_string(),
            )),
        }
    }
}

/// The full message sequence sent for one judgment.
pub fn build_request(query: &str, columns: &[RankedColumn]) -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            Message::system(ROLE_PROMPT),
            Message::system(TASK_PROMPT),
            Message::user(task_input(query, columns)),
        ],
        temperature: 0.0,
        response_format: ResponseFormat::JsonObject,
    }
}

fn task_input(query: &str, columns: &[RankedColumn]) -> String {
    let listed = columns
        .iter()
        .map(|c| format!("{} ({:.4})", c.column, c.score))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"NLQ: {query}
COLUMNS: {listed}

Given NLQ and my schema COLUMNS, determine which columns could be used for NLQ.

If COLUMNS has items you believe are useful for NLQ, list them.

If you believe NLQ is not answerable with COLUMNS, suggest columns that would help.

Format your answer as a JSON object with the following structure:

{{
    "data_to_use": {{
        "columns": ["example1", "example2"],
        "explanation": "explanation for why these can be used"
    }},
    "preferred_data_if_not_exists": {{
        "columns": ["example1", "example2"],
        "explanation": "optional explanation for any preferred columns"
    }}
}}

Answer succinctly."#
    )
}
