use crate::verdict::{ColumnAdvice, JudgmentVerdict};
use serde::{Deserialize, Serialize};

/// Data-ingestion documentation, attached to every rendered verdict
pub const DOCS_URL: &str = "https://docs.honeycomb.io/getting-data-in/";

pub const APOLOGY: &str = "I'm sorry, I don't understand. Please try again.";

/// User-facing answer: prose plus reference links
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub urls: Vec<String>,
}

impl ChatResponse {
    /// Fallback when the model's judgment is missing or unusable.
    pub fn apology() -> Self {
        Self {
            content: APOLOGY.to_string(),
            urls: Vec::new(),
        }
    }
}

pub fn render(verdict: &JudgmentVerdict) -> ChatResponse {
    let mut content = String::from("Hey friendo, ");

    if verdict.data_to_use.is_empty() {
        content.push_str("\n\nIt doesn't seem like you have the data to answer your question.\n\n");
    } else {
        content.push_str("\n\nIt looks like you have some columns that could help you out:\n\n");
        push_advice(&mut content, &verdict.data_to_use);
    }

    if !verdict.preferred_data_if_not_exists.is_empty() {
        content.push_str("\n\nSome columns that could potentially help a lot more are:\n\n");
        push_advice(&mut content, &verdict.preferred_data_if_not_exists);
    }

    ChatResponse {
        content,
        urls: vec![DOCS_URL.to_string()],
    }
}

fn push_advice(content: &mut String, advice: &ColumnAdvice) {
    for column in &advice.columns {
        content.push_str(&format!("\t* {}\n", column));
    }
    content.push_str(&format!("\nHere's why:\n\n{}\n\n", advice.explanation));
}
