use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A group of columns with the model's reasoning about them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAdvice {
    pub columns: Vec<String>,
    pub explanation: String,
}

impl ColumnAdvice {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// The language model's judgment of a ranked column list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgmentVerdict {
    /// Columns sufficient to answer the query
    pub data_to_use: ColumnAdvice,
    /// Columns that would answer it better but are absent
    pub preferred_data_if_not_exists: ColumnAdvice,
}

/// Strip markdown fences and the literal `json` tag, then parse.
///
/// Every backtick and every occurrence of `json` is removed, including ones
/// inside string values.
pub fn sanitize_then_parse(raw: &str) -> Result<JudgmentVerdict> {
    let cleaned = sanitize(raw);
    serde_json::from_str(&cleaned).map_err(|e| {
        Error::MalformedVerdict(format!("{} in response {:?}", e, truncate(&cleaned, 200)))
    })
}

fn sanitize(raw: &str) -> String {
    raw.replace('`', "").replace("json", "").trim().to_string()
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "data_to_use": {"columns": ["latency_ms"], "explanation": "measures request time"},
        "preferred_data_if_not_exists": {"columns": [], "explanation": ""}
    }"#;

    #[test]
    fn test_fenced_response_matches_plain() {
        let fenced = format!("```json\n{}\n```", BODY);
        let plain: JudgmentVerdict = serde_json::from_str(BODY).unwrap();
        assert_eq!(sanitize_then_parse(&fenced).unwrap(), plain);
        assert_eq!(sanitize(&fenced), BODY.trim());
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let verdict = sanitize_then_parse(r#"{"data_to_use": {"columns": ["a"]}}"#).unwrap();
        assert_eq!(verdict.data_to_use.columns, vec!["a"]);
        assert_eq!(verdict.data_to_use.explanation, "");
        assert!(verdict.preferred_data_if_not_exists.is_empty());
    }

    #[test]
    fn test_extra_keys_ignored() {
        let verdict = sanitize_then_parse(
            r#"{"data_to_use": {"columns": []}, "docs_url": "https://docs.honeycomb.io/"}"#,
        )
        .unwrap();
        assert!(verdict.data_to_use.is_empty());
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = sanitize_then_parse("```json\n{\"data_to_use\": [\n```").unwrap_err();
        assert!(matches!(err, Error::MalformedVerdict(_)));
        assert!(matches!(
            sanitize_then_parse("I cannot help with that").unwrap_err(),
            Error::MalformedVerdict(_)
        ));
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let err = sanitize_then_parse(r#"{"data_to_use": {"columns": "latency_ms"}}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedVerdict(_)));
    }
}
