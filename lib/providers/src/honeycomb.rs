//! Honeycomb schema catalog
//!
//! `GET /1/columns/{dataset}` for column names, `GET /1/datasets` for the
//! dataset list. Authenticated with the `X-Honeycomb-Team` header.

use askschema_core::{DatasetCatalog, Error, Result, SchemaSource};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.honeycomb.io";

const TEAM_HEADER: &str = "X-Honeycomb-Team";

#[derive(Debug, Clone)]
pub struct HoneycombClient {
    http: reqwest::Client,
    api_key: String,
    base_url: Url,
}

#[derive(Deserialize)]
struct ColumnInfo {
    key_name: String,
}

#[derive(Deserialize)]
struct DatasetInfo {
    slug: String,
}

impl HoneycombClient {
    pub fn new(api_key: impl Into<String>, base_url: &str, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("Honeycomb API key is empty".to_string()));
        }
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::InvalidConfig(format!("invalid Honeycomb URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!("invalid Honeycomb URL {}", base_url)));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { http, api_key, base_url })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> std::result::Result<T, String> {
        let response = self
            .http
            .get(url.clone())
            .header(TEAM_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| format!("request to {} failed: {}", url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("{} returned {}: {}", url, status, body));
        }
        response
            .json()
            .await
            .map_err(|e| format!("invalid response from {}: {}", url, e))
    }
}

#[async_trait]
impl SchemaSource for HoneycombClient {
    async fn columns(&self, dataset: &str) -> Result<Vec<String>> {
        let url = self.url(&["1", "columns", dataset]);
        let columns: Vec<ColumnInfo> = self.get_json(url).await.map_err(Error::SchemaFetch)?;
        debug!(dataset, columns = columns.len(), "columns fetched from Honeycomb");
        Ok(columns.into_iter().map(|c| c.key_name).collect())
    }
}

#[async_trait]
impl DatasetCatalog for HoneycombClient {
    async fn datasets(&self) -> Result<Vec<String>> {
        let url = self.url(&["1", "datasets"]);
        let datasets: Vec<DatasetInfo> = self.get_json(url).await.map_err(Error::SchemaFetch)?;
        Ok(datasets.into_iter().map(|d| d.slug).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HoneycombClient {
        HoneycombClient::new("key", base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_urls() {
        let c = client(DEFAULT_BASE_URL);
        assert_eq!(
            c.url(&["1", "columns", "frontend"]).as_str(),
            "https://api.honeycomb.io/1/columns/frontend"
        );
        let c = client("http://localhost:9000/proxy/");
        assert_eq!(c.url(&["1", "datasets"]).as_str(), "http://localhost:9000/proxy/1/datasets");
    }

    #[test]
    fn test_dataset_segment_is_escaped() {
        let c = client(DEFAULT_BASE_URL);
        let url = c.url(&["1", "columns", "../datasets"]);
        assert_eq!(url.path(), "/1/columns/..%2Fdatasets");
    }

    #[test]
    fn test_response_shapes() {
        let columns: Vec<ColumnInfo> = serde_json::from_str(
            r#"[{"id":"a1","key_name":"duration_ms","type":"float"},{"key_name":"trace.trace_id"}]"#,
        )
        .unwrap();
        assert_eq!(columns[1].key_name, "trace.trace_id");

        let datasets: Vec<DatasetInfo> =
            serde_json::from_str(r#"[{"name":"Frontend","slug":"frontend","regular_columns_count":3}]"#)
                .unwrap();
        assert_eq!(datasets[0].slug, "frontend");
    }

    #[test]
    fn test_invalid_config() {
        assert!(HoneycombClient::new("", DEFAULT_BASE_URL, Duration::from_secs(1)).is_err());
        assert!(HoneycombClient::new("key", "not a url", Duration::from_secs(1)).is_err());
    }
}
