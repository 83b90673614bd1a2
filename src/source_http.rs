//! HTTP data source backed by the REST API.
//!
//! Each collection is fetched with
//! `GET {base_url}/api/v1/{collection}?q={text}&limit={limit}`, with any
//! search filters appended as further query parameters. Filters may not use
//! the reserved `q` and `limit` names. A non-array body is
//! treated as an empty collection; array elements that do not decode as an
//! entity are skipped.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use global_search_core::models::{Collection, RawEntity, SearchQuery};
use global_search_core::source::DataSource;

use crate::config::ApiConfig;

/// Query parameters set by the source itself.
pub const RESERVED_PARAMS: [&str; 2] = ["q", "limit"];

/// Reject filter keys that are empty or collide with [`RESERVED_PARAMS`].
pub fn check_filter_key(key: &str) -> Result<()> {
    if key.is_empty() {
        bail!("filter key must not be empty");
    }
    if RESERVED_PARAMS.contains(&key) {
        bail!("filter key '{}' is reserved", key);
    }
    Ok(())
}

pub struct HttpDataSource {
    client: reqwest::Client,
    base_url: String,
    limit: u32,
}

impl HttpDataSource {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limit: config.limit,
        })
    }

    pub fn endpoint(&self, collection: Collection) -> String {
        format!("{}/api/v1/{}", self.base_url, collection.as_str())
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch(&self, collection: Collection, query: &SearchQuery) -> Result<Vec<RawEntity>> {
        let mut params: Vec<(&str, String)> = vec![
            ("q", query.text.clone()),
            ("limit", self.limit.to_string()),
        ];
        for (key, value) in &query.filters {
            if let Err(e) = check_filter_key(key) {
                tracing::warn!(%collection, error = %e, "dropping filter");
                continue;
            }
            params.push((key.as_str(), value.clone()));
        }

        let url = self.endpoint(collection);
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("API error {} from {}: {}", status, url, body_text);
        }

        let json: serde_json::Value = response
            .json()
            .await
            .with_context(|| format!("Invalid JSON from {}", url))?;
        Ok(parse_entities(collection, json))
    }
}

fn parse_entities(collection: Collection, json: serde_json::Value) -> Vec<RawEntity> {
    let serde_json::Value::Array(items) = json else {
        tracing::debug!(%collection, "response is not an array, treating as empty");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawEntity>(item) {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::debug!(%collection, error = %e, "skipping undecodable entity");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            limit: 20,
        }
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let source = HttpDataSource::new(&api("http://localhost:8080/")).unwrap();
        assert_eq!(
            source.endpoint(Collection::Contexts),
            "http://localhost:8080/api/v1/contexts"
        );
    }

    #[test]
    fn test_reserved_filter_keys_rejected() {
        assert!(check_filter_key("status").is_ok());
        let err = check_filter_key("q").unwrap_err();
        assert!(err.to_string().contains("reserved"));
        assert!(check_filter_key("limit").is_err());
        assert!(check_filter_key("").is_err());
    }

    #[test]
    fn test_parse_entities_non_array_is_empty() {
        assert!(parse_entities(Collection::Tasks, json!({"error": "nope"})).is_empty());
        assert!(parse_entities(Collection::Tasks, json!(null)).is_empty());
    }

    #[test]
    fn test_parse_entities_skips_bad_items() {
        let out = parse_entities(
            Collection::Tasks,
            json!([
                {"id": 1, "title": "Write report", "due_date": "2024-06-01"},
                {"title": "missing id"},
                {"id": "abc", "name": "Named"}
            ]),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].label(), "Write report");
        assert_eq!(out[1].label(), "Named");
    }
}
