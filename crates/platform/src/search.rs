//! Cortex Search queries.
//!
//! API: `POST /api/v2/databases/{db}/schemas/{schema}/cortex-search-services/{service}:query`

use crate::client::PlatformClient;
use assist_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A search request against one service.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub columns: Vec<String>,
    pub limit: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, columns: &[&str], limit: u32) -> Self {
        Self {
            query: query.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            limit,
        }
    }
}

/// One result row, keyed by the requested column names.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SearchHit(pub Map<String, Value>);

impl SearchHit {
    /// String value of a column; non-string values are rendered as JSON.
    pub fn get(&self, column: &str) -> Option<String> {
        let value = self
            .0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(column))
            .map(|(_, v)| v)?;

        match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

impl PlatformClient {
    /// Query a search service in the configured database and schema.
    pub async fn search(&self, service: &str, request: &SearchRequest) -> AppResult<Vec<SearchHit>> {
        let settings = self.settings();
        let path = format!(
            "/api/v2/databases/{}/schemas/{}/cortex-search-services/{}:query",
            settings.database, settings.schema, service
        );

        tracing::info!(
            "Searching {} (limit {}) for: {}",
            service,
            request.limit,
            request.query
        );

        let response = self
            .post_json(&path, request)
            .await
            .map_err(|e| AppError::Search(e.to_string()))?;

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse search response: {}", e)))?;

        tracing::debug!("Search {} returned {} hits", service, body.results.len());

        Ok(body.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_lookup() {
        let hit: SearchHit = serde_json::from_value(serde_json::json!({
            "CHUNK": "Member called about a claim",
            "relative_path": "call_recordings/c1.mp3",
            "score": 0.8
        }))
        .unwrap();

        assert_eq!(hit.get("chunk").as_deref(), Some("Member called about a claim"));
        assert_eq!(
            hit.get("RELATIVE_PATH").as_deref(),
            Some("call_recordings/c1.mp3")
        );
        assert_eq!(hit.get("score").as_deref(), Some("0.8"));
        assert_eq!(hit.get("missing"), None);
    }

    #[test]
    fn test_request_serialization() {
        let request = SearchRequest::new("claims", &["CHUNK", "RELATIVE_PATH"], 10);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["query"], "claims");
        assert_eq!(json["columns"][1], "RELATIVE_PATH");
        assert_eq!(json["limit"], 10);
    }
}
