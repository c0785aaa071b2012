//! Cortex Analyst: natural-language questions over a semantic model.
//!
//! API: `POST /api/v2/cortex/analyst/message`

use crate::client::PlatformClient;
use assist_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

const ANALYST_PATH: &str = "/api/v2/cortex/analyst/message";

/// One content block of an analyst message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalystContent {
    Text {
        text: String,
    },
    Suggestions {
        suggestions: Vec<String>,
    },
    Sql {
        statement: String,
    },
    #[serde(other)]
    Unknown,
}

/// A message exchanged with the analyst.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystMessage {
    pub role: String,
    pub content: Vec<AnalystContent>,
}

impl AnalystMessage {
    /// A single-text user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![AnalystContent::Text { text: text.into() }],
        }
    }
}

#[derive(Debug, Serialize)]
struct AnalystRequest<'a> {
    messages: Vec<AnalystMessage>,
    semantic_model_file: &'a str,
}

/// Analyst reply.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalystResponse {
    pub message: AnalystMessage,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl PlatformClient {
    /// Ask the analyst a question against `semantic_model_file`
    /// (a stage path such as `@DB.SCHEMA.STAGE/model.yaml`).
    pub async fn analyst_message(
        &self,
        question: &str,
        semantic_model_file: &str,
    ) -> AppResult<AnalystResponse> {
        let request = AnalystRequest {
            messages: vec![AnalystMessage::user(question)],
            semantic_model_file,
        };

        tracing::info!("Sending question to analyst ({})", semantic_model_file);

        let response = self
            .post_json(ANALYST_PATH, &request)
            .await
            .map_err(|e| AppError::Analyst(e.to_string()))?;

        let body: AnalystResponse = response
            .json()
            .await
            .map_err(|e| AppError::Analyst(format!("Failed to parse analyst response: {}", e)))?;

        tracing::debug!(
            "Analyst request {} returned {} content blocks",
            body.request_id.as_deref().unwrap_or("-"),
            body.message.content.len()
        );

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_deserialization() {
        let json = serde_json::json!({
            "message": {
                "role": "analyst",
                "content": [
                    {"type": "text", "text": "This is our interpretation"},
                    {"type": "sql", "statement": "SELECT 1", "confidence": {}},
                    {"type": "suggestions", "suggestions": ["a", "b"]},
                    {"type": "chart", "spec": {}}
                ]
            },
            "request_id": "r-1"
        });

        let response: AnalystResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.request_id.as_deref(), Some("r-1"));
        assert_eq!(
            response.message.content,
            vec![
                AnalystContent::Text {
                    text: "This is our interpretation".to_string()
                },
                AnalystContent::Sql {
                    statement: "SELECT 1".to_string()
                },
                AnalystContent::Suggestions {
                    suggestions: vec!["a".to_string(), "b".to_string()]
                },
                AnalystContent::Unknown,
            ]
        );
    }

    #[test]
    fn test_user_message_shape() {
        let json = serde_json::to_value(AnalystMessage::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "hi");
    }
}
