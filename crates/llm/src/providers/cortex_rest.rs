//! Cortex Complete over the REST inference endpoint.
//!
//! API: `POST /api/v2/cortex/inference:complete`. The endpoint answers with
//! server-sent events whose `data:` payloads carry incremental deltas; a
//! plain JSON body is accepted as well.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use assist_core::{AppError, AppResult};
use assist_platform::PlatformClient;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

const COMPLETE_PATH: &str = "/api/v2/cortex/inference:complete";

#[derive(Debug, Serialize)]
struct CompleteRequest<'a> {
    model: &'a str,
    messages: Vec<CompleteMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct CompleteMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompleteEvent {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<LlmUsage>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Option<Delta>,
    #[serde(default)]
    message: Option<Delta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl Delta {
    fn into_text(self) -> String {
        self.content.or(self.text).unwrap_or_default()
    }
}

impl CompleteEvent {
    fn into_chunk(self) -> AppResult<LlmStreamChunk> {
        if self.choices.is_empty() && self.usage.is_none() {
            if let Some(message) = self.message {
                return Err(AppError::Completion(message));
            }
        }

        let mut content = String::new();
        let mut done = false;
        for choice in self.choices {
            if let Some(delta) = choice.delta.or(choice.message) {
                content.push_str(&delta.into_text());
            }
            done |= choice.finish_reason.is_some();
        }

        Ok(LlmStreamChunk {
            content,
            done,
            usage: self.usage,
        })
    }
}

/// Incremental decoder for `text/event-stream` bodies.
///
/// Buffers raw bytes so multi-byte characters and lines split across
/// network chunks are reassembled before parsing.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed bytes and return the `data:` payloads of every completed line.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\r', '\n']);

            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim_start();
                if !data.is_empty() {
                    payloads.push(data.to_string());
                }
            }
        }
        payloads
    }
}

/// Parse one SSE payload; `[DONE]` markers yield nothing.
pub(crate) fn parse_event(payload: &str) -> AppResult<Option<LlmStreamChunk>> {
    if payload == "[DONE]" {
        return Ok(None);
    }

    let event: CompleteEvent = serde_json::from_str(payload)
        .map_err(|e| AppError::Completion(format!("Failed to parse completion event: {}", e)))?;

    event.into_chunk().map(Some)
}

/// Completion client for the REST inference endpoint.
pub struct CortexRestClient {
    platform: PlatformClient,
}

impl CortexRestClient {
    pub fn new(platform: PlatformClient) -> Self {
        Self { platform }
    }

    fn to_complete_request<'a>(&self, request: &'a LlmRequest) -> CompleteRequest<'a> {
        CompleteRequest {
            model: &request.model,
            messages: vec![CompleteMessage {
                role: "user",
                content: &request.prompt,
            }],
            stream: true,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    async fn send(&self, request: &LlmRequest) -> AppResult<reqwest::Response> {
        self.platform
            .post_stream(COMPLETE_PATH, &self.to_complete_request(request))
            .await
            .map_err(|e| AppError::Completion(e.to_string()))
    }
}

fn is_json(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

#[async_trait::async_trait]
impl LlmClient for CortexRestClient {
    fn provider_name(&self) -> &str {
        "cortex-rest"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to {} ({})", self.provider_name(), request.model);
        tracing::debug!("Prompt length: {} chars", request.prompt.len());

        let mut stream = self.stream(request).await?;
        let mut content = String::new();
        let mut usage = LlmUsage::default();

        while let Some(result) = stream.next().await {
            let chunk = result?;
            content.push_str(&chunk.content);
            if let Some(u) = chunk.usage {
                usage = u;
            }
        }

        tracing::info!("Received completion ({} chars)", content.len());

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage,
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        let response = self.send(request).await?;

        if is_json(&response) {
            let event: CompleteEvent = response.json().await.map_err(|e| {
                AppError::Completion(format!("Failed to parse completion response: {}", e))
            })?;
            if let Some(model) = &event.model {
                tracing::debug!("Completion served by {}", model);
            }
            let mut chunk = event.into_chunk()?;
            chunk.done = true;
            return Ok(Box::pin(futures::stream::iter(vec![Ok(chunk)])));
        }

        let stream = response
            .bytes_stream()
            .scan(SseDecoder::default(), |decoder, result| {
                let items: Vec<AppResult<LlmStreamChunk>> = match result {
                    Ok(bytes) => decoder
                        .push(&bytes)
                        .iter()
                        .filter_map(|payload| parse_event(payload).transpose())
                        .collect(),
                    Err(e) => vec![Err(AppError::Completion(format!("Stream error: {}", e)))],
                };
                futures::future::ready(Some(futures::stream::iter(items)))
            })
            .flatten();

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assist_platform::PlatformSettings;

    #[test]
    fn test_decoder_reassembles_split_lines() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: {\"choices\":[{\"delta\":{\"con").is_empty());
        let payloads = decoder.push(b"tent\":\"Hi\"}}]}\n\ndata: [DONE]\n");
        assert_eq!(
            payloads,
            vec![
                "{\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}".to_string(),
                "[DONE]".to_string()
            ]
        );
    }

    #[test]
    fn test_decoder_keeps_multibyte_characters() {
        let mut decoder = SseDecoder::default();
        let line = "data: caf\u{e9}\n".as_bytes();
        let (a, b) = line.split_at(line.len() - 2);
        assert!(decoder.push(a).is_empty());
        assert_eq!(decoder.push(b), vec!["caf\u{e9}".to_string()]);
    }

    #[test]
    fn test_decoder_ignores_non_data_lines() {
        let mut decoder = SseDecoder::default();
        let payloads = decoder.push(b"event: message\nid: 1\r\ndata: x\r\n\r\n");
        assert_eq!(payloads, vec!["x".to_string()]);
    }

    #[test]
    fn test_parse_event_variants() {
        let chunk = parse_event(r#"{"choices":[{"delta":{"text":"abc"}}]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(chunk.content, "abc");
        assert!(!chunk.done);

        let last = parse_event(
            r#"{"choices":[{"delta":{"content":""},"finish_reason":"stop"}],"usage":{"prompt_tokens":3,"completion_tokens":2,"total_tokens":5}}"#,
        )
        .unwrap()
        .unwrap();
        assert!(last.done);
        assert_eq!(last.usage, Some(LlmUsage::new(3, 2)));

        assert!(parse_event("[DONE]").unwrap().is_none());
        assert!(parse_event("{broken").is_err());
        assert!(parse_event(r#"{"message":"model not available"}"#).is_err());
    }

    #[test]
    fn test_request_conversion() {
        let platform =
            PlatformClient::new(PlatformSettings::new("http://localhost:1", "t")).unwrap();
        let client = CortexRestClient::new(platform);
        let request = LlmRequest::new("Hello", "llama3-70b").with_temperature(0.1);

        let body = serde_json::to_value(client.to_complete_request(&request)).unwrap();
        assert_eq!(body["model"], "llama3-70b");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Hello");
        assert_eq!(body["stream"], true);
        assert!(body.get("max_tokens").is_none());
        assert_eq!(client.provider_name(), "cortex-rest");
    }
}
