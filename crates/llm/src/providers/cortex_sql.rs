//! Cortex Complete through the SQL function `SNOWFLAKE.CORTEX.COMPLETE`.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use assist_core::{AppError, AppResult};
use assist_platform::{Binding, PlatformClient};

const COMPLETE_SQL: &str = "SELECT snowflake.cortex.complete(?, ?) AS response";

/// Completion client that runs the SQL completion function.
///
/// Sampling options are not forwarded; the two-argument form of the
/// function returns plain text.
pub struct CortexSqlClient {
    platform: PlatformClient,
}

impl CortexSqlClient {
    pub fn new(platform: PlatformClient) -> Self {
        Self { platform }
    }
}

#[async_trait::async_trait]
impl LlmClient for CortexSqlClient {
    fn provider_name(&self) -> &str {
        "cortex-sql"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to {} ({})", self.provider_name(), request.model);

        let rows = self
            .platform
            .execute(
                COMPLETE_SQL,
                &[
                    Binding::text(request.model.as_str()),
                    Binding::text(request.prompt.as_str()),
                ],
            )
            .await
            .map_err(|e| AppError::Completion(e.to_string()))?;

        let content = rows
            .value(0, "RESPONSE")
            .or_else(|| rows.first_value())
            .ok_or_else(|| AppError::Completion("Completion query returned no rows".to_string()))?
            .to_string();

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        let response = self.complete(request).await?;
        let chunk = LlmStreamChunk {
            content: response.content,
            done: true,
            usage: None,
        };
        Ok(Box::pin(futures::stream::iter(vec![Ok(chunk)])))
    }
}
