//! Completion client factory.
//!
//! Picks the backend for the configured completion mode. Both backends
//! share one [`PlatformClient`] and therefore one connection pool.

use crate::client::LlmClient;
use crate::providers::{CortexRestClient, CortexSqlClient};
use crate::types::CompleteMode;
use assist_core::{AppError, AppResult};
use assist_platform::PlatformClient;
use std::sync::Arc;

/// Create a completion client for a mode name ("api" or "sql").
///
/// # Errors
/// Returns [`AppError::Config`] for an unknown mode.
pub fn create_client(mode: &str, platform: PlatformClient) -> AppResult<Arc<dyn LlmClient>> {
    let mode = CompleteMode::parse(mode)
        .ok_or_else(|| AppError::Config(format!("Unknown completion mode: {}", mode)))?;

    tracing::debug!("Creating completion client for mode {}", mode.as_str());

    let client: Arc<dyn LlmClient> = match mode {
        CompleteMode::Api => Arc::new(CortexRestClient::new(platform)),
        CompleteMode::Sql => Arc::new(CortexSqlClient::new(platform)),
    };
    Ok(client)
}
