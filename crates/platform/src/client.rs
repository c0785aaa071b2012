//! Authenticated HTTP client for the data platform REST APIs.

use assist_core::{AppConfig, AppError, AppResult};
use serde::Serialize;
use std::time::Duration;

/// Connection settings resolved from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct PlatformSettings {
    /// Account URL without trailing slash
    pub base_url: String,

    /// Bearer token
    pub token: String,

    /// Token type header value (e.g. "PROGRAMMATIC_ACCESS_TOKEN", "KEYPAIR_JWT", "OAUTH")
    pub token_type: String,

    pub database: String,
    pub schema: String,
    pub warehouse: Option<String>,
    pub role: Option<String>,

    /// Connect timeout, and the whole-request deadline for non-streaming calls
    pub timeout: Duration,
}

impl PlatformSettings {
    /// Create settings with the default database/schema used by tests and examples.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            token_type: "PROGRAMMATIC_ACCESS_TOKEN".to_string(),
            database: "CALL_CENTER".to_string(),
            schema: "PUBLIC".to_string(),
            warehouse: None,
            role: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Resolve settings from application configuration.
    ///
    /// Fails when the account URL or the token is missing.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate_remote()?;

        let base_url = config
            .platform
            .account_url
            .clone()
            .ok_or_else(|| AppError::Config("platform.accountUrl is not set".to_string()))?;
        let token = config
            .token
            .clone()
            .ok_or_else(|| AppError::Config("No access token configured".to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            token_type: config.platform.token_type.clone(),
            database: config.platform.database.clone(),
            schema: config.platform.schema.clone(),
            warehouse: config.platform.warehouse.clone(),
            role: config.platform.role.clone(),
            timeout: Duration::from_secs(config.platform.timeout_seconds),
        })
    }
}

/// Client for the platform REST APIs.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    settings: PlatformSettings,
    http: reqwest::Client,
}

impl PlatformClient {
    /// Create a client from resolved settings.
    pub fn new(settings: PlatformSettings) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(settings.timeout)
            .user_agent(concat!("call-center-assist/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Platform(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { settings, http })
    }

    /// Create a client straight from application configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Self::new(PlatformSettings::from_config(config)?)
    }

    /// Connection settings in use.
    pub fn settings(&self) -> &PlatformSettings {
        &self.settings
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url, path)
    }

    /// POST a JSON body and return the response if its status is 2xx.
    ///
    /// The whole exchange, body included, must finish within the configured
    /// timeout. Any other status becomes [`AppError::Platform`] with the
    /// response body.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<reqwest::Response> {
        self.post(path, body, Some(self.settings.timeout)).await
    }

    /// POST a JSON body whose response is read incrementally.
    ///
    /// Only connecting is bounded by the configured timeout, so long
    /// streamed bodies are not cut off.
    pub async fn post_stream<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<reqwest::Response> {
        self.post(path, body, None).await
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> AppResult<reqwest::Response> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let mut request = self
            .http
            .post(&url)
            .bearer_auth(&self.settings.token)
            .header(
                "X-Snowflake-Authorization-Token-Type",
                &self.settings.token_type,
            )
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Platform(format!("Failed to send request to {}: {}", path, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Platform(format!(
                "Failed request to {} with status {}: {}",
                path, status, error_text
            )));
        }

        Ok(response)
    }
}
