//! Language-model completion for the call-center assistant.
//!
//! The hosted platform serves completions two ways, selected per session:
//! - **api**: the REST inference endpoint, streamed as server-sent events
//! - **sql**: the `SNOWFLAKE.CORTEX.COMPLETE` SQL function
//!
//! # Example
//! ```no_run
//! use assist_llm::{create_client, LlmRequest};
//! use assist_platform::{PlatformClient, PlatformSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let platform = PlatformClient::new(PlatformSettings::new("https://acme.snowflakecomputing.com", "token"))?;
//! let client = create_client("api", platform)?;
//! let response = client.complete(&LlmRequest::new("Hello", "claude-3-5-sonnet")).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
pub use factory::create_client;
pub use providers::{CortexRestClient, CortexSqlClient};
pub use types::CompleteMode;
