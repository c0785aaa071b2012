//! Hosted data platform integration for the call-center assistant.
//!
//! Thin typed wrappers over the platform REST APIs the assistant delegates to:
//! - SQL statements (member lookup, presigned URLs, email, SQL-mode completion)
//! - Cortex Search (FAQ documents and call transcripts)
//! - Cortex Analyst (natural-language questions over the member data product)
//!
//! # Example
//! ```no_run
//! use assist_platform::{PlatformClient, Binding};
//!
//! # async fn example(client: PlatformClient) -> Result<(), Box<dyn std::error::Error>> {
//! let rows = client
//!     .execute("SELECT NAME FROM MEMBERS WHERE MEMBER_PHONE = ?", &[Binding::text("946-081-0513")])
//!     .await?;
//! println!("{:?}", rows.first_value());
//! # Ok(())
//! # }
//! ```

pub mod analyst;
pub mod client;
pub mod search;
pub mod sql;

pub use analyst::{AnalystContent, AnalystMessage, AnalystResponse};
pub use client::{PlatformClient, PlatformSettings};
pub use search::{SearchHit, SearchRequest};
pub use sql::{Binding, ResultSet};
