//! Chat pipeline for the call-center assistant.
//!
//! This crate ties the platform, completion and prompt crates together:
//! - [`ChatSession`]: messages, selected member, restriction and retrieval memo
//! - [`Assistant`]: question refinement, intent routing, retrieval and answering
//! - Member lookup and demo callers
//! - Follow-up actions (next best action, email draft and send)
//!
//! # Example
//! ```no_run
//! use assist_agent::{Assistant, ChatSession};
//! use assist_core::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let assistant = Assistant::from_config(AppConfig::load()?)?;
//! let mut session = ChatSession::new();
//! let answer = assistant.ask(&mut session, "What wellness programs are offered?").await?;
//! println!("{}", answer.text);
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod analyst;
pub mod assistant;
pub mod member;
pub mod retrieval;
pub mod session;
pub mod types;

pub use actions::{ACTION_ERROR, NO_ACTION};
pub use analyst::REFINE_QUESTION;
pub use assistant::{Assistant, NO_RESPONSE};
pub use member::{sample_questions, NO_MEMBER_FOUND, SAMPLE_PHONE_NUMBERS};
pub use retrieval::SearchSource;
pub use session::ChatSession;
pub use types::{
    Answer, DebugNote, DocumentRef, DraftAction, Intent, MemberContext, Message, NextBestAction,
    RetrievedContext, Role,
};
