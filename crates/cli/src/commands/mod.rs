//! Command handlers for the Call Center Assist CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod chat;
pub mod member;
pub mod prompts;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use member::MemberCommand;
pub use prompts::PromptsCommand;
