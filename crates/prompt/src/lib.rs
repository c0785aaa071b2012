//! Prompt system for the call-center assistant.
//!
//! This crate provides the prompt templates the chat pipeline renders:
//! - Built-in definitions for every pipeline step
//! - Per-workspace YAML overrides in `.assist/prompts/`
//! - Handlebars rendering without HTML escaping

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use builtin::{builtin_definitions, ids};
pub use loader::{list_prompts, load_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptSource, PromptSummary};
