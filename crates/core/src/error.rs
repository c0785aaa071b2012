//! Error types for the call-center assistant.
//!
//! One enum covers every failure category: configuration, I/O, the hosted
//! data platform (transport, SQL, search, completion, analyst), prompts and
//! session handling.

use thiserror::Error;

/// Unified error type for the call-center assistant.
///
/// All fallible functions return `Result<T, AppError>`. Errors from remote
/// calls are propagated to the interaction boundary, where they are shown
/// to the operator as inline text.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport, authentication and HTTP status errors from the platform
    #[error("Platform error: {0}")]
    Platform(String),

    /// SQL statement errors
    #[error("SQL error: {0}")]
    Sql(String),

    /// Semantic search errors
    #[error("Search error: {0}")]
    Search(String),

    /// Language-model completion errors
    #[error("Completion error: {0}")]
    Completion(String),

    /// Tabular-data analyst errors
    #[error("Analyst error: {0}")]
    Analyst(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Chat session errors (no member selected, unknown suggestion, ...)
    #[error("Session error: {0}")]
    Session(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
