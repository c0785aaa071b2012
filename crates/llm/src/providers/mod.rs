//! Completion backends.

pub mod cortex_rest;
pub mod cortex_sql;

pub use cortex_rest::CortexRestClient;
pub use cortex_sql::CortexSqlClient;
