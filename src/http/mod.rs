//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from specific business logic.

pub mod query;
pub mod response;

// Re-export commonly used types
pub use query::{query_value, QueryParams};
pub use response::build_json_response;
