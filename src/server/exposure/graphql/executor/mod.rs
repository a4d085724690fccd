//! GraphQL executor module
//!
//! The executor is split into several sub-modules:
//! - `core`: Main executor orchestration
//! - `document`: Parsing, validation and fragment flattening
//! - `query_executor`: Root query execution
//! - `field_resolver`: Recursive field resolution
//! - `utils`: Utility functions

mod core;
mod document;
mod field_resolver;
mod query_executor;
mod utils;

pub use self::core::GraphQLExecutor;
pub use document::TYPENAME_FIELD;
