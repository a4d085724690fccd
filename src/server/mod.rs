//! Server module: host, exposures and the builder that wires them
//!
//! The `ServerBuilder` assembles:
//! - the REST backend (HTTP or fixtures) from configuration
//! - the validated type registry
//! - GraphQL and health routes on one axum router

pub mod builder;
pub mod exposure;
pub mod host;

pub use builder::ServerBuilder;
pub use exposure::{GraphQLExposure, RestExposure};
pub use host::ServerHost;
